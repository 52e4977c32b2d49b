use async_trait::async_trait;
use quiz_core::model::{TestDefinitionRecord, TestId};
use serde::de::DeserializeOwned;
use url::Url;

use crate::repository::{LoadedTest, StorageError, TestListing, TestRepository};

/// Fetches tests from a static web root serving `tests/<id>/test.json`.
///
/// The catalogue is `tests/index.json`, a JSON array of test ids.
#[derive(Debug, Clone)]
pub struct HttpTestRepository {
    base: Url,
    client: reqwest::Client,
}

impl HttpTestRepository {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if `base` is not a valid URL.
    pub fn new(base: &str) -> Result<Self, StorageError> {
        let mut base = Url::parse(base).map_err(|e| StorageError::Connection(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn resolve(&self, path: &str) -> Result<Url, StorageError> {
        self.base
            .join(path)
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, id: &str) -> Result<T, StorageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(id.to_owned()));
        }
        if !status.is_success() {
            return Err(StorageError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TestRepository for HttpTestRepository {
    async fn load_test(&self, id: &TestId) -> Result<LoadedTest, StorageError> {
        let url = self.resolve(&id.resource_path())?;
        tracing::debug!(test = %id, %url, "fetching test document");
        let record: TestDefinitionRecord = self.get_json(url, id.as_str()).await?;
        Ok(LoadedTest {
            id: id.clone(),
            record,
            base_path: self.resolve(&id.base_path())?.to_string(),
        })
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, StorageError> {
        let url = self.resolve("tests/index.json")?;
        let entries: Vec<String> = self.get_json(url, "tests/index.json").await?;

        let mut listings = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = match TestId::new(entry.as_str()) {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(entry = %entry, error = %err, "skipping invalid test id in index");
                    continue;
                }
            };
            match self.load_test(&id).await {
                Ok(loaded) => listings.push(TestListing::from_record(id, &loaded.record)),
                Err(err) => tracing::warn!(test = %id, error = %err, "skipping unreadable test"),
            }
        }
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gets_trailing_slash() {
        let repo = HttpTestRepository::new("https://quiz.example.org/static").unwrap();
        assert_eq!(repo.base().as_str(), "https://quiz.example.org/static/");
        let url = repo.resolve("tests/net/test.json").unwrap();
        assert_eq!(url.as_str(), "https://quiz.example.org/static/tests/net/test.json");
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(HttpTestRepository::new("not a url").is_err());
    }
}
