use async_trait::async_trait;
use quiz_core::model::{TestDefinitionRecord, TestId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::repository::{LoadedTest, StorageError, TestListing, TestRepository};

/// Reads tests laid out as `<root>/tests/<id>/test.json`.
#[derive(Debug, Clone)]
pub struct FsTestRepository {
    root: PathBuf,
}

impl FsTestRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: &TestId) -> PathBuf {
        self.root.join(id.resource_path())
    }

    /// Base path for assets: the test directory, with a trailing separator.
    fn asset_base(&self, id: &TestId) -> String {
        let dir = self.root.join(id.base_path());
        let mut base = dir.to_string_lossy().into_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        base
    }

    async fn read_record(&self, id: &TestId) -> Result<TestDefinitionRecord, StorageError> {
        let path = self.document_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.to_string()));
            }
            Err(err) => {
                return Err(StorageError::Connection(format!("{}: {err}", path.display())));
            }
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl TestRepository for FsTestRepository {
    async fn load_test(&self, id: &TestId) -> Result<LoadedTest, StorageError> {
        let record = self.read_record(id).await?;
        tracing::debug!(test = %id, root = %self.root.display(), "read test document");
        Ok(LoadedTest {
            id: id.clone(),
            record,
            base_path: self.asset_base(id),
        })
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, StorageError> {
        let tests_dir = self.root.join("tests");
        let mut entries = match tokio::fs::read_dir(&tests_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StorageError::Connection(format!(
                    "{}: {err}",
                    tests_dir.display()
                )));
            }
        };

        let mut listings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
        {
            let name = entry.file_name();
            let Ok(id) = TestId::new(name.to_string_lossy()) else {
                continue;
            };
            let is_file = tokio::fs::metadata(self.document_path(&id))
                .await
                .is_ok_and(|meta| meta.is_file());
            if !is_file {
                continue;
            }
            match self.read_record(&id).await {
                Ok(record) => listings.push(TestListing::from_record(id, &record)),
                Err(err) => tracing::warn!(test = %id, error = %err, "skipping unreadable test"),
            }
        }

        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listings)
    }
}
