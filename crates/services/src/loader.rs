use std::sync::Arc;

use quiz_core::model::{TestDefinition, TestId};
use storage::{TestListing, TestRepository};

use crate::error::LoaderError;

/// Resolves a test id to a validated, shareable `TestDefinition`.
///
/// Failures are logged once here and returned; there is no retry and no
/// partially loaded state.
#[derive(Clone)]
pub struct TestLoader {
    tests: Arc<dyn TestRepository>,
}

impl TestLoader {
    #[must_use]
    pub fn new(tests: Arc<dyn TestRepository>) -> Self {
        Self { tests }
    }

    /// Load the test named by `raw_id`.
    ///
    /// # Errors
    ///
    /// Returns `LoaderError::MissingTestId` for a missing or blank id,
    /// `InvalidTestId` when it is not a safe path segment, `Storage` when the
    /// document cannot be fetched or parsed, and `Definition` when it fails
    /// validation.
    pub async fn load(&self, raw_id: Option<&str>) -> Result<Arc<TestDefinition>, LoaderError> {
        let result = self.load_inner(raw_id).await;
        match &result {
            Ok(definition) => tracing::info!(
                test = %definition.id(),
                title = definition.title(),
                questions = definition.len(),
                "test loaded"
            ),
            Err(err) => tracing::warn!(test = raw_id.unwrap_or(""), error = %err, "test failed to load"),
        }
        result
    }

    async fn load_inner(&self, raw_id: Option<&str>) -> Result<Arc<TestDefinition>, LoaderError> {
        let raw_id = raw_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(LoaderError::MissingTestId)?;
        let id = TestId::new(raw_id)?;

        let loaded = self.tests.load_test(&id).await?;
        let definition = TestDefinition::from_record(loaded.id, loaded.record, loaded.base_path)
            .map_err(|source| LoaderError::Definition { id, source })?;

        Ok(Arc::new(definition))
    }

    /// Tests available for selection.
    ///
    /// # Errors
    ///
    /// Returns `LoaderError::Storage` if the catalogue cannot be read.
    pub async fn list_tests(&self) -> Result<Vec<TestListing>, LoaderError> {
        Ok(self.tests.list_tests().await?)
    }
}
