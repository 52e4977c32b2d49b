use async_trait::async_trait;
use quiz_core::model::{TestDefinitionRecord, TestId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("test not found: {0}")]
    NotFound(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// A test document together with the prefix its relative assets resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTest {
    pub id: TestId,
    pub record: TestDefinitionRecord,
    pub base_path: String,
}

/// Entry on the test selection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestListing {
    pub id: TestId,
    pub title: String,
    pub code: String,
    pub question_count: usize,
}

impl TestListing {
    #[must_use]
    pub fn from_record(id: TestId, record: &TestDefinitionRecord) -> Self {
        Self {
            id,
            title: record.title.clone(),
            code: record.code.clone(),
            question_count: record.questions.len(),
        }
    }
}

/// Source of test documents.
#[async_trait]
pub trait TestRepository: Send + Sync {
    /// Fetch the document for `id` from `tests/<id>/test.json`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there is no such test, or other
    /// storage errors when it cannot be read or parsed.
    async fn load_test(&self, id: &TestId) -> Result<LoadedTest, StorageError>;

    /// List the available tests, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalogue itself cannot be read.
    async fn list_tests(&self) -> Result<Vec<TestListing>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tests: Arc<Mutex<BTreeMap<TestId, TestDefinitionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a test document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_test(&self, id: TestId, record: TestDefinitionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .tests
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, record);
        Ok(())
    }
}

#[async_trait]
impl TestRepository for InMemoryRepository {
    async fn load_test(&self, id: &TestId) -> Result<LoadedTest, StorageError> {
        let guard = self
            .tests
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(LoadedTest {
            id: id.clone(),
            record,
            base_path: id.base_path(),
        })
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, StorageError> {
        let guard = self
            .tests
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .map(|(id, record)| TestListing::from_record(id.clone(), record))
            .collect())
    }
}
