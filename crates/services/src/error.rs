//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{DefinitionError, ParseIdError, QuizSessionError, TestId};
use storage::StorageError;

/// Errors emitted by `TestLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoaderError {
    #[error("no test selected")]
    MissingTestId,
    #[error(transparent)]
    InvalidTestId(#[from] ParseIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("test {id} is malformed: {source}")]
    Definition {
        id: TestId,
        #[source]
        source: DefinitionError,
    },
}

impl LoaderError {
    /// Short text suitable for showing to the learner.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LoaderError::MissingTestId | LoaderError::InvalidTestId(_) => "No test selected",
            LoaderError::Storage(StorageError::NotFound(_)) => "Test not found",
            _ => "Test failed to load",
        }
    }
}

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has not been started")]
    NotStarted,
    #[error("session already started")]
    AlreadyStarted,
    #[error(transparent)]
    Quiz(#[from] QuizSessionError),
    #[error(transparent)]
    Load(#[from] LoaderError),
}
