use std::sync::Arc;

use storage::{TestListing, TestRepository};

use super::plan::SessionPlanner;
use super::service::QuizController;
use crate::Clock;
use crate::error::SessionError;
use crate::loader::TestLoader;

/// Orchestrates loading a test and starting an attempt at it.
#[derive(Clone)]
pub struct QuizWorkflowService {
    clock: Clock,
    loader: TestLoader,
    seed: Option<u64>,
}

impl QuizWorkflowService {
    #[must_use]
    pub fn new(clock: Clock, tests: Arc<dyn TestRepository>) -> Self {
        Self {
            clock,
            loader: TestLoader::new(tests),
            seed: None,
        }
    }

    /// Make every controller this service creates shuffle reproducibly.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn loader(&self) -> &TestLoader {
        &self.loader
    }

    fn planner(&self) -> SessionPlanner {
        self.seed
            .map_or_else(SessionPlanner::new, SessionPlanner::from_seed)
    }

    /// Load `raw_id` and return a controller already in progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the test cannot be loaded.
    pub async fn start_session(&self, raw_id: Option<&str>) -> Result<QuizController, SessionError> {
        let mut controller = self.prepare(raw_id).await?;
        controller.start()?;
        Ok(controller)
    }

    /// Load `raw_id` and return an idle controller, for a start screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the test cannot be loaded.
    pub async fn prepare(&self, raw_id: Option<&str>) -> Result<QuizController, SessionError> {
        let definition = self.loader.load(raw_id).await?;
        Ok(QuizController::new(definition, self.planner(), self.clock))
    }

    /// # Errors
    ///
    /// Returns `SessionError::Load` if the catalogue cannot be read.
    pub async fn list_tests(&self) -> Result<Vec<TestListing>, SessionError> {
        Ok(self.loader.list_tests().await?)
    }
}
