mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::SessionPlanner;
pub use progress::SessionProgress;
pub use service::{Advance, QuizController, QuizState};
pub use workflow::QuizWorkflowService;
