#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::{LoaderError, SessionError};
pub use loader::TestLoader;
pub use storage::TestListing;

pub use sessions::{
    Advance, QuizController, QuizState, QuizWorkflowService, SessionPlanner, SessionProgress,
};
