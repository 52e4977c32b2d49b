mod answer;
mod ids;
mod question;
mod score;
mod session;
mod test_definition;

pub use answer::{AnswerKey, Selection};
pub use ids::{ParseIdError, QuestionId, TestId};
pub use question::{DefinitionError, ImageRef, Question, QuestionRecord};
pub use score::{ReviewItem, ScoreReport, rounded_percent};
pub use session::{QuizSession, QuizSessionError, SessionPhase, SessionPlan, SessionQuestion};
pub use test_definition::{TestDefinition, TestDefinitionRecord};
