mod keys;
mod listing_vm;
mod quiz_vm;
mod results_vm;
mod time_fmt;

pub use keys::QuizIntent;
pub use listing_vm::{TestCardVm, map_test_cards};
pub use quiz_vm::{ChoiceVm, ImageVm, QuestionScreenVm, choice_marker};
pub use results_vm::{ResultsVm, ReviewRowVm};
pub use time_fmt::format_elapsed;
