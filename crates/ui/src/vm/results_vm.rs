use quiz_core::model::{ReviewItem, ScoreReport};

use crate::vm::time_fmt::format_elapsed;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub label: String,
    pub prompt: String,
    pub verdict: &'static str,
    pub is_correct: bool,
    pub selected: String,
    pub expected: String,
    pub explanation: String,
}

impl From<&ReviewItem> for ReviewRowVm {
    fn from(item: &ReviewItem) -> Self {
        let join = |texts: &[String]| {
            if texts.is_empty() {
                "(none)".to_string()
            } else {
                texts.join(", ")
            }
        };
        Self {
            label: format!("Q{}.", item.number),
            prompt: item.prompt.clone(),
            verdict: if item.is_correct { "Correct" } else { "Incorrect" },
            is_correct: item.is_correct,
            selected: join(&item.selected),
            expected: join(&item.expected),
            explanation: item.explanation.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub score_label: String,
    pub elapsed_label: String,
    pub rows: Vec<ReviewRowVm>,
}

impl From<&ScoreReport> for ResultsVm {
    fn from(report: &ScoreReport) -> Self {
        Self {
            score_label: report.label(),
            elapsed_label: format_elapsed(report.elapsed()),
            rows: report.items().iter().map(ReviewRowVm::from).collect(),
        }
    }
}
