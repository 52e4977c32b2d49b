use chrono::Duration;

use crate::model::ids::QuestionId;

/// Review line for one question of a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    /// 1-based position in presentation order.
    pub number: usize,
    pub question_id: QuestionId,
    pub prompt: String,
    pub is_correct: bool,
    pub selected: Vec<String>,
    pub expected: Vec<String>,
    pub explanation: Option<String>,
}

/// Final score of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    correct: usize,
    total: usize,
    elapsed: Duration,
    items: Vec<ReviewItem>,
}

impl ScoreReport {
    #[must_use]
    pub fn new(items: Vec<ReviewItem>, elapsed: Duration) -> Self {
        let correct = items.iter().filter(|item| item.is_correct).count();
        Self {
            correct,
            total: items.len(),
            elapsed,
            items,
        }
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    /// Share of correct answers, rounded half up.
    #[must_use]
    pub fn percent(&self) -> u32 {
        rounded_percent(self.correct, self.total)
    }

    /// `"2/3 — 67%"`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{} — {}%", self.correct, self.total, self.percent())
    }
}

/// `part / whole` as a whole percentage, rounded half up. Zero for an empty whole.
#[must_use]
pub fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part * 200 + whole) / (whole * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
