use quiz_core::model::QuizSession;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub percent: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Self {
        Self {
            total: session.total(),
            answered: session.answered_count(),
            percent: session.progress_percent(),
            is_complete: session.is_finished(),
        }
    }
}
