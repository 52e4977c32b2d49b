use chrono::Duration;
use std::fmt;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{QuizSession, QuizSessionError, ScoreReport, TestDefinition};

use super::plan::SessionPlanner;
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of the single attempt a controller owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    Idle,
    InProgress(QuizSession),
    Finished {
        session: QuizSession,
        report: ScoreReport,
    },
}

/// Outcome of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    Finished,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the active attempt at one test and applies the named transitions.
///
/// Each transition computes the next `QuizSession` value first and swaps it
/// in only on success, so a rejected action leaves the state untouched.
pub struct QuizController {
    definition: Arc<TestDefinition>,
    planner: SessionPlanner,
    clock: Clock,
    state: QuizState,
    attempts: u32,
}

impl QuizController {
    #[must_use]
    pub fn new(definition: Arc<TestDefinition>, planner: SessionPlanner, clock: Clock) -> Self {
        Self {
            definition,
            planner,
            clock,
            state: QuizState::Idle,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &Arc<TestDefinition> {
        &self.definition
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// The running or finished attempt; `None` while idle.
    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            QuizState::Idle => None,
            QuizState::InProgress(session) | QuizState::Finished { session, .. } => Some(session),
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        match &self.state {
            QuizState::Finished { report, .. } => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, QuizState::Idle)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished { .. })
    }

    /// Number of attempts started, including the current one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session()
            .map(SessionProgress::from_session)
            .unwrap_or_default()
    }

    /// Wall time of the attempt; frozen once finished, zero while idle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.session()
            .map_or_else(Duration::zero, |session| session.elapsed(self.clock.now()))
    }

    /// Idle → InProgress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless idle.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if !self.is_idle() {
            return Err(SessionError::AlreadyStarted);
        }
        self.begin()
    }

    /// Throw away the current attempt and begin a new, independently shuffled one.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError::Quiz` if the fresh plan cannot be laid out.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.begin()
    }

    fn begin(&mut self) -> Result<(), SessionError> {
        let plan = self.planner.plan(&self.definition);
        let session = QuizSession::start(&self.definition, &plan, self.clock.now())?;
        self.attempts = self.attempts.saturating_add(1);
        tracing::debug!(
            test = %self.definition.id(),
            attempt = self.attempts,
            "quiz session started"
        );
        self.state = QuizState::InProgress(session);
        Ok(())
    }

    fn in_progress(&self) -> Result<&QuizSession, SessionError> {
        match &self.state {
            QuizState::InProgress(session) => Ok(session),
            QuizState::Idle => Err(SessionError::NotStarted),
            QuizState::Finished { .. } => Err(QuizSessionError::Finished.into()),
        }
    }

    fn settle(&mut self, next: QuizSession) -> Result<(), SessionError> {
        if next.is_finished() {
            let report = next.report()?;
            tracing::info!(
                test = %self.definition.id(),
                correct = report.correct(),
                total = report.total(),
                elapsed_secs = report.elapsed().num_seconds(),
                "quiz finished"
            );
            self.state = QuizState::Finished {
                session: next,
                report,
            };
        } else {
            self.state = QuizState::InProgress(next);
        }
        Ok(())
    }

    /// Click a choice of the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` while idle, or the rejected
    /// session transition.
    pub fn select(&mut self, choice: usize) -> Result<(), SessionError> {
        let next = self.in_progress()?.select(choice)?;
        self.settle(next)
    }

    /// Next question, or finish on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(NotAnswered)` while the current question
    /// has the wrong number of selections.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let next = self.in_progress()?.advance(self.clock.now())?;
        self.settle(next)?;
        Ok(if self.is_finished() {
            Advance::Finished
        } else {
            Advance::Moved
        })
    }

    /// Previous question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz(AtFirstQuestion)` at the first question.
    pub fn retreat(&mut self) -> Result<(), SessionError> {
        let next = self.in_progress()?.retreat()?;
        self.settle(next)
    }

    /// End the attempt now and score it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` while idle, or `Quiz(Finished)` if
    /// already finished.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        let next = self.in_progress()?.finish(self.clock.now())?;
        self.settle(next)
    }
}

impl fmt::Debug for QuizController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizController")
            .field("test_id", self.definition.id())
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
