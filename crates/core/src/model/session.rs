use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::model::answer::{AnswerKey, Selection};
use crate::model::ids::{QuestionId, TestId};
use crate::model::question::{ImageRef, Question};
use crate::model::score::{ReviewItem, ScoreReport, rounded_percent};
use crate::model::test_definition::TestDefinition;
use crate::time::Stopwatch;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("session plan does not match the test: {0}")]
    PlanMismatch(String),

    #[error("choice {choice} is outside {choices} choices")]
    ChoiceOutOfRange { choice: usize, choices: usize },

    #[error("question {question} needs exactly {required} selected answers")]
    NotAnswered { question: QuestionId, required: usize },

    #[error("already at the first question")]
    AtFirstQuestion,

    #[error("session already finished")]
    Finished,

    #[error("session not finished yet")]
    NotFinished,
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// The randomised layout of one attempt.
///
/// `choice_orders[id][new] == old`: position `new` shows the choice that was
/// at `old` in the test document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    question_order: Vec<QuestionId>,
    choice_orders: HashMap<QuestionId, Vec<usize>>,
}

impl SessionPlan {
    #[must_use]
    pub fn new(
        question_order: Vec<QuestionId>,
        choice_orders: HashMap<QuestionId, Vec<usize>>,
    ) -> Self {
        Self {
            question_order,
            choice_orders,
        }
    }

    /// Document order with unshuffled choices.
    #[must_use]
    pub fn identity(definition: &TestDefinition) -> Self {
        let question_order = definition.questions().iter().map(|q| q.id().clone()).collect();
        let choice_orders = definition
            .questions()
            .iter()
            .map(|q| (q.id().clone(), (0..q.choices().len()).collect()))
            .collect();
        Self::new(question_order, choice_orders)
    }

    #[must_use]
    pub fn question_order(&self) -> &[QuestionId] {
        &self.question_order
    }

    #[must_use]
    pub fn choice_order(&self, id: &QuestionId) -> Option<&[usize]> {
        self.choice_orders.get(id).map(Vec::as_slice)
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &i in order {
        match seen.get_mut(i) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

//
// ─── QUESTION VIEW ─────────────────────────────────────────────────────────────
//

/// A question as shown in one session: choices reordered, key remapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuestion {
    id: QuestionId,
    prompt: String,
    image: Option<ImageRef>,
    image_src: Option<String>,
    choices: Vec<String>,
    answer: AnswerKey,
    required_answers: usize,
    explanation: Option<String>,
}

impl SessionQuestion {
    fn shuffled(
        question: &Question,
        order: &[usize],
        image_src: Option<String>,
    ) -> Result<Self, QuizSessionError> {
        if !is_permutation(order, question.choices().len()) {
            return Err(QuizSessionError::PlanMismatch(format!(
                "choice order of question {} is not a permutation",
                question.id()
            )));
        }
        let choices = order.iter().map(|&old| question.choices()[old].clone()).collect();
        let answer = question.answer().remap(order).ok_or_else(|| {
            QuizSessionError::PlanMismatch(format!(
                "answer of question {} cannot be remapped",
                question.id()
            ))
        })?;

        Ok(Self {
            id: question.id().clone(),
            prompt: question.prompt().to_owned(),
            image: question.image().cloned(),
            image_src,
            choices,
            answer,
            required_answers: question.required_answers(),
            explanation: question.explanation().map(str::to_owned),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Image location resolved against the test's base path.
    #[must_use]
    pub fn image_src(&self) -> Option<&str> {
        self.image_src.as_deref()
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Correct indices in this session's choice order.
    #[must_use]
    pub fn answer(&self) -> &AnswerKey {
        &self.answer
    }

    #[must_use]
    pub fn required_answers(&self) -> usize {
        self.required_answers
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    fn texts(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.choices.get(i).cloned())
            .collect()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Finished,
}

/// One attempt at a test.
///
/// The value is never mutated in place: every transition returns the next
/// session and leaves `self` untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct QuizSession {
    test_id: TestId,
    questions: Vec<SessionQuestion>,
    current: usize,
    answers: HashMap<QuestionId, Selection>,
    stopwatch: Stopwatch,
    phase: SessionPhase,
}

impl QuizSession {
    /// Lay out a new attempt according to `plan`.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::PlanMismatch` unless the plan orders every
    /// question exactly once and holds a choice permutation for each.
    pub fn start(
        definition: &TestDefinition,
        plan: &SessionPlan,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        let order = plan.question_order();
        if order.len() != definition.len() {
            return Err(QuizSessionError::PlanMismatch(format!(
                "plan orders {} questions, test has {}",
                order.len(),
                definition.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(id) {
                return Err(QuizSessionError::PlanMismatch(format!(
                    "question {id} ordered twice"
                )));
            }
            let question = definition.question(id).ok_or_else(|| {
                QuizSessionError::PlanMismatch(format!("unknown question {id}"))
            })?;
            let choice_order = plan.choice_order(id).ok_or_else(|| {
                QuizSessionError::PlanMismatch(format!("no choice order for question {id}"))
            })?;
            questions.push(SessionQuestion::shuffled(
                question,
                choice_order,
                definition.image_src(question),
            )?);
        }

        Ok(Self {
            test_id: definition.id().clone(),
            questions,
            current: 0,
            answers: HashMap::new(),
            stopwatch: Stopwatch::start(started_at),
            phase: SessionPhase::InProgress,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn question_order(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id.clone()).collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 0-based position of the current question.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &SessionQuestion {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn selection_for(&self, id: &QuestionId) -> Selection {
        self.answers.get(id).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn current_selection(&self) -> Selection {
        self.selection_for(self.current_question().id())
    }

    #[must_use]
    pub fn is_answered(&self, question: &SessionQuestion) -> bool {
        self.selection_for(question.id())
            .is_complete(question.required_answers())
    }

    /// Questions whose selection size equals their required count.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| self.is_answered(q)).count()
    }

    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        rounded_percent(self.answered_count(), self.total())
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn can_retreat(&self) -> bool {
        !self.is_finished() && self.current > 0
    }

    /// The only gate on moving forward: the current question is answered.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_finished() && self.is_answered(self.current_question())
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.stopwatch.started_at()
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.stopwatch.stopped_at()
    }

    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.stopwatch.elapsed(now)
    }

    fn ensure_in_progress(&self) -> Result<(), QuizSessionError> {
        if self.is_finished() {
            return Err(QuizSessionError::Finished);
        }
        Ok(())
    }

    /// Click on choice `choice` of the current question.
    ///
    /// # Errors
    ///
    /// Returns `Finished` after the attempt ended and `ChoiceOutOfRange` for
    /// an index past the last choice.
    pub fn select(&self, choice: usize) -> Result<Self, QuizSessionError> {
        self.ensure_in_progress()?;
        let question = self.current_question();
        if choice >= question.choices().len() {
            return Err(QuizSessionError::ChoiceOutOfRange {
                choice,
                choices: question.choices().len(),
            });
        }

        let next_selection = self
            .selection_for(question.id())
            .toggle(choice, question.required_answers());
        let mut next = self.clone();
        next.answers.insert(question.id().clone(), next_selection);
        Ok(next)
    }

    /// Move to the next question, or finish when on the last one.
    ///
    /// # Errors
    ///
    /// Returns `NotAnswered` while the current selection size differs from
    /// the required count, and `Finished` after the attempt ended.
    pub fn advance(&self, at: DateTime<Utc>) -> Result<Self, QuizSessionError> {
        self.ensure_in_progress()?;
        if !self.can_advance() {
            let question = self.current_question();
            return Err(QuizSessionError::NotAnswered {
                question: question.id().clone(),
                required: question.required_answers(),
            });
        }
        if self.is_last() {
            return self.finish(at);
        }
        Ok(Self {
            current: self.current + 1,
            ..self.clone()
        })
    }

    /// Move to the previous question.
    ///
    /// # Errors
    ///
    /// Returns `AtFirstQuestion` at position 0 and `Finished` after the
    /// attempt ended.
    pub fn retreat(&self) -> Result<Self, QuizSessionError> {
        self.ensure_in_progress()?;
        if self.current == 0 {
            return Err(QuizSessionError::AtFirstQuestion);
        }
        Ok(Self {
            current: self.current - 1,
            ..self.clone()
        })
    }

    /// End the attempt and stop its clock. Unanswered questions score as
    /// incorrect.
    ///
    /// # Errors
    ///
    /// Returns `Finished` if the attempt already ended.
    pub fn finish(&self, at: DateTime<Utc>) -> Result<Self, QuizSessionError> {
        self.ensure_in_progress()?;
        Ok(Self {
            stopwatch: self.stopwatch.stop(at),
            phase: SessionPhase::Finished,
            ..self.clone()
        })
    }

    /// Score every question in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `NotFinished` while the attempt is still running.
    pub fn report(&self) -> Result<ScoreReport, QuizSessionError> {
        let Some(completed_at) = self.completed_at() else {
            return Err(QuizSessionError::NotFinished);
        };

        let items = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let selection = self.selection_for(question.id());
                ReviewItem {
                    number: i + 1,
                    question_id: question.id().clone(),
                    prompt: question.prompt().to_owned(),
                    is_correct: selection.matches(question.answer()),
                    selected: question.texts(selection.indices()),
                    expected: question.texts(&question.answer().indices()),
                    explanation: question.explanation().map(str::to_owned),
                }
            })
            .collect();

        Ok(ScoreReport::new(items, self.elapsed(completed_at)))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("test_id", &self.test_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("phase", &self.phase)
            .field("started_at", &self.started_at())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionRecord;
    use crate::model::test_definition::TestDefinitionRecord;
    use crate::time::fixed_now;

    fn single(id: u64, answer: usize) -> QuestionRecord {
        QuestionRecord {
            id: QuestionId::from(id),
            prompt: format!("Q{id}"),
            image: None,
            image_alt: None,
            choices: vec!["a".into(), "b".into(), "c".into()],
            answer: AnswerKey::Single(answer),
            required_answers: None,
            explanation: Some(format!("because {id}")),
        }
    }

    fn multi(id: u64, answer: Vec<usize>) -> QuestionRecord {
        QuestionRecord {
            required_answers: Some(answer.len()),
            choices: vec!["w".into(), "x".into(), "y".into(), "z".into()],
            answer: AnswerKey::Multiple(answer),
            ..single(id, 0)
        }
    }

    fn definition(questions: Vec<QuestionRecord>) -> TestDefinition {
        let id = TestId::new("sample").unwrap();
        let base = id.base_path();
        TestDefinition::from_record(
            id,
            TestDefinitionRecord {
                title: "Sample".into(),
                code: "S-1".into(),
                questions,
            },
            base,
        )
        .unwrap()
    }

    fn start(def: &TestDefinition) -> QuizSession {
        QuizSession::start(def, &SessionPlan::identity(def), fixed_now()).unwrap()
    }

    #[test]
    fn plan_remaps_answer_to_same_text() {
        let def = definition(vec![single(1, 0)]);
        let mut orders = HashMap::new();
        orders.insert(QuestionId::from(1), vec![2, 0, 1]);
        let plan = SessionPlan::new(vec![QuestionId::from(1)], orders);

        let session = QuizSession::start(&def, &plan, fixed_now()).unwrap();
        let q = session.current_question();
        assert_eq!(q.choices(), &["c", "a", "b"]);
        assert_eq!(q.answer(), &AnswerKey::Single(1));
        assert_eq!(q.choices()[1], "a");
    }

    #[test]
    fn plan_must_cover_each_question_once() {
        let def = definition(vec![single(1, 0), single(2, 0)]);
        let plan = SessionPlan::new(
            vec![QuestionId::from(1), QuestionId::from(1)],
            SessionPlan::identity(&def).choice_orders,
        );
        let err = QuizSession::start(&def, &plan, fixed_now()).unwrap_err();
        assert!(matches!(err, QuizSessionError::PlanMismatch(_)));
    }

    #[test]
    fn plan_rejects_bad_choice_permutation() {
        let def = definition(vec![single(1, 0)]);
        let mut orders = HashMap::new();
        orders.insert(QuestionId::from(1), vec![0, 0, 1]);
        let plan = SessionPlan::new(vec![QuestionId::from(1)], orders);
        assert!(QuizSession::start(&def, &plan, fixed_now()).is_err());
    }

    #[test]
    fn transitions_leave_original_untouched() {
        let def = definition(vec![single(1, 0), single(2, 1)]);
        let session = start(&def);
        let next = session.select(0).unwrap();
        assert!(session.current_selection().is_empty());
        assert_eq!(next.current_selection().indices(), &[0]);
    }

    #[test]
    fn advance_is_gated_on_exact_count() {
        let def = definition(vec![multi(1, vec![0, 2]), single(2, 0)]);
        let session = start(&def);
        assert!(!session.can_advance());

        let one = session.select(0).unwrap();
        let err = one.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, QuizSessionError::NotAnswered { required: 2, .. }));

        let two = one.select(2).unwrap();
        assert!(two.can_advance());
        let moved = two.advance(fixed_now()).unwrap();
        assert_eq!(moved.current_index(), 1);
    }

    #[test]
    fn retreat_stops_at_first_question() {
        let def = definition(vec![single(1, 0), single(2, 0)]);
        let session = start(&def);
        assert!(!session.can_retreat());
        assert_eq!(session.retreat().unwrap_err(), QuizSessionError::AtFirstQuestion);

        let second = session.select(1).unwrap().advance(fixed_now()).unwrap();
        assert!(second.can_retreat());
        let back = second.retreat().unwrap();
        assert_eq!(back.current_index(), 0);
        assert_eq!(back.current_selection().indices(), &[1]);
    }

    #[test]
    fn progress_counts_only_exact_selections() {
        let def = definition(vec![multi(1, vec![0, 1]), single(2, 0)]);
        let session = start(&def);
        assert_eq!(session.progress_percent(), 0);

        let partial = session.select(3).unwrap();
        assert_eq!(partial.answered_count(), 0);

        let full = partial.select(1).unwrap();
        assert_eq!(full.answered_count(), 1);
        assert_eq!(full.progress_percent(), 50);
    }

    #[test]
    fn advancing_past_last_question_finishes() {
        let def = definition(vec![single(1, 0)]);
        let later = fixed_now() + Duration::seconds(75);
        let finished = start(&def).select(0).unwrap().advance(later).unwrap();

        assert!(finished.is_finished());
        assert_eq!(finished.completed_at(), Some(later));
        assert_eq!(finished.elapsed(later + Duration::hours(1)).num_seconds(), 75);
        assert_eq!(finished.select(1).unwrap_err(), QuizSessionError::Finished);
        assert_eq!(finished.finish(later).unwrap_err(), QuizSessionError::Finished);
    }

    #[test]
    fn report_requires_finish() {
        let def = definition(vec![single(1, 0)]);
        assert_eq!(start(&def).report().unwrap_err(), QuizSessionError::NotFinished);
    }

    #[test]
    fn partial_multi_select_scores_incorrect() {
        let def = definition(vec![multi(1, vec![0, 3]), single(2, 2)]);
        let session = start(&def)
            .select(0)
            .unwrap()
            .select(1)
            .unwrap()
            .advance(fixed_now())
            .unwrap()
            .select(2)
            .unwrap()
            .advance(fixed_now())
            .unwrap();

        let report = session.report().unwrap();
        assert_eq!(report.correct(), 1);
        assert!(!report.items()[0].is_correct);
        assert_eq!(report.items()[0].selected, vec!["w".to_string(), "x".to_string()]);
        assert_eq!(report.items()[0].expected, vec!["w".to_string(), "z".to_string()]);
        assert!(report.items()[1].is_correct);
        assert_eq!(report.items()[1].explanation.as_deref(), Some("because 2"));
        assert_eq!(report.label(), "1/2 — 50%");
    }

    #[test]
    fn select_rejects_out_of_range_choice() {
        let def = definition(vec![single(1, 0)]);
        let err = start(&def).select(3).unwrap_err();
        assert_eq!(err, QuizSessionError::ChoiceOutOfRange { choice: 3, choices: 3 });
    }
}
