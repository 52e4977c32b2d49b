use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::ids::{QuestionId, TestId};
use crate::model::question::{DefinitionError, Question, QuestionRecord};

/// A test document exactly as stored in `tests/<id>/test.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinitionRecord {
    pub title: String,
    #[serde(default)]
    pub code: String,
    pub questions: Vec<QuestionRecord>,
}

/// A loaded, validated test. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    id: TestId,
    title: String,
    code: String,
    base_path: String,
    questions: Vec<Question>,
}

impl TestDefinition {
    /// Validate a stored record and attach the asset base path.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError` if there are no questions, a question id
    /// repeats, or any question fails validation.
    pub fn from_record(
        id: TestId,
        record: TestDefinitionRecord,
        base_path: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        if record.questions.is_empty() {
            return Err(DefinitionError::NoQuestions);
        }

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(record.questions.len());
        for question in record.questions {
            if !seen.insert(question.id.clone()) {
                return Err(DefinitionError::DuplicateQuestionId {
                    question: question.id,
                });
            }
            questions.push(Question::from_record(question)?);
        }

        Ok(Self {
            id,
            title: record.title,
            code: record.code,
            base_path: base_path.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Prefix for relative asset references, always ending in `/`.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Questions in document order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Resolved image location for a question, if it has one.
    #[must_use]
    pub fn image_src(&self, question: &Question) -> Option<String> {
        question
            .image()
            .map(|image| format!("{}{}", self.base_path, image.src))
    }

    /// `"<title> — <code>"`, or just the title when there is no code.
    #[must_use]
    pub fn window_title(&self) -> String {
        if self.code.is_empty() {
            self.title.clone()
        } else {
            format!("{} — {}", self.title, self.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::answer::AnswerKey;

    fn question(id: u64) -> QuestionRecord {
        QuestionRecord {
            id: QuestionId::from(id),
            prompt: format!("Q{id}"),
            image: Some(format!("img/{id}.png")),
            image_alt: None,
            choices: vec!["yes".into(), "no".into()],
            answer: AnswerKey::Single(0),
            required_answers: None,
            explanation: None,
        }
    }

    fn record(questions: Vec<QuestionRecord>) -> TestDefinitionRecord {
        TestDefinitionRecord {
            title: "Networking".into(),
            code: "NET-101".into(),
            questions,
        }
    }

    #[test]
    fn builds_and_resolves_assets() {
        let id = TestId::new("net").unwrap();
        let base = id.base_path();
        let def = TestDefinition::from_record(id, record(vec![question(1), question(2)]), base)
            .unwrap();

        assert_eq!(def.len(), 2);
        assert_eq!(def.window_title(), "Networking — NET-101");
        let q = def.question(&QuestionId::from(2)).unwrap();
        assert_eq!(def.image_src(q).as_deref(), Some("tests/net/img/2.png"));
    }

    #[test]
    fn rejects_empty_tests() {
        let err = TestDefinition::from_record(TestId::new("net").unwrap(), record(vec![]), "")
            .unwrap_err();
        assert_eq!(err, DefinitionError::NoQuestions);
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let err = TestDefinition::from_record(
            TestId::new("net").unwrap(),
            record(vec![question(1), question(1)]),
            "",
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateQuestionId { .. }));
    }

    #[test]
    fn missing_code_defaults_to_empty() {
        let json = r#"{"title": "Solo", "questions": [{"id": 1, "q": "?", "choices": ["a"], "answer": 0}]}"#;
        let rec: TestDefinitionRecord = serde_json::from_str(json).unwrap();
        let def = TestDefinition::from_record(TestId::new("solo").unwrap(), rec, "").unwrap();
        assert_eq!(def.code(), "");
        assert_eq!(def.window_title(), "Solo");
    }
}
