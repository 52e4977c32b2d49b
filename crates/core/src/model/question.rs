use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::answer::AnswerKey;
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DefinitionError {
    #[error("test has no questions")]
    NoQuestions,

    #[error("question {question} has no choices")]
    NoChoices { question: QuestionId },

    #[error("question id {question} is used more than once")]
    DuplicateQuestionId { question: QuestionId },

    #[error("question {question}: answer index {index} is outside {choices} choices")]
    AnswerOutOfRange {
        question: QuestionId,
        index: usize,
        choices: usize,
    },

    #[error("question {question}: answer index {index} is listed twice")]
    DuplicateAnswerIndex { question: QuestionId, index: usize },

    #[error("question {question}: requires {required} answers but has {choices} choices")]
    RequiredAnswersOutOfRange {
        question: QuestionId,
        required: usize,
        choices: usize,
    },

    #[error("question {question}: requires {required} answers but the key lists {found}")]
    AnswerCountMismatch {
        question: QuestionId,
        required: usize,
        found: usize,
    },
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

/// A question exactly as it appears in `test.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    #[serde(rename = "q")]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    pub choices: Vec<String>,
    pub answer: AnswerKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_answers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

//
// ─── DOMAIN ────────────────────────────────────────────────────────────────────
//

/// Image attached to a question. `src` is relative to the test's base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: Option<String>,
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    image: Option<ImageRef>,
    choices: Vec<String>,
    answer: AnswerKey,
    required_answers: usize,
    explanation: Option<String>,
}

impl Question {
    /// Validate a wire record.
    ///
    /// A missing or zero `requiredAnswers` means one answer.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionError` when the choices, answer key and required
    /// count do not describe an answerable question.
    pub fn from_record(record: QuestionRecord) -> Result<Self, DefinitionError> {
        let QuestionRecord {
            id,
            prompt,
            image,
            image_alt,
            choices,
            answer,
            required_answers,
            explanation,
        } = record;

        if choices.is_empty() {
            return Err(DefinitionError::NoChoices { question: id });
        }

        let required = required_answers.filter(|&n| n > 0).unwrap_or(1);
        if required > choices.len() {
            return Err(DefinitionError::RequiredAnswersOutOfRange {
                question: id,
                required,
                choices: choices.len(),
            });
        }

        let mut seen = HashSet::new();
        for index in answer.indices() {
            if index >= choices.len() {
                return Err(DefinitionError::AnswerOutOfRange {
                    question: id,
                    index,
                    choices: choices.len(),
                });
            }
            if !seen.insert(index) {
                return Err(DefinitionError::DuplicateAnswerIndex { question: id, index });
            }
        }

        if answer.len() != required {
            return Err(DefinitionError::AnswerCountMismatch {
                question: id,
                required,
                found: answer.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            image: image.map(|src| ImageRef {
                src,
                alt: image_alt,
            }),
            choices,
            answer,
            required_answers: required,
            explanation: explanation.filter(|text| !text.trim().is_empty()),
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

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn answer(&self) -> &AnswerKey {
        &self.answer
    }

    /// Exact number of choices that must be selected.
    #[must_use]
    pub fn required_answers(&self) -> usize {
        self.required_answers
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.required_answers > 1
    }
}
