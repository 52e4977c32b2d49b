use chrono::Duration;
use quiz_core::model::QuizSession;

use crate::vm::time_fmt::format_elapsed;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceVm {
    pub index: usize,
    pub marker: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageVm {
    pub src: String,
    pub alt: String,
}

/// Everything the question screen renders for the current position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionScreenVm {
    pub number: usize,
    pub total: usize,
    pub progress_percent: u32,
    pub prompt: String,
    pub image: Option<ImageVm>,
    pub choices: Vec<ChoiceVm>,
    pub required_answers: usize,
    pub can_retreat: bool,
    pub can_advance: bool,
    pub next_label: &'static str,
    pub elapsed_label: String,
}

/// Letter shown beside a choice: `A`, `B`, ... then numbers past `Z`.
#[must_use]
pub fn choice_marker(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or_else(|| (index + 1).to_string(), |i| char::from(b'A' + i).to_string())
}

impl QuestionScreenVm {
    #[must_use]
    pub fn from_session(session: &QuizSession, elapsed: Duration) -> Self {
        let question = session.current_question();
        let selection = session.current_selection();

        let choices = question
            .choices()
            .iter()
            .enumerate()
            .map(|(index, text)| ChoiceVm {
                index,
                marker: choice_marker(index),
                text: text.clone(),
                selected: selection.contains(index),
            })
            .collect();

        let image = question.image_src().map(|src| ImageVm {
            src: src.to_owned(),
            alt: question
                .image()
                .and_then(|image| image.alt.clone())
                .unwrap_or_default(),
        });

        Self {
            number: session.current_index() + 1,
            total: session.total(),
            progress_percent: session.progress_percent(),
            prompt: question.prompt().to_owned(),
            image,
            choices,
            required_answers: question.required_answers(),
            can_retreat: session.can_retreat(),
            can_advance: session.can_advance(),
            next_label: if session.is_last() {
                "Submit & Finish"
            } else {
                "Submit & Next →"
            },
            elapsed_label: format_elapsed(elapsed),
        }
    }

    #[must_use]
    pub fn heading(&self) -> String {
        format!("Question {} / {}", self.number, self.total)
    }

    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.required_answers > 1
    }

    #[must_use]
    pub fn hint(&self) -> Option<String> {
        self.is_multi_select()
            .then(|| format!("Select {} answers", self.required_answers))
    }
}
