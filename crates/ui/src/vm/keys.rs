/// What a key press asks the quiz to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(usize),
    Next,
    Previous,
}

impl QuizIntent {
    /// Map a DOM key name to an intent. Digits `1`-`9` pick a choice and are
    /// ignored past `choice_count`.
    #[must_use]
    pub fn from_key(key: &str, choice_count: usize) -> Option<Self> {
        match key {
            "Enter" | "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            _ => {
                let mut chars = key.chars();
                let digit = chars.next()?.to_digit(10)?;
                if chars.next().is_some() || digit == 0 {
                    return None;
                }
                let index = digit as usize - 1;
                (index < choice_count).then_some(Self::Select(index))
            }
        }
    }
}
