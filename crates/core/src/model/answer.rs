use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Correct answer(s) of a question, as choice indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Single(usize),
    Multiple(Vec<usize>),
}

impl AnswerKey {
    /// All correct indices, in declaration order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        match self {
            AnswerKey::Single(index) => vec![*index],
            AnswerKey::Multiple(indices) => indices.clone(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            AnswerKey::Single(_) => 1,
            AnswerKey::Multiple(indices) => indices.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-express the key after the choices were reordered.
    ///
    /// `order[new] == old`: position `new` of the shuffled list holds the
    /// choice that was at `old`. Each old index is looked up in `order` so the
    /// key keeps pointing at the same choice text. Returns `None` if an index
    /// does not occur in `order`.
    #[must_use]
    pub fn remap(&self, order: &[usize]) -> Option<Self> {
        let position_of = |old: usize| order.iter().position(|&i| i == old);
        match self {
            AnswerKey::Single(index) => position_of(*index).map(AnswerKey::Single),
            AnswerKey::Multiple(indices) => indices
                .iter()
                .map(|&old| position_of(old))
                .collect::<Option<Vec<_>>>()
                .map(AnswerKey::Multiple),
        }
    }
}

/// Choices currently selected for one question, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<usize>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().collect())
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, choice: usize) -> bool {
        self.0.contains(&choice)
    }

    /// Apply a click on `choice`.
    ///
    /// With one required answer the click replaces the selection. Otherwise a
    /// selected choice is removed, and an unselected one is appended only
    /// while fewer than `required` are selected; a full selection ignores the
    /// click.
    #[must_use]
    pub fn toggle(&self, choice: usize, required: usize) -> Self {
        if required <= 1 {
            return Self(vec![choice]);
        }
        if self.contains(choice) {
            return Self(self.0.iter().copied().filter(|&i| i != choice).collect());
        }
        if self.0.len() < required {
            let mut next = self.0.clone();
            next.push(choice);
            return Self(next);
        }
        self.clone()
    }

    /// A question counts as answered only at exactly `required` selections.
    #[must_use]
    pub fn is_complete(&self, required: usize) -> bool {
        self.0.len() == required
    }

    /// Exact, order-independent comparison against the answer key.
    #[must_use]
    pub fn matches(&self, key: &AnswerKey) -> bool {
        let expected = key.indices();
        if self.0.len() != expected.len() {
            return false;
        }
        let chosen: BTreeSet<_> = self.0.iter().copied().collect();
        let expected: BTreeSet<_> = expected.into_iter().collect();
        chosen == expected
    }
}
