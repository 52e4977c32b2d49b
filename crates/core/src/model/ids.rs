use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a test, used as the directory name under `tests/`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TestId(String);

impl TestId {
    /// Creates a new `TestId` after checking it is a single safe path segment.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` for blank values, `.`/`..`, or characters outside
    /// ASCII letters, digits, `-`, `_` and `.`.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = raw.into();
        let value = raw.trim();
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if value.is_empty() || value == "." || value == ".." || !valid_chars {
            return Err(ParseIdError {
                kind: "TestId",
                raw,
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative location of the test document, `tests/<id>/test.json`.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!("tests/{}/test.json", self.0)
    }

    /// Relative prefix for the test's assets, `tests/<id>/`.
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("tests/{}/", self.0)
    }
}

impl<'de> Deserialize<'de> for TestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TestId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a question, unique within one test.
///
/// Test documents use either numbers or strings, both normalise to the same
/// textual form so `1` and `"1"` refer to the same question.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuestionId {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

/// Integral floats print without a fraction, so `2.0` and `2` coincide.
fn float_id(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawQuestionId::deserialize(deserializer)? {
            RawQuestionId::Unsigned(n) => QuestionId::from(n),
            RawQuestionId::Signed(n) => QuestionId::new(n.to_string()),
            RawQuestionId::Float(n) => QuestionId::new(float_id(n)),
            RawQuestionId::Text(s) => QuestionId::new(s),
        })
    }
}

impl fmt::Debug for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestId({})", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for TestId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestId::new(s)
    }
}

impl FromStr for QuestionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QuestionId::new(s))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
