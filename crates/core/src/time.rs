use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Wall-clock span of a quiz attempt. Stops counting once stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stopwatch {
    started_at: DateTime<Utc>,
    stopped_at: Option<DateTime<Utc>>,
}

impl Stopwatch {
    #[must_use]
    pub fn start(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            stopped_at: None,
        }
    }

    /// Freeze the stopwatch. A second stop keeps the first instant.
    #[must_use]
    pub fn stop(self, at: DateTime<Utc>) -> Self {
        Self {
            stopped_at: self.stopped_at.or(Some(at)),
            ..self
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.stopped_at
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Time elapsed up to `now`, or up to the stop instant. Never negative.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let end = self.stopped_at.unwrap_or(now);
        (end - self.started_at).max(Duration::zero())
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
