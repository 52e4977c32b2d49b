use chrono::Duration;

/// `mm:ss`, with minutes growing past 99 rather than wrapping.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
