//! Due window used to flag items that are due soon.

use chrono::Duration;

use super::task::Timestamp;

/// Half-open interval `[now - 1 day, now + 1 day)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    /// Inclusive lower bound.
    pub start: Timestamp,
    /// Exclusive upper bound.
    pub end: Timestamp,
}

impl DueWindow {
    /// Builds the window centered on `now`.
    #[must_use]
    pub fn around(now: Timestamp) -> Self {
        let center = *now.as_datetime();
        Self {
            start: Timestamp::from_datetime(center - Duration::days(1)),
            end: Timestamp::from_datetime(center + Duration::days(1)),
        }
    }

    /// Returns `true` if `timestamp` falls inside the window.
    #[must_use]
    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        self.start <= *timestamp && *timestamp < self.end
    }
}
