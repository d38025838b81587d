//! Wall-clock source for session timing.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Platform time source. The web adapter backs this with `Date.now()`.
pub trait Clock {
    fn now_ms(&self) -> EpochMillis;
}

/// System time via `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMillis {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests and simulations. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<EpochMillis>>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(ms: EpochMillis) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn set(&self, ms: EpochMillis) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: EpochMillis) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> EpochMillis {
        self.now.get()
    }
}

/// ISO-8601 rendering in UTC with millisecond precision, e.g.
/// `2024-05-01T09:30:00.000Z`.
#[must_use]
pub fn iso8601(ms: EpochMillis) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::starting_at(1_000);
        let other = clock.clone();
        clock.advance(250);
        assert_eq!(other.now_ms(), 1_250);
        other.set(5);
        assert_eq!(clock.now_ms(), 5);
    }

    #[test]
    fn iso8601_matches_browser_format() {
        assert_eq!(iso8601(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso8601(1_714_555_800_123), "2024-05-01T09:30:00.123Z");
    }
}
