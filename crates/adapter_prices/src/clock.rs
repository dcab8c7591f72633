//! Time sources for lookback windows.

use chrono::{DateTime, Duration, Utc};

/// Days per year used by the lookback window.
///
/// Fixed calendar approximation; leap days are not accounted for.
pub const DAYS_PER_YEAR: i64 = 365;

/// Longest lookback accepted by the risk layer.
pub const MAX_LOOKBACK_YEARS: u32 = 200;

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `[start, end]` window covering `years * 365` days up to `end`.
///
/// `None` when the start falls outside the representable date range.
pub fn lookback_window(end: DateTime<Utc>, years: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let span = Duration::try_days(DAYS_PER_YEAR * i64::from(years))?;
    let start = end.checked_sub_signed(span)?;
    Some((start, end))
}
