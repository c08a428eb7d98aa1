use chrono::{DateTime, Duration, Local, NaiveDateTime, SubsecRound};

use super::format_timestamp;

/// Default length of the trailing window used for "current" balances.
pub const DEFAULT_WINDOW_HOURS: u32 = 23;

/// A trailing time window ending at a fixed instant.
///
/// "Now" is captured once at construction so that balances and the total
/// computed from the same window always agree on the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceWindow {
    hours: u32,
    now: DateTime<Local>,
}

impl BalanceWindow {
    /// Window of `hours` ending at the current local time.
    pub fn trailing(hours: u32) -> Self {
        Self::ending_at(hours, Local::now())
    }

    /// Window of `hours` ending at `now`. Sub-second precision is dropped,
    /// matching the granularity of stored timestamps.
    pub fn ending_at(hours: u32, now: DateTime<Local>) -> Self {
        Self {
            hours,
            now: now.trunc_subsecs(0),
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    /// Local wall-clock time of the (exclusive) lower bound.
    /// Windows reaching past the representable range cover all history.
    pub fn cutoff(&self) -> NaiveDateTime {
        Duration::try_hours(i64::from(self.hours))
            .and_then(|span| self.now.checked_sub_signed(span))
            .map(|cutoff| cutoff.naive_local())
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Cutoff rendered in the storage format, for comparison against the
    /// `datetime` column.
    pub fn cutoff_key(&self) -> String {
        format_timestamp(&self.cutoff())
    }

    /// An entry is inside the window only if it is strictly after the cutoff.
    pub fn contains(&self, recorded_at: &NaiveDateTime) -> bool {
        *recorded_at > self.cutoff()
    }
}

impl Default for BalanceWindow {
    fn default() -> Self {
        Self::trailing(DEFAULT_WINDOW_HOURS)
    }
}
