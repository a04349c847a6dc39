//! Calendar source for dated-cache expiry.

use chrono::NaiveDate;

/// Date stamp format shared by writers of dated caches and by cleanup,
/// e.g. `Mon Oct 19 2026`.
pub const DATE_STAMP_FORMAT: &str = "%a %b %d %Y";

/// Format a date the way dated caches are stamped.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format(DATE_STAMP_FORMAT).to_string()
}

pub trait Clock: Send + Sync {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
