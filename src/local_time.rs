//! # Local Calendar Day
//!
//! A [`LocalDay`] pairs a calendar date with a fixed UTC offset. It is the single place
//! where instants are turned into local-day fractions ("progress"), so no other module
//! adds or subtracts timezone offsets by hand.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Length of a local calendar day in seconds.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A local calendar date observed at a fixed UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalDay {
    date: NaiveDate,
    offset: FixedOffset,
}

impl LocalDay {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        Self { date, offset }
    }

    /// The local day that contains `instant` at the given offset.
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            date: instant.with_timezone(&offset).date_naive(),
            offset,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The instant of local midnight at the start of this day.
    pub fn midnight(&self) -> DateTime<Utc> {
        let local = self.date.and_time(NaiveTime::MIN);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// The instant of local midnight at the end of this day (exclusive bound).
    pub fn next_midnight(&self) -> DateTime<Utc> {
        self.midnight() + Duration::days(1)
    }

    /// Whether `instant` falls in `[midnight, next_midnight)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.midnight() <= instant && instant < self.next_midnight()
    }

    /// Fraction of this day elapsed at `instant`.
    ///
    /// Not clamped: instants before midnight give negative values and instants on the
    /// following day give values above 1.0.
    pub fn progress_of(&self, instant: DateTime<Utc>) -> f64 {
        let elapsed = instant - self.midnight();
        elapsed.num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000.0)
    }

    /// `instant` expressed in this day's offset, for display.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }
}
