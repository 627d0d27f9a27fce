//! Moon-phase from a low-precision lunar ephemeris (Schaefer 1985)
//!
//! Accuracy: ±1 day for the moon's age, which is plenty for a 40 px disc.
//! References: Sky & Telescope BASIC phase routine (Mar 1985).

use chrono::{Datelike, NaiveDate};

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_2;

/// Age of the Moon in days since New, after Schaefer's 1985 routine.
///
/// `year` is astronomer's year (e.g. 2000).
/// `month` is 1 = Jan … 12 = Dec.
/// `day` can be fractional (UTC noon = 0.5).
pub fn schaefer_moon_age(year: i32, month: u32, day: f64) -> f64 {
    // Jan/Feb count as months 13/14 of the previous year
    let (mut y, mut m) = (year, month as i32);
    if m < 3 {
        y -= 1;
        m += 12;
    }
    m += 1;

    // 694 039.09 d from JD 0 to the 1900-01-00 12 UT new moon
    let days = (365.25 * f64::from(y)).floor() + (30.6 * f64::from(m)).floor() + day - 694_039.09;

    let cycle = (days / SYNODIC_MONTH_DAYS).rem_euclid(1.0);
    cycle * SYNODIC_MONTH_DAYS
}

/// Fraction of the synodic month elapsed: 0.0 and 1.0 new, 0.5 full.
///
/// Values below 0.5 are the waxing half, 0.5 and above the waning half.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MoonPhase(f64);

impl MoonPhase {
    /// Clamp into `[0, 1]`; NaN becomes new moon.
    pub fn new(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self(0.0);
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    /// Phase at noon UTC of `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        let age = schaefer_moon_age(date.year(), date.month(), f64::from(date.day()) + 0.5);
        Self::new(age / SYNODIC_MONTH_DAYS)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    pub fn is_waxing(self) -> bool {
        self.0 < 0.5
    }
}
