//! Sun events for a local day (NOAA solar calculator)
//!
//! Low-precision solar position after the NOAA Global Monitoring Laboratory
//! spreadsheet (Meeus, *Astronomical Algorithms*, ch. 25 & 28).
//! Accuracy: about a minute for sunrise/sunset between ±72° latitude; worse near the
//! poles, where crossings become grazing.

use crate::local_time::LocalDay;
use chrono::{DateTime, Duration, Timelike, Utc};
use thiserror::Error;
use tracing::debug;

/// Apparent altitude of the sun's centre at sunrise/sunset (refraction + semi-diameter).
pub const SUNRISE_ALTITUDE_DEG: f64 = -0.833;

/// Depression below the horizon that bounds astronomical twilight (dawn/dusk).
pub const TWILIGHT_DEPRESSION_DEG: f64 = 18.0;

/// Errors that make the sun events of a day undefined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstronomyError {
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("non-finite result computing {0}")]
    NonFinite(&'static str),
}

/// How the sun meets a given altitude during one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    /// Rises through the altitude in the morning and sets through it in the evening.
    Regular {
        rise: DateTime<Utc>,
        set: DateTime<Utc>,
    },
    /// Stays above the altitude all day.
    AllDay,
    /// Never reaches the altitude.
    AllNight,
}

/// Sun events for one local day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunTimes {
    pub solar_noon: DateTime<Utc>,
    /// Sunrise / sunset.
    pub horizon: Crossing,
    /// Dawn / dusk at the twilight depression.
    pub twilight: Crossing,
}

impl SunTimes {
    /// Compute sun events around the solar noon that falls in `day`.
    pub fn for_day(latitude: f64, longitude: f64, day: &LocalDay) -> Result<Self, AstronomyError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || latitude.abs() > 90.0
            || longitude.abs() > 180.0
        {
            return Err(AstronomyError::InvalidLocation {
                latitude,
                longitude,
            });
        }

        let local_noon = day.midnight() + Duration::hours(12);
        let solar_noon = solar_noon_near(local_noon, longitude)?;
        let horizon = crossing(solar_noon, latitude, SUNRISE_ALTITUDE_DEG)?;
        let twilight = crossing(solar_noon, latitude, -TWILIGHT_DEPRESSION_DEG)?;

        debug!(%solar_noon, ?horizon, ?twilight, "sun events");
        Ok(Self {
            solar_noon,
            horizon,
            twilight,
        })
    }
}

/// Declination (radians) and equation of time (minutes) at `instant`.
fn solar_position(instant: DateTime<Utc>) -> (f64, f64) {
    let julian_day = instant.timestamp_millis() as f64 / 86_400_000.0 + 2_440_587.5;
    let t = (julian_day - 2_451_545.0) / 36_525.0;

    let mean_longitude = (280.466_46 + t * (36_000.769_83 + t * 0.000_303_2)).rem_euclid(360.0);
    let mean_anomaly = 357.529_11 + t * (35_999.050_29 - 0.000_153_7 * t);
    let eccentricity = 0.016_708_634 - t * (0.000_042_037 + 0.000_000_126_7 * t);

    let m = mean_anomaly.to_radians();
    let center = m.sin() * (1.914_602 - t * (0.004_817 + 0.000_014 * t))
        + (2.0 * m).sin() * (0.019_993 - 0.000_101 * t)
        + (3.0 * m).sin() * 0.000_289;
    let true_longitude = mean_longitude + center;

    let omega = (125.04 - 1_934.136 * t).to_radians();
    let apparent_longitude = (true_longitude - 0.005_69 - 0.004_78 * omega.sin()).to_radians();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.000_59 - t * 0.001_813))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.002_56 * omega.cos()).to_radians();

    let declination = (obliquity.sin() * apparent_longitude.sin()).asin();

    let y = (obliquity / 2.0).tan().powi(2);
    let l0 = mean_longitude.to_radians();
    let e = eccentricity;
    let equation_of_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * e * m.sin() + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * e * e * (2.0 * m).sin())
        .to_degrees();

    (declination, equation_of_time)
}

/// Minutes between `instant` and the nearest solar noon, positive when after noon.
fn minutes_past_solar_noon(instant: DateTime<Utc>, longitude: f64) -> f64 {
    let (_, equation_of_time) = solar_position(instant);
    let utc_minutes = f64::from(instant.num_seconds_from_midnight()) / 60.0;
    let true_solar_minutes = utc_minutes + 4.0 * longitude + equation_of_time;
    true_solar_minutes.rem_euclid(1440.0) - 720.0
}

fn solar_noon_near(guess: DateTime<Utc>, longitude: f64) -> Result<DateTime<Utc>, AstronomyError> {
    let mut noon = guess;
    for _ in 0..3 {
        let offset = minutes_past_solar_noon(noon, longitude);
        noon = shift_minutes(noon, -offset, "solar noon")?;
    }
    Ok(noon)
}

/// Hour angle (degrees) at which the sun sits at `altitude`, or the polar case.
fn hour_angle(latitude: f64, declination: f64, altitude: f64) -> Result<HourAngle, AstronomyError> {
    let phi = latitude.to_radians();
    let cos_h = (altitude.to_radians().sin() - phi.sin() * declination.sin())
        / (phi.cos() * declination.cos());
    if cos_h.is_nan() {
        return Err(AstronomyError::NonFinite("hour angle"));
    }
    if cos_h > 1.0 {
        return Ok(HourAngle::NeverReached);
    }
    if cos_h < -1.0 {
        return Ok(HourAngle::AlwaysAbove);
    }
    Ok(HourAngle::Degrees(cos_h.acos().to_degrees()))
}

enum HourAngle {
    Degrees(f64),
    AlwaysAbove,
    NeverReached,
}

fn crossing(solar_noon: DateTime<Utc>, latitude: f64, altitude: f64) -> Result<Crossing, AstronomyError> {
    let (noon_declination, _) = solar_position(solar_noon);
    let initial = match hour_angle(latitude, noon_declination, altitude)? {
        HourAngle::Degrees(h) => h,
        HourAngle::AlwaysAbove => return Ok(Crossing::AllDay),
        HourAngle::NeverReached => return Ok(Crossing::AllNight),
    };

    // Refine each event with the declination at its own instant; if refinement tips a
    // grazing event over the edge, keep the noon estimate.
    let refine = |sign: f64| -> Result<DateTime<Utc>, AstronomyError> {
        let mut h = initial;
        for _ in 0..2 {
            let estimate = shift_minutes(solar_noon, sign * 4.0 * h, "sun event")?;
            let (declination, _) = solar_position(estimate);
            match hour_angle(latitude, declination, altitude)? {
                HourAngle::Degrees(refined) => h = refined,
                HourAngle::AlwaysAbove | HourAngle::NeverReached => break,
            }
        }
        shift_minutes(solar_noon, sign * 4.0 * h, "sun event")
    };

    Ok(Crossing::Regular {
        rise: refine(-1.0)?,
        set: refine(1.0)?,
    })
}

fn shift_minutes(
    instant: DateTime<Utc>,
    minutes: f64,
    what: &'static str,
) -> Result<DateTime<Utc>, AstronomyError> {
    if !minutes.is_finite() {
        return Err(AstronomyError::NonFinite(what));
    }
    Ok(instant + Duration::milliseconds((minutes * 60_000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn day(y: i32, m: u32, d: u32, offset_hours: i32) -> LocalDay {
        LocalDay::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        )
    }

    fn local_hours(day: &LocalDay, instant: DateTime<Utc>) -> f64 {
        day.progress_of(instant) * 24.0
    }

    #[test]
    fn portland_summer_solstice() {
        // Portland, ME on EDT
        let day = day(2024, 6, 20, -4);
        let sun = SunTimes::for_day(43.6591, -70.2568, &day).unwrap();

        let Crossing::Regular { rise, set } = sun.horizon else {
            panic!("expected a regular day, got {:?}", sun.horizon);
        };
        // Published: sunrise 05:00, sunset 20:25
        assert!((local_hours(&day, rise) - 5.0).abs() < 0.1);
        assert!((local_hours(&day, set) - 20.42).abs() < 0.1);

        let Crossing::Regular { rise: dawn, set: dusk } = sun.twilight else {
            panic!("expected regular twilight, got {:?}", sun.twilight);
        };
        assert!(dawn < rise && set < dusk);
    }

    #[test]
    fn equinox_on_the_equator_is_twelve_hours() {
        let day = day(2024, 3, 20, 0);
        let sun = SunTimes::for_day(0.0, 0.0, &day).unwrap();
        let Crossing::Regular { rise, set } = sun.horizon else {
            panic!("expected a regular day");
        };
        let length = (set - rise).num_minutes();
        // 12h plus a few minutes of refraction
        assert!((720..=735).contains(&length), "day length {length} min");
        assert!((local_hours(&day, sun.solar_noon) - 12.0).abs() < 0.2);
    }

    #[test]
    fn midnight_sun_and_polar_night() {
        let june = day(2024, 6, 21, 2);
        let sun = SunTimes::for_day(69.65, 18.96, &june).unwrap();
        assert_eq!(sun.horizon, Crossing::AllDay);
        assert_eq!(sun.twilight, Crossing::AllDay);

        let december = day(2024, 12, 21, 1);
        let sun = SunTimes::for_day(69.65, 18.96, &december).unwrap();
        assert_eq!(sun.horizon, Crossing::AllNight);
        assert!(matches!(sun.twilight, Crossing::Regular { .. }));

        let sun = SunTimes::for_day(89.5, 0.0, &day(2024, 12, 21, 0)).unwrap();
        assert_eq!(sun.twilight, Crossing::AllNight);
    }

    #[test]
    fn rejects_invalid_location() {
        let day = day(2024, 6, 20, 0);
        assert!(matches!(
            SunTimes::for_day(95.0, 0.0, &day),
            Err(AstronomyError::InvalidLocation { .. })
        ));
        assert!(SunTimes::for_day(f64::NAN, 0.0, &day).is_err());
        assert!(SunTimes::for_day(10.0, 200.0, &day).is_err());
    }
}
