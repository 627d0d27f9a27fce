//! # Day Segmentation
//!
//! Turns the sun events of a local day into eight ordered progress boundaries and paints
//! the backdrop bands between them:
//!
//! | span                                   | color  |
//! |----------------------------------------|--------|
//! | `[0, dawn)`                            | blue   |
//! | `[dawn, sunrise)`                      | orange |
//! | `[sunrise, golden_end)`                | yellow |
//! | `[golden_end, evening_golden_start)`   | white  |
//! | `[evening_golden_start, sunset)`       | yellow |
//! | `[sunset, dusk)`                       | orange |
//! | `[dusk, 1)`                            | blue   |
//!
//! Boundaries are clamped to `[0, 1]` and forced non-decreasing, so the bands always tile
//! the chart from left to right without overlapping.
//!
//! ## Polar days
//! - Sun never sinks to the twilight depression: dawn = 0, dusk = 1.
//! - Sun never sets: the whole day is daylight (sunrise at 0, sunset at 1, golden hours
//!   collapsed onto the edges).
//! - Sun never rises: sunrise, sunset and both golden hours collapse onto solar noon;
//!   if twilight is never reached either, dawn and dusk collapse there too.

use crate::canvas::{Canvas, PaletteColor};
use crate::geometry::{x_of, ChartGeometry};
use crate::local_time::LocalDay;
use crate::sun::{AstronomyError, Crossing, SunTimes};
use chrono::Duration;
use embedded_graphics::prelude::Point;
use tracing::debug;

/// Length of each golden hour.
pub const GOLDEN_HOUR_MINUTES: i64 = 60;

/// Progress boundaries of one local day, non-decreasing in field order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DaySegments {
    pub dawn: f64,
    pub sunrise: f64,
    pub golden_start: f64,
    pub golden_end: f64,
    pub evening_golden_start: f64,
    pub evening_golden_end: f64,
    pub sunset: f64,
    pub dusk: f64,
}

/// One backdrop band in progress units, `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub start: f64,
    pub end: f64,
    pub color: PaletteColor,
}

impl DaySegments {
    /// Sun events for `day` at the given location, as progress boundaries.
    pub fn compute(latitude: f64, longitude: f64, day: &LocalDay) -> Result<Self, AstronomyError> {
        let sun = SunTimes::for_day(latitude, longitude, day)?;
        Ok(Self::from_sun_times(&sun, day))
    }

    pub fn from_sun_times(sun: &SunTimes, day: &LocalDay) -> Self {
        let golden = Duration::minutes(GOLDEN_HOUR_MINUTES);
        let noon = day.progress_of(sun.solar_noon);

        let [sunrise, golden_start, golden_end, evening_golden_start, evening_golden_end, sunset] =
            match sun.horizon {
                Crossing::Regular { rise, set } => [
                    day.progress_of(rise),
                    day.progress_of(rise),
                    day.progress_of(rise + golden),
                    day.progress_of(set - golden),
                    day.progress_of(set),
                    day.progress_of(set),
                ],
                Crossing::AllDay => [0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
                Crossing::AllNight => [noon; 6],
            };

        let (dawn, dusk) = match sun.twilight {
            Crossing::Regular { rise, set } => (day.progress_of(rise), day.progress_of(set)),
            Crossing::AllDay => (0.0, 1.0),
            Crossing::AllNight => (noon, noon),
        };

        let segments = Self::from_boundaries([
            dawn,
            sunrise,
            golden_start,
            golden_end,
            evening_golden_start,
            evening_golden_end,
            sunset,
            dusk,
        ]);
        debug!(?segments, "day segments");
        segments
    }

    /// Build from raw progress values in event order, clamping into `[0, 1]` and
    /// raising each boundary to at least the one before it.
    pub fn from_boundaries(raw: [f64; 8]) -> Self {
        let mut b = [0.0; 8];
        let mut floor = 0.0_f64;
        for (slot, value) in b.iter_mut().zip(raw) {
            let value = if value.is_nan() { floor } else { value };
            floor = value.clamp(0.0, 1.0).max(floor);
            *slot = floor;
        }
        Self {
            dawn: b[0],
            sunrise: b[1],
            golden_start: b[2],
            golden_end: b[3],
            evening_golden_start: b[4],
            evening_golden_end: b[5],
            sunset: b[6],
            dusk: b[7],
        }
    }

    /// Boundaries in event order.
    pub fn boundaries(&self) -> [f64; 8] {
        [
            self.dawn,
            self.sunrise,
            self.golden_start,
            self.golden_end,
            self.evening_golden_start,
            self.evening_golden_end,
            self.sunset,
            self.dusk,
        ]
    }

    /// At or before dawn, or at or after dusk.
    pub fn is_night(&self, progress: f64) -> bool {
        progress <= self.dawn || progress >= self.dusk
    }

    /// Between dawn and dusk, both inclusive.
    pub fn is_between_dawn_and_dusk(&self, progress: f64) -> bool {
        self.dawn <= progress && progress <= self.dusk
    }

    /// The seven backdrop bands, left to right.
    pub fn bands(&self) -> [Band; 7] {
        let band = |start, end, color| Band { start, end, color };
        [
            band(0.0, self.dawn, PaletteColor::Blue),
            band(self.dawn, self.sunrise, PaletteColor::Orange),
            band(self.sunrise, self.golden_end, PaletteColor::Yellow),
            band(self.golden_end, self.evening_golden_start, PaletteColor::White),
            band(self.evening_golden_start, self.sunset, PaletteColor::Yellow),
            band(self.sunset, self.dusk, PaletteColor::Orange),
            band(self.dusk, 1.0, PaletteColor::Blue),
        ]
    }
}

/// Paint the backdrop bands across `region`, left to right.
///
/// Each band covers pixel columns `[x_of(start), x_of(end))`; empty bands are skipped.
pub fn paint_bands(canvas: &mut Canvas, segments: &DaySegments, region: &ChartGeometry) {
    let top = region.origin_y;
    let bottom = region.bottom() - 1;
    for band in segments.bands() {
        let left = x_of(band.start, region);
        let right = x_of(band.end, region);
        if right <= left {
            continue;
        }
        canvas.fill_rect(Point::new(left, top), Point::new(right - 1, bottom), band.color);
    }
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

    fn assert_ordered(segments: &DaySegments) {
        let b = segments.boundaries();
        for value in b {
            assert!((0.0..=1.0).contains(&value), "{value} outside [0, 1]");
        }
        for pair in b.windows(2) {
            assert!(pair[0] <= pair[1], "boundaries out of order: {b:?}");
        }
    }

    #[test]
    fn boundaries_ordered_across_latitudes_and_seasons() {
        for latitude in (-89..=89).step_by(4) {
            for month in 1..=12 {
                let d = day(2024, month, 15, 0);
                let segments = DaySegments::compute(f64::from(latitude), 0.0, &d).unwrap();
                assert_ordered(&segments);
            }
        }
    }

    #[test]
    fn ordered_even_with_a_mismatched_offset() {
        // Honolulu longitude observed on a UTC+9 clock
        let segments = DaySegments::compute(21.3, -157.8, &day(2024, 6, 20, 9)).unwrap();
        assert_ordered(&segments);
    }

    #[test]
    fn portland_summer_golden_hours() {
        let d = day(2024, 6, 20, -4);
        let s = DaySegments::compute(43.6591, -70.2568, &d).unwrap();
        assert_eq!(s.golden_start, s.sunrise);
        assert!((s.golden_end - s.sunrise - 1.0 / 24.0).abs() < 1e-6);
        assert!((s.sunset - s.evening_golden_start - 1.0 / 24.0).abs() < 1e-6);
        assert_eq!(s.evening_golden_end, s.sunset);
        assert!(s.dawn < s.sunrise && s.sunset < s.dusk);
    }

    #[test]
    fn midnight_sun_is_all_daylight() {
        let s = DaySegments::compute(69.65, 18.96, &day(2024, 6, 21, 2)).unwrap();
        assert_eq!(s.dawn, 0.0);
        assert_eq!(s.dusk, 1.0);
        let white: Vec<_> = s
            .bands()
            .into_iter()
            .filter(|b| b.end > b.start)
            .collect();
        assert_eq!(white.len(), 1);
        assert_eq!(white[0].color, PaletteColor::White);
    }

    #[test]
    fn polar_night_collapses_onto_noon() {
        let s = DaySegments::compute(89.5, 0.0, &day(2024, 12, 21, 0)).unwrap();
        let b = s.boundaries();
        assert!(b.iter().all(|&v| (v - b[0]).abs() < 1e-12));
        assert!((s.dawn - 0.5).abs() < 0.02);
        assert!(s.is_night(0.25) && s.is_night(0.75));
    }

    #[test]
    fn from_boundaries_clamps_and_orders() {
        let s = DaySegments::from_boundaries([-0.1, 0.3, 0.2, 0.4, f64::NAN, 0.6, 0.9, 1.3]);
        assert_eq!(
            s.boundaries(),
            [0.0, 0.3, 0.3, 0.4, 0.4, 0.6, 0.9, 1.0]
        );
    }

    #[test]
    fn night_and_label_windows_include_edges() {
        let s = DaySegments::from_boundaries([0.2, 0.25, 0.25, 0.3, 0.7, 0.75, 0.75, 0.8]);
        assert!(s.is_night(0.2));
        assert!(s.is_night(0.8));
        assert!(!s.is_night(0.5));
        assert!(s.is_between_dawn_and_dusk(0.2));
        assert!(s.is_between_dawn_and_dusk(0.8));
        assert!(!s.is_between_dawn_and_dusk(0.81));
    }

    #[test]
    fn bands_tile_the_region_without_overlap() {
        let s = DaySegments::from_boundaries([0.2, 0.25, 0.25, 0.3, 0.7, 0.75, 0.75, 0.8]);
        let region = ChartGeometry::new(0, 0, 100, 10);
        let mut canvas = Canvas::new(100, 10);
        canvas.clear(PaletteColor::Red);
        paint_bands(&mut canvas, &s, &region);

        assert_eq!(canvas.count(PaletteColor::Red), 0);
        assert_eq!(canvas.pixel(0, 0), Some(PaletteColor::Blue));
        assert_eq!(canvas.pixel(19, 9), Some(PaletteColor::Blue));
        assert_eq!(canvas.pixel(20, 0), Some(PaletteColor::Orange));
        assert_eq!(canvas.pixel(25, 0), Some(PaletteColor::Yellow));
        assert_eq!(canvas.pixel(30, 0), Some(PaletteColor::White));
        assert_eq!(canvas.pixel(70, 0), Some(PaletteColor::Yellow));
        assert_eq!(canvas.pixel(75, 0), Some(PaletteColor::Orange));
        assert_eq!(canvas.pixel(80, 0), Some(PaletteColor::Blue));
        assert_eq!(canvas.pixel(99, 5), Some(PaletteColor::Blue));
        // 20 + 5 + 5 + 40 + 5 + 5 + 20 columns
        assert_eq!(canvas.count(PaletteColor::Blue), 40 * 10);
        assert_eq!(canvas.count(PaletteColor::White), 40 * 10);
    }
}
