//! Tide curve renderer
//!
//! Draws one local day of tide predictions as a row of vertical bars rising from the
//! bottom of the chart, with hour labels underneath and the height and time written
//! above each daylight high and low water.

use crate::canvas::{Canvas, PaletteColor};
use crate::config::TimeFormat;
use crate::daylight::DaySegments;
use crate::geometry::{x_of, y_of, ChartGeometry};
use crate::local_time::LocalDay;
use crate::render::RenderError;
use crate::TideSample;
use chrono::Timelike;
use embedded_graphics::mono_font::{ascii::FONT_9X15_BOLD, MonoFont};
use embedded_graphics::prelude::Point;
use tracing::debug;

/// Headroom below the lowest tide, in feet.
pub const DOMAIN_MARGIN_FT: f64 = 0.5;

/// Font for hour and extremum labels.
pub const LABEL_FONT: &MonoFont<'static> = &FONT_9X15_BOLD;

/// Distance of the hour labels below the chart.
pub const HOUR_LABEL_OFFSET: i32 = 16;

const HEIGHT_LABEL_RISE: i32 = 15;
const TIME_LABEL_RISE: i32 = 35;

/// Vertical scale of the chart in feet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightDomain {
    pub min: f64,
    pub max: f64,
}

impl HeightDomain {
    /// `[min - margin, max]` over the samples; `None` for an empty series.
    ///
    /// The margin keeps a flat series from collapsing to a zero range. Should the range
    /// still come out empty or non-finite it is widened to one foot.
    pub fn from_samples(samples: &[TideSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let (lo, hi) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.height), hi.max(s.height))
            });
        let min = lo - DOMAIN_MARGIN_FT;
        let range = hi - min;
        let max = if range.is_finite() && range > 0.0 {
            hi
        } else {
            min + 1.0
        };
        Some(Self { min, max })
    }

    pub fn y_of(&self, value: f64, chart: &ChartGeometry) -> i32 {
        y_of(value, self.min, self.max, chart).unwrap_or_else(|| chart.bottom())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtremumKind {
    Peak,
    Trough,
}

/// A sample strictly above or below both neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extremum {
    pub index: usize,
    pub kind: ExtremumKind,
}

/// Local peaks and troughs; the first and last samples never qualify.
pub fn find_extrema(samples: &[TideSample]) -> Vec<Extremum> {
    samples
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, here, next) = (w[0].height, w[1].height, w[2].height);
            let kind = if here > prev && here > next {
                ExtremumKind::Peak
            } else if here < prev && here < next {
                ExtremumKind::Trough
            } else {
                return None;
            };
            Some(Extremum { index: i + 1, kind })
        })
        .collect()
}

/// What the tide renderer put on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSummary {
    pub samples: usize,
    pub domain: HeightDomain,
    pub extrema: Vec<Extremum>,
    /// Indices of the extrema that got a label.
    pub labelled: Vec<usize>,
}

/// Renders the tide section of one day.
pub struct TideChartRenderer<'a> {
    chart: ChartGeometry,
    day: &'a LocalDay,
    segments: &'a DaySegments,
    time_format: TimeFormat,
}

impl<'a> TideChartRenderer<'a> {
    pub fn new(
        chart: ChartGeometry,
        day: &'a LocalDay,
        segments: &'a DaySegments,
        time_format: TimeFormat,
    ) -> Self {
        Self {
            chart,
            day,
            segments,
            time_format,
        }
    }

    /// Hour labels, then one bar per sample with labels on daylight extrema.
    pub fn render(
        &self,
        canvas: &mut Canvas,
        samples: &[TideSample],
    ) -> Result<ChartSummary, RenderError> {
        if samples.len() < 2 {
            return Err(RenderError::InsufficientSamples(samples.len()));
        }
        let domain = HeightDomain::from_samples(samples)
            .ok_or(RenderError::InsufficientSamples(samples.len()))?;
        debug!(min = domain.min, max = domain.max, "tide domain");

        self.draw_hour_labels(canvas);

        let extrema = find_extrema(samples);
        let mut labelled = Vec::new();
        let mut next_extremum = extrema.iter().peekable();
        let last = (samples.len() - 1) as f64;

        for (i, sample) in samples.iter().enumerate() {
            let x = x_of(i as f64 / last, &self.chart);
            let y = domain.y_of(sample.height, &self.chart);
            let progress = self.day.progress_of(sample.timestamp);
            self.draw_bar(canvas, sample, x, y, progress);

            if next_extremum.next_if(|e| e.index == i).is_some()
                && self.segments.is_between_dawn_and_dusk(progress)
            {
                self.draw_extremum_label(canvas, sample, x, y);
                labelled.push(i);
            }
        }

        debug!(
            samples = samples.len(),
            extrema = extrema.len(),
            labelled = labelled.len(),
            "tide chart drawn"
        );
        Ok(ChartSummary {
            samples: samples.len(),
            domain,
            extrema,
            labelled,
        })
    }

    fn draw_hour_labels(&self, canvas: &mut Canvas) {
        let label_y = self.chart.bottom() + HOUR_LABEL_OFFSET;
        for hour in 1..24 {
            let progress = f64::from(hour) / 24.0;
            let x = x_of(progress, &self.chart);
            canvas.text(
                &self.time_format.hour_label(hour),
                Point::new(x, label_y),
                LABEL_FONT,
                self.ink_at(progress),
            );
        }
    }

    /// Vertical bar from the chart bottom up to the sample, thicker on the hour.
    fn draw_bar(&self, canvas: &mut Canvas, sample: &TideSample, x: i32, y: i32, progress: f64) {
        let on_the_hour = self.day.to_local(sample.timestamp).minute() == 0;
        let width = if on_the_hour { 2 } else { 1 };
        canvas.line(
            Point::new(x, self.chart.bottom()),
            Point::new(x, y),
            self.ink_at(progress),
            width,
        );
    }

    fn draw_extremum_label(&self, canvas: &mut Canvas, sample: &TideSample, x: i32, y: i32) {
        let clock = self.time_format.clock(&self.day.to_local(sample.timestamp));
        canvas.text(
            &format!("{:.1}'", sample.height),
            Point::new(x, y - HEIGHT_LABEL_RISE),
            LABEL_FONT,
            PaletteColor::Black,
        );
        canvas.text(
            &clock,
            Point::new(x, y - TIME_LABEL_RISE),
            LABEL_FONT,
            PaletteColor::Black,
        );
    }

    /// White on the night backdrop, black everywhere else.
    fn ink_at(&self, progress: f64) -> PaletteColor {
        if self.segments.is_night(progress) {
            PaletteColor::White
        } else {
            PaletteColor::Black
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};

    fn utc_day() -> LocalDay {
        LocalDay::new(
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    /// Samples every `step` minutes from `start_hour` local.
    fn series(heights: &[f64], start_hour: u32, step: i64) -> Vec<TideSample> {
        let start = Utc.with_ymd_and_hms(2024, 6, 20, start_hour, 0, 0).unwrap();
        heights
            .iter()
            .enumerate()
            .map(|(i, &height)| TideSample {
                timestamp: start + Duration::minutes(step * i as i64),
                height,
            })
            .collect()
    }

    #[test]
    fn finds_peak_and_trough() {
        let samples = series(&[1.0, 2.0, 1.5, 0.5, 1.0], 0, 15);
        assert_eq!(
            find_extrema(&samples),
            vec![
                Extremum {
                    index: 1,
                    kind: ExtremumKind::Peak
                },
                Extremum {
                    index: 3,
                    kind: ExtremumKind::Trough
                },
            ]
        );
    }

    #[test]
    fn plateaus_are_not_extrema() {
        let samples = series(&[1.0, 2.0, 2.0, 1.0, 1.0, 0.5], 0, 15);
        assert!(find_extrema(&samples).is_empty());
        assert!(find_extrema(&samples[..2]).is_empty());
    }

    #[test]
    fn extrema_symmetric_under_reversal() {
        let heights = [3.1, 3.4, 3.2, 2.0, 2.5, 2.5, 4.0, 1.0, 1.2, 0.9, 5.0];
        let forward = series(&heights, 0, 15);
        let mut backward = forward.clone();
        backward.reverse();

        let stamps = |samples: &[TideSample]| {
            let mut found: Vec<_> = find_extrema(samples)
                .into_iter()
                .map(|e| (samples[e.index].timestamp, e.kind))
                .collect();
            found.sort_by_key(|(t, _)| *t);
            found
        };
        assert_eq!(stamps(&forward), stamps(&backward));
    }

    #[test]
    fn flat_series_gets_padded_domain() {
        let samples = series(&[2.0; 6], 0, 15);
        let domain = HeightDomain::from_samples(&samples).unwrap();
        assert_eq!(domain.min, 1.5);
        assert_eq!(domain.max, 2.0);

        let chart = ChartGeometry::new(0, 10, 100, 50);
        assert_eq!(domain.y_of(2.0, &chart), 10);
        assert_eq!(domain.y_of(1.5, &chart), 60);
    }

    #[test]
    fn non_finite_domain_widens_to_one_foot() {
        let samples = series(&[f64::INFINITY, 1.0], 0, 15);
        let domain = HeightDomain::from_samples(&samples).unwrap();
        assert_eq!(domain.min, 0.5);
        assert_eq!(domain.max, 1.5);
        assert!(HeightDomain::from_samples(&[]).is_none());
    }

    #[test]
    fn labels_only_daylight_extrema() {
        let day = utc_day();
        // Daylight 06:00-18:00
        let segments =
            DaySegments::from_boundaries([0.25, 0.3, 0.3, 0.35, 0.65, 0.7, 0.7, 0.75]);
        // Two-hourly samples from midnight: peak at 02:00 (night), trough at 10:00, peak 14:00
        let samples = series(&[1.0, 3.0, 2.0, 1.5, 1.0, 0.5, 1.0, 2.5, 2.0, 1.8, 1.6], 0, 120);
        let chart = ChartGeometry::new(0, 100, 400, 150);
        let mut canvas = Canvas::new(400, 300);

        let summary = TideChartRenderer::new(chart, &day, &segments, TimeFormat::TwentyFourHour)
            .render(&mut canvas, &samples)
            .unwrap();

        let indices: Vec<_> = summary.extrema.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 5, 7]);
        assert_eq!(summary.labelled, vec![5, 7]);
    }

    #[test]
    fn night_bars_are_white_and_day_bars_black() {
        let day = utc_day();
        let segments =
            DaySegments::from_boundaries([0.25, 0.3, 0.3, 0.35, 0.65, 0.7, 0.7, 0.75]);
        let samples = series(&[1.0, 2.0, 3.0], 0, 12 * 60);
        let chart = ChartGeometry::new(0, 0, 100, 50);
        let mut canvas = Canvas::new(101, 80);
        canvas.clear(PaletteColor::Blue);

        TideChartRenderer::new(chart, &day, &segments, TimeFormat::TwentyFourHour)
            .render(&mut canvas, &samples)
            .unwrap();

        // Midnight bar on the left edge, noon bar in the middle
        assert_eq!(canvas.pixel(0, 45), Some(PaletteColor::White));
        assert_eq!(canvas.pixel(50, 45), Some(PaletteColor::Black));
    }

    #[test]
    fn on_the_hour_bars_are_two_pixels_wide() {
        let day = utc_day();
        let segments =
            DaySegments::from_boundaries([0.25, 0.3, 0.3, 0.35, 0.65, 0.7, 0.7, 0.75]);
        let start = Utc.with_ymd_and_hms(2024, 6, 20, 11, 45, 0).unwrap();
        let samples: Vec<_> = (0..3)
            .map(|i| TideSample {
                timestamp: start + Duration::minutes(15 * i),
                height: 2.0,
            })
            .collect();
        let chart = ChartGeometry::new(0, 0, 100, 50);
        let mut canvas = Canvas::new(101, 80);

        TideChartRenderer::new(chart, &day, &segments, TimeFormat::TwentyFourHour)
            .render(&mut canvas, &samples)
            .unwrap();

        // 11:45 at x=0, 12:00 at x=50, 12:15 at x=100
        let black: Vec<i32> = (0..101)
            .filter(|&x| canvas.pixel(x, 45) == Some(PaletteColor::Black))
            .collect();
        assert_eq!(black, vec![0, 49, 50, 100]);
    }

    #[test]
    fn hour_labels_follow_the_night() {
        let day = utc_day();
        let segments =
            DaySegments::from_boundaries([0.25, 0.3, 0.3, 0.35, 0.65, 0.7, 0.7, 0.75]);
        let samples = series(&[1.0, 2.0], 0, 12 * 60);
        let chart = ChartGeometry::new(0, 0, 480, 50);
        let mut canvas = Canvas::new(481, 80);
        canvas.clear(PaletteColor::Blue);

        TideChartRenderer::new(chart, &day, &segments, TimeFormat::TwentyFourHour)
            .render(&mut canvas, &samples)
            .unwrap();

        let colors_around = |center_x: i32| {
            let label_y = chart.bottom() + HOUR_LABEL_OFFSET;
            let mut found = Vec::new();
            for y in label_y - 10..=label_y + 10 {
                for x in center_x - 10..=center_x + 10 {
                    found.extend(canvas.pixel(x, y));
                }
            }
            found
        };

        // 03:00 is before dawn, 12:00 is daylight
        let three = colors_around(60);
        assert!(three.contains(&PaletteColor::White));
        assert!(!three.contains(&PaletteColor::Black));

        let noon = colors_around(240);
        assert!(noon.contains(&PaletteColor::Black));
        assert!(!noon.contains(&PaletteColor::White));
    }

    #[test]
    fn too_few_samples() {
        let day = utc_day();
        let segments = DaySegments::from_boundaries([0.25; 8]);
        let mut canvas = Canvas::new(10, 10);
        let renderer = TideChartRenderer::new(
            ChartGeometry::new(0, 0, 10, 5),
            &day,
            &segments,
            TimeFormat::TwelveHour,
        );
        let one = series(&[1.0], 0, 15);
        assert!(matches!(
            renderer.render(&mut canvas, &one),
            Err(RenderError::InsufficientSamples(1))
        ));
        assert_eq!(canvas, Canvas::new(10, 10));
    }
}
