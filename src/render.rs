//! # Chart Composition
//!
//! Puts one day onto a canvas in a fixed order: white background, backdrop bands, tide
//! chart with its labels, and finally the moon disc on top. A section that cannot be drawn
//! is skipped and recorded in the returned [`RenderReport`]; the rest of the chart still
//! renders.

use crate::canvas::{Canvas, PaletteColor};
use crate::config::{Config, ConfigError, TimeFormat};
use crate::daylight::{paint_bands, DaySegments};
use crate::geometry::ChartGeometry;
use crate::local_time::LocalDay;
use crate::lunar::MoonPhase;
use crate::moon::draw_moon;
use crate::sun::AstronomyError;
use crate::tide_chart::{ChartSummary, TideChartRenderer};
use crate::TideSample;
use embedded_graphics::prelude::Point;
use thiserror::Error;
use tracing::{info, warn};

/// Distance the chart is lifted above the canvas midline, leaving room for hour labels.
const CHART_LIFT: i32 = 32;

/// Why a section of the chart was left out.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("tide data unavailable: {0}")]
    DataUnavailable(String),

    #[error("need at least 2 tide samples, got {0}")]
    InsufficientSamples(usize),

    #[error("sun events undefined: {0}")]
    UndefinedAstronomy(#[from] AstronomyError),
}

/// Pixel placement of every section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Where the tide bars go.
    pub chart: ChartGeometry,
    /// Where the day bands go: the chart's columns, full canvas height.
    pub backdrop: ChartGeometry,
    pub moon_center: Point,
    pub moon_radius: u32,
}

impl Layout {
    /// Standard layout for a `width` x `height` canvas.
    pub fn for_canvas(width: u32, height: u32, moon_radius: u32, padding: i32) -> Self {
        let (width, height) = (width as i32, height as i32);
        let chart = ChartGeometry::new(0, height / 2 - CHART_LIFT, width, height / 2);
        let backdrop = ChartGeometry::new(chart.origin_x, 0, chart.width, height);
        let offset = padding + moon_radius as i32;
        Self {
            chart,
            backdrop,
            moon_center: Point::new(offset, offset),
            moon_radius,
        }
    }
}

/// Everything a render pass needs besides the data.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    pub day: LocalDay,
    pub latitude: f64,
    pub longitude: f64,
    pub time_format: TimeFormat,
    pub layout: Layout,
}

impl RenderContext {
    /// Context for the local calendar day `date` under `config`.
    pub fn from_config(config: &Config, date: chrono::NaiveDate) -> Result<Self, ConfigError> {
        let display = &config.display;
        Ok(Self {
            day: LocalDay::new(date, config.utc_offset()?),
            latitude: config.location.latitude,
            longitude: config.location.longitude,
            time_format: display.time_format,
            layout: Layout::for_canvas(
                display.width,
                display.height,
                display.moon_radius,
                display.padding,
            ),
        })
    }
}

/// Outcome of the tide section.
#[derive(Clone, Debug, PartialEq)]
pub enum TideSection {
    Drawn(ChartSummary),
    Skipped(RenderError),
}

/// What a render pass put on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    pub tide: TideSection,
    pub segments: Option<DaySegments>,
    pub moon_phase: MoonPhase,
}

impl RenderReport {
    pub fn tide_drawn(&self) -> bool {
        matches!(self.tide, TideSection::Drawn(_))
    }
}

/// Draw the whole chart for `ctx.day`.
///
/// `tides` is `Err` with a description when the predictions could not be obtained. Bands
/// and the tide chart are drawn together or not at all; the moon is always drawn.
pub fn render(
    canvas: &mut Canvas,
    ctx: &RenderContext,
    tides: Result<&[TideSample], String>,
    moon_phase: MoonPhase,
) -> RenderReport {
    canvas.clear(PaletteColor::White);

    let mut segments = None;
    let tide = match draw_day(canvas, ctx, tides, &mut segments) {
        Ok(summary) => {
            info!(
                samples = summary.samples,
                labelled = summary.labelled.len(),
                "tide section drawn"
            );
            TideSection::Drawn(summary)
        }
        Err(e) => {
            warn!(error = %e, "tide section skipped");
            TideSection::Skipped(e)
        }
    };

    let layout = &ctx.layout;
    draw_moon(canvas, layout.moon_center, layout.moon_radius, moon_phase);

    RenderReport {
        tide,
        segments,
        moon_phase,
    }
}

fn draw_day(
    canvas: &mut Canvas,
    ctx: &RenderContext,
    tides: Result<&[TideSample], String>,
    segments_out: &mut Option<DaySegments>,
) -> Result<ChartSummary, RenderError> {
    let samples = tides.map_err(RenderError::DataUnavailable)?;
    if samples.len() < 2 {
        return Err(RenderError::InsufficientSamples(samples.len()));
    }

    let segments = DaySegments::compute(ctx.latitude, ctx.longitude, &ctx.day)?;
    *segments_out = Some(segments);

    paint_bands(canvas, &segments, &ctx.layout.backdrop);
    TideChartRenderer::new(ctx.layout.chart, &ctx.day, &segments, ctx.time_format)
        .render(canvas, samples)
}
