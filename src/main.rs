//! # Tide Almanac Entry Point
//!
//! Fetches the day's tide predictions, renders the chart and writes it out: a PNG for
//! the display (production mode) or an ASCII sketch on stdout (development mode).

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tide_almanac::canvas::Canvas;
use tide_almanac::config::{Config, DEFAULT_CONFIG_PATH};
use tide_almanac::lunar::MoonPhase;
use tide_almanac::render::{render, RenderContext, TideSection};
use tide_almanac::tide_data;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Width of the ASCII preview in characters.
const PREVIEW_COLUMNS: u32 = 100;

#[derive(Parser, Debug)]
#[command(name = "tide-almanac")]
#[command(about = "Daily tide chart with daylight bands and moon phase")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Local date to render (YYYY-MM-DD). Defaults to today at the configured offset.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Where to write the PNG
    #[arg(long, default_value = "tide-chart.png")]
    output: PathBuf,

    /// Print an ASCII preview instead of writing a PNG
    #[arg(long)]
    stdout: bool,

    /// Debug logging (overridden by TIDE_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("TIDE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_from_path(&cli.config);
    config.validate().context("invalid configuration")?;

    let offset = config.utc_offset()?;
    let date = cli
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    let ctx = RenderContext::from_config(&config, date)?;
    info!(%date, station = %config.station.nickname, "rendering tide almanac");

    // Create Tokio runtime for the one async fetch
    let rt = tokio::runtime::Runtime::new()?;
    let tides = rt
        .block_on(tide_data::fetch(&config.station.id, &ctx.day))
        .map_err(|e| {
            // Keep going: the chart is still drawn without the tide section
            error!(error = %e, "tide data fetch failed");
            e.to_string()
        });

    let mut canvas = Canvas::new(config.display.width, config.display.height);
    let report = render(
        &mut canvas,
        &ctx,
        tides.as_deref().map_err(Clone::clone),
        MoonPhase::for_date(date),
    );

    match &report.tide {
        TideSection::Drawn(summary) => info!(
            samples = summary.samples,
            extrema = summary.extrema.len(),
            labelled = summary.labelled.len(),
            moon = report.moon_phase.fraction(),
            "chart complete"
        ),
        TideSection::Skipped(reason) => warn!(%reason, "chart drawn without tides"),
    }

    // Development mode: ASCII output for testing
    if cli.stdout {
        print!("{}", canvas.to_ascii(PREVIEW_COLUMNS));
        return Ok(());
    }

    canvas
        .save_png(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!(path = %cli.output.display(), "chart written");
    Ok(())
}
