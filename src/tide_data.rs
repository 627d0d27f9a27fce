//! # NOAA Tide Predictions
//!
//! This module fetches tide predictions for one local calendar day from NOAA's CO-OPS
//! data API and turns them into [`TideSample`]s.
//!
//! ## Data Source
//!
//! ### NOAA Tides and Currents `datagetter`
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Product**: `predictions` against the MLLW datum, in feet
//! - **Window**: 48 hours from the UTC instant of local midnight, 15-minute interval
//! - **Format**: JSON, timestamps in GMT
//!
//! ```json
//! {"predictions": [{"t": "2024-06-20 04:00", "v": "3.215"}, ...]}
//! ```
//!
//! On a bad request the service answers 200 with `{"error": {"message": "..."}}`.
//!
//! ### Processing Pipeline
//! 1. **Fetch**: one HTTP GET, 30 s timeout
//! 2. **Parse**: GMT timestamps and decimal heights, sorted and de-duplicated
//! 3. **Filter**: keep `local midnight <= t < next local midnight`
//!
//! No caching and no retries: every render fetches fresh data, and a failed fetch simply
//! leaves the tide section off the chart.

use crate::local_time::LocalDay;
use crate::TideSample;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// NOAA CO-OPS data API endpoint.
pub const API_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

/// Hours requested from local midnight; twice a day so any offset is covered.
const RANGE_HOURS: u32 = 48;

/// Prediction interval in minutes.
const INTERVAL_MINUTES: u32 = 15;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching and decoding predictions.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error document
    #[error("NOAA API error: {0}")]
    Api(String),

    /// The payload did not have the expected shape
    #[error("unexpected payload: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Option<Vec<RawPrediction>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    t: String,
    v: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Query string for the predictions covering `day`.
pub fn query_params(station: &str, day: &LocalDay) -> Vec<(&'static str, String)> {
    let begin = day.midnight().format("%Y%m%d %H:%M").to_string();
    vec![
        ("begin_date", begin),
        ("range", RANGE_HOURS.to_string()),
        ("station", station.to_string()),
        ("product", "predictions".to_string()),
        ("datum", "MLLW".to_string()),
        ("time_zone", "gmt".to_string()),
        ("units", "english".to_string()),
        ("format", "json".to_string()),
        ("interval", INTERVAL_MINUTES.to_string()),
    ]
}

/// Decode a `datagetter` JSON body.
///
/// An empty `predictions` array is not an error; the renderer decides what to do with
/// too few samples.
pub fn parse_predictions(body: &str) -> Result<Vec<TideSample>, TideError> {
    let response: PredictionsResponse =
        serde_json::from_str(body).map_err(|e| TideError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(TideError::Api(error.message));
    }
    let raw = response
        .predictions
        .ok_or_else(|| TideError::Parse("missing predictions".to_string()))?;

    let mut samples = raw
        .iter()
        .map(|p| {
            let timestamp = NaiveDateTime::parse_from_str(p.t.trim(), "%Y-%m-%d %H:%M")
                .map_err(|e| TideError::Parse(format!("timestamp {:?}: {e}", p.t)))?
                .and_utc();
            let height: f64 = p
                .v
                .trim()
                .parse()
                .map_err(|_| TideError::Parse(format!("height {:?}", p.v)))?;
            if !height.is_finite() {
                return Err(TideError::Parse(format!("height {:?}", p.v)));
            }
            Ok(TideSample { timestamp, height })
        })
        .collect::<Result<Vec<_>, _>>()?;

    samples.sort_by_key(|s| s.timestamp);
    samples.dedup_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Keep the samples inside `day`.
pub fn filter_to_day(samples: Vec<TideSample>, day: &LocalDay) -> Vec<TideSample> {
    samples
        .into_iter()
        .filter(|s| day.contains(s.timestamp))
        .collect()
}

/// Fetch the predictions for `day` at `station`.
pub async fn fetch(station: &str, day: &LocalDay) -> Result<Vec<TideSample>, TideError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    info!(station, date = %day.date(), "fetching tide predictions");
    let body = client
        .get(API_URL)
        .query(&query_params(station, day))
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let samples = filter_to_day(parse_predictions(&body)?, day);
    debug!(count = samples.len(), "predictions in local day");
    Ok(samples)
}
