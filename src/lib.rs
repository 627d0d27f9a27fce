//! # Tide Almanac Core Library
//!
//! This library renders a single day's tide chart for a low-refresh palette display,
//! annotated with the lighting of that day (night, twilight, golden hour, daylight) and
//! a lunar phase disc.
//!
//! ## Design Philosophy
//!
//! ### Progress as the horizontal currency
//! Every horizontal position on the chart is derived from a *progress* value, the
//! fraction of the local calendar day elapsed (0.0 = local midnight, 1.0 = the next
//! local midnight). Time math ends at [`local_time::LocalDay::progress_of`]; pixel math
//! starts at [`geometry::x_of`]. Nothing else converts between the two.
//!
//! ### Draw less, never draw wrong
//! Missing tide data, too few samples or an unattainable sun position skip the affected
//! section of the chart. The canvas is always left in a valid state and the caller gets a
//! [`render::RenderReport`] describing what was drawn.
//!
//! ### Data Flow
//! 1. **Fetch**: NOAA predictions for the local day ([`tide_data`])
//! 2. **Segment**: sun events → ordered progress boundaries ([`sun`], [`daylight`])
//! 3. **Paint**: backdrop bands, hour labels and tide bars ([`tide_chart`])
//! 4. **Compose**: moon disc on top ([`moon`], [`lunar`])
//!
//! ## Core Types
//! - [`TideSample`]: one predicted water level at an instant

use chrono::{DateTime, Utc};

pub mod canvas;
pub mod config;
pub mod daylight;
pub mod geometry;
pub mod local_time;
pub mod lunar;
pub mod moon;
pub mod render;
pub mod sun;
pub mod tide_chart;
pub mod tide_data;

/// A single predicted tide height at a specific instant.
///
/// Series of samples are kept ascending by timestamp with no duplicate timestamps.
/// The renderer also assumes regular spacing, but only uses it for styling.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_almanac::TideSample;
///
/// let sample = TideSample {
///     timestamp: Utc.with_ymd_and_hms(2024, 6, 20, 4, 0, 0).unwrap(),
///     height: 3.2,
/// };
/// assert_eq!(sample.height, 3.2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TideSample {
    /// Instant of the prediction
    pub timestamp: DateTime<Utc>,
    /// Height above chart datum (MLLW) in feet
    pub height: f64,
}
