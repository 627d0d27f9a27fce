//! Coordinate mapping from progress and tide height to pixels.

/// A rectangular pixel region used as the domain of a mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartGeometry {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

impl ChartGeometry {
    pub const fn new(origin_x: i32, origin_y: i32, width: i32, height: i32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// Bottom edge, where a zero-scaled value lands.
    pub fn bottom(&self) -> i32 {
        self.origin_y + self.height
    }
}

/// Map a progress value (0.0-1.0) to an x coordinate.
///
/// `x_of(0.0) == origin_x` and `x_of(1.0) == origin_x + width`.
pub fn x_of(progress: f64, geometry: &ChartGeometry) -> i32 {
    geometry.origin_x + (progress * f64::from(geometry.width)).round() as i32
}

/// Map `value` in `[domain_min, domain_max]` to a y coordinate, larger values higher up.
///
/// Returns `None` when the domain is empty, inverted or not finite.
pub fn y_of(value: f64, domain_min: f64, domain_max: f64, geometry: &ChartGeometry) -> Option<i32> {
    let range = domain_max - domain_min;
    if !(range.is_finite() && range > 0.0) {
        return None;
    }
    let normalized = (value - domain_min) / range;
    Some(geometry.bottom() - (normalized * f64::from(geometry.height)).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: ChartGeometry = ChartGeometry::new(10, 50, 600, 224);

    #[test]
    fn x_of_hits_both_edges() {
        assert_eq!(x_of(0.0, &CHART), 10);
        assert_eq!(x_of(1.0, &CHART), 610);
        assert_eq!(x_of(0.5, &CHART), 310);
    }

    #[test]
    fn x_of_is_monotonic() {
        let mut previous = x_of(0.0, &CHART);
        for step in 1..=1000 {
            let x = x_of(step as f64 / 1000.0, &CHART);
            assert!(x >= previous, "x went backwards at step {step}");
            previous = x;
        }
    }

    #[test]
    fn y_of_maps_domain_to_chart_height() {
        assert_eq!(y_of(0.0, 0.0, 4.0, &CHART), Some(274));
        assert_eq!(y_of(4.0, 0.0, 4.0, &CHART), Some(50));
        assert_eq!(y_of(2.0, 0.0, 4.0, &CHART), Some(162));
    }

    #[test]
    fn y_of_rejects_degenerate_domain() {
        assert_eq!(y_of(1.0, 1.0, 1.0, &CHART), None);
        assert_eq!(y_of(1.0, 2.0, 1.0, &CHART), None);
        assert_eq!(y_of(1.0, f64::NAN, 1.0, &CHART), None);
    }
}
