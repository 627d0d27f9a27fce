//! Moon disc
//!
//! The disc is drawn on its own square sub-canvas: a white circle with a black rim, the
//! unlit part filled black, then composited onto the main canvas through a circular mask
//! so nothing outside the disc is touched.
//!
//! Unlit region for a phase `p` at row offset `dy` from the centre, with
//! `w = sqrt(r² - dy²)` and `k = cos(2πp)`:
//!
//! - waxing (`p < 0.5`): from the left edge to `r + k·w`
//! - waning (`p >= 0.5`): from `r - k·w` to the right edge
//!
//! New moon (`p` = 0 or 1) is entirely dark, full moon (`p` = 0.5) entirely lit.

use crate::canvas::{Canvas, Mask, PaletteColor};
use crate::lunar::MoonPhase;
use embedded_graphics::prelude::{Point, Size};
use std::f64::consts::TAU;
use tracing::debug;

const EPSILON: f64 = 1e-9;

/// Outline of the unlit part of a disc of `radius`, in the coordinates of its
/// `(2r+1)`-square bounding box (centre at `(r, r)`).
///
/// The terminator runs top to bottom, then the polygon closes along the dark edge of the
/// box. Empty when nothing is unlit.
pub fn terminator_polygon(phase: MoonPhase, radius: u32) -> Vec<Point> {
    let r = f64::from(radius);
    let side = 2 * radius as i32;
    let k = (phase.fraction() * TAU).cos();

    if k <= -1.0 + EPSILON {
        return Vec::new();
    }
    if k >= 1.0 - EPSILON {
        return vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ];
    }

    let (sign, edge_x) = if phase.is_waxing() {
        (1.0, 0)
    } else {
        (-1.0, side)
    };

    let mut points: Vec<Point> = (-(radius as i32)..=radius as i32)
        .map(|dy| {
            let dy = f64::from(dy);
            let w = (r * r - dy * dy).max(0.0).sqrt();
            Point::new((r + sign * k * w).round() as i32, (r + dy) as i32)
        })
        .collect();
    points.push(Point::new(edge_x, side));
    points.push(Point::new(edge_x, 0));
    points
}

/// Draw the moon for `phase` centred on `center`.
pub fn draw_moon(canvas: &mut Canvas, center: Point, radius: u32, phase: MoonPhase) {
    let size = Size::new(2 * radius + 1, 2 * radius + 1);
    let mut disc = Canvas::new(size.width, size.height);
    disc.fill_ellipse(
        Point::zero(),
        size,
        PaletteColor::White,
        Some(PaletteColor::Black),
    );

    let dark = terminator_polygon(phase, radius);
    disc.fill_polygon(&dark, PaletteColor::Black);

    let top_left = center - Point::new(radius as i32, radius as i32);
    canvas.paste_masked(&disc, top_left, &Mask::ellipse(size));
    debug!(phase = phase.fraction(), x = center.x, y = center.y, "moon drawn");
}
