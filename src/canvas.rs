//! # Palette Canvas
//!
//! An in-memory frame for a six-color e-paper panel. Every pixel holds one
//! [`PaletteColor`]; there is no blending. The canvas implements embedded-graphics'
//! [`DrawTarget`], so primitives and mono fonts draw onto it directly, and adds the two
//! operations embedded-graphics lacks: filled polygons and masked pastes of a sub-canvas.
//!
//! The finished frame can be exported as a PNG (for preview or for a display driver that
//! accepts images) or as an ASCII sketch for the terminal.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::PixelColor,
    prelude::*,
    primitives::{ContainsPoint, Ellipse, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use std::path::Path;

/// The colors the target panel can show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    #[default]
    White,
    Black,
    Red,
    Yellow,
    Orange,
    Blue,
}

impl PixelColor for PaletteColor {
    type Raw = ();
}

impl PaletteColor {
    /// Approximate sRGB value of the pigment, for previews.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            PaletteColor::White => [255, 255, 255],
            PaletteColor::Black => [0, 0, 0],
            PaletteColor::Red => [200, 40, 40],
            PaletteColor::Yellow => [240, 220, 40],
            PaletteColor::Orange => [235, 130, 30],
            PaletteColor::Blue => [40, 60, 170],
        }
    }

    /// Character used by the terminal preview.
    pub fn ascii(self) -> char {
        match self {
            PaletteColor::White => ' ',
            PaletteColor::Black => '#',
            PaletteColor::Red => 'r',
            PaletteColor::Yellow => ':',
            PaletteColor::Orange => '+',
            PaletteColor::Blue => '~',
        }
    }
}

/// A per-pixel on/off mask, same addressing as [`Canvas`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Mask covering the ellipse inscribed in a `size` box at the origin.
    pub fn ellipse(size: Size) -> Self {
        let shape = Ellipse::new(Point::zero(), size);
        let mut bits = Vec::with_capacity((size.width * size.height) as usize);
        for y in 0..size.height as i32 {
            for x in 0..size.width as i32 {
                bits.push(shape.contains(Point::new(x, y)));
            }
        }
        Self {
            width: size.width,
            height: size.height,
            bits,
        }
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }
}

/// Frame buffer addressed by `(x, y)` with the origin at the top left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<PaletteColor>,
}

impl Canvas {
    /// A white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![PaletteColor::White; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self, color: PaletteColor) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<PaletteColor> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set one pixel; coordinates off the canvas are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: PaletteColor) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Number of pixels currently holding `color`.
    pub fn count(&self, color: PaletteColor) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }

    /// Fill the rectangle between two corners, both inclusive.
    pub fn fill_rect(&mut self, corner_a: Point, corner_b: Point, color: PaletteColor) {
        Rectangle::with_corners(corner_a, corner_b)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(self)
            .ok();
    }

    pub fn line(&mut self, from: Point, to: Point, color: PaletteColor, width: u32) {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color, width))
            .draw(self)
            .ok();
    }

    /// Fill the ellipse inscribed in the box at `top_left`, optionally with a 1 px outline.
    pub fn fill_ellipse(
        &mut self,
        top_left: Point,
        size: Size,
        fill: PaletteColor,
        outline: Option<PaletteColor>,
    ) {
        let mut style = PrimitiveStyleBuilder::new().fill_color(fill);
        if let Some(outline) = outline {
            style = style.stroke_color(outline).stroke_width(1);
        }
        Ellipse::new(top_left, size)
            .into_styled(style.build())
            .draw(self)
            .ok();
    }

    /// Fill a closed polygon (even-odd rule), boundary included.
    ///
    /// Fewer than three points draws nothing.
    pub fn fill_polygon(&mut self, points: &[Point], color: PaletteColor) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
        let max_y = points
            .iter()
            .map(|p| p.y)
            .max()
            .unwrap_or(0)
            .min(self.height as i32 - 1);

        let mut crossings = Vec::with_capacity(points.len());
        for y in min_y..=max_y {
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if a.y == b.y {
                    continue;
                }
                let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
                // Half-open so a shared vertex is counted once
                if y >= lo && y < hi {
                    let t = f64::from(y - a.y) / f64::from(b.y - a.y);
                    crossings.push(f64::from(a.x) + t * f64::from(b.x - a.x));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = span[0].ceil() as i32;
                let end = span[1].floor() as i32;
                for x in start..=end {
                    self.set_pixel(x, y, color);
                }
            }
        }

        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.line(*a, b, color, 1);
        }
    }

    /// Draw `text` centered horizontally and vertically on `anchor`.
    pub fn text(&mut self, text: &str, anchor: Point, font: &MonoFont<'_>, color: PaletteColor) {
        let character_style = MonoTextStyle::new(font, color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(text, anchor, character_style, text_style)
            .draw(self)
            .ok();
    }

    /// Copy the pixels of `source` selected by `mask` to `top_left` on this canvas.
    ///
    /// Pixels outside the mask, or falling off this canvas, are left untouched.
    pub fn paste_masked(&mut self, source: &Canvas, top_left: Point, mask: &Mask) {
        for y in 0..source.height {
            for x in 0..source.width {
                if !mask.is_set(x, y) {
                    continue;
                }
                let color = source.pixels[(y * source.width + x) as usize];
                self.set_pixel(top_left.x + x as i32, top_left.y + y as i32, color);
            }
        }
    }

    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(self.pixels[(y * self.width + x) as usize].rgb())
        })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.to_rgb_image()
            .save_with_format(path, image::ImageFormat::Png)
    }

    /// Downsampled terminal sketch, `columns` characters wide.
    ///
    /// Each character covers a block twice as tall as it is wide, roughly matching
    /// terminal cell proportions.
    pub fn to_ascii(&self, columns: u32) -> String {
        let step_x = self.width.div_ceil(columns.max(1)).max(1);
        let step_y = step_x * 2;
        let mut out = String::new();
        for y in (0..self.height).step_by(step_y as usize) {
            for x in (0..self.width).step_by(step_x as usize) {
                out.push(self.pixels[(y * self.width + x) as usize].ascii());
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = PaletteColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }
}
