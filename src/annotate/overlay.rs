//! Overlay drawing for annotated QA images.
//!
//! Annotations are drawn on a transparent RGBA layer the size of the base
//! image and composited over it in one pass. Detection boxes may reach
//! past the image edge; drawing clips at the buffer boundary, the box
//! coordinates themselves stay untouched.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{RgbImage, Rgba, RgbaImage};

use crate::payload::Detection;

const BOX_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const STROKE_WIDTH: i64 = 2;
const LABEL_OFFSET: i64 = 2;
const GLYPH_SIZE: i64 = 8;

/// A transparent annotation layer.
pub struct Overlay {
    layer: RgbaImage,
}

impl Overlay {
    pub fn new(width: u32, height: u32) -> Self {
        // A zeroed buffer is fully transparent.
        Self {
            layer: RgbaImage::new(width, height),
        }
    }

    /// Draws one detection: hollow rectangle plus the label text just
    /// inside the box's top-left corner.
    pub fn draw_detection(&mut self, detection: &Detection) {
        self.stroke_rect(
            detection.x_min,
            detection.y_min,
            detection.x_max,
            detection.y_max,
        );
        self.draw_text(
            detection.x_min + LABEL_OFFSET,
            detection.y_min + LABEL_OFFSET,
            &detection.label,
        );
    }

    /// Flattens the overlay onto the base image and converts to RGB for
    /// encoding.
    pub fn composite_onto(self, base: &RgbaImage) -> RgbImage {
        let mut composed = base.clone();
        image::imageops::overlay(&mut composed, &self.layer, 0, 0);
        image::DynamicImage::ImageRgba8(composed).to_rgb8()
    }

    /// Stroke drawn inward from each edge.
    fn stroke_rect(&mut self, x_min: i64, y_min: i64, x_max: i64, y_max: i64) {
        for inset in 0..STROKE_WIDTH {
            self.hline(x_min, x_max, y_min + inset);
            self.hline(x_min, x_max, y_max - inset);
            self.vline(x_min + inset, y_min, y_max);
            self.vline(x_max - inset, y_min, y_max);
        }
    }

    fn hline(&mut self, x_start: i64, x_end: i64, y: i64) {
        let (width, height) = (self.layer.width() as i64, self.layer.height() as i64);
        if y < 0 || y >= height {
            return;
        }
        for x in x_start.max(0)..=x_end.min(width - 1) {
            self.layer.put_pixel(x as u32, y as u32, BOX_COLOR);
        }
    }

    fn vline(&mut self, x: i64, y_start: i64, y_end: i64) {
        let (width, height) = (self.layer.width() as i64, self.layer.height() as i64);
        if x < 0 || x >= width {
            return;
        }
        for y in y_start.max(0)..=y_end.min(height - 1) {
            self.layer.put_pixel(x as u32, y as u32, BOX_COLOR);
        }
    }

    fn draw_text(&mut self, x: i64, y: i64, text: &str) {
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(glyph) = BASIC_FONTS.get(ch) {
                self.draw_glyph(pen_x, y, &glyph);
            }
            pen_x += GLYPH_SIZE;
        }
    }

    fn draw_glyph(&mut self, x: i64, y: i64, glyph: &[u8; 8]) {
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) != 0 {
                    self.put(x + col, y + row as i64, TEXT_COLOR);
                }
            }
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.layer.width() && (y as u32) < self.layer.height() {
            self.layer.put_pixel(x as u32, y as u32, color);
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.layer.get_pixel(x, y)
    }
}
