//! Square RGBA drawing surface addressed in a fixed 512×512 logical space.
//!
//! All rectangle coordinates are given in logical units and scaled by
//! `size / 512` with floor, so one drawing script produces consistent artwork
//! at every output resolution. Writes outside the canvas are clipped
//! silently.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::png::{self, buffer_len};
use crate::LOGICAL_SIZE;

/// Opaque RGB color. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Light/dark pair used for a raised bevel border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BevelColors {
    pub light: Color,
    pub dark: Color,
}

impl BevelColors {
    /// White highlight, mid-gray shadow.
    pub const CLASSIC: BevelColors = BevelColors {
        light: Color::WHITE,
        dark: Color::rgb(128, 128, 128),
    };
}

impl Default for BevelColors {
    fn default() -> Self {
        BevelColors::CLASSIC
    }
}

/// In-memory RGBA bitmap, `size × size`, initially fully transparent.
#[derive(Debug, Clone)]
pub struct Canvas {
    size: u32,
    scale: f64,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Allocate a transparent canvas.
    ///
    /// Fails with [`Error::InvalidSize`] for 0, for edges above PNG's
    /// `2^31 - 1` limit, and when the buffer cannot be allocated.
    pub fn new(size: u32) -> Result<Self> {
        let n = buffer_len(size, size).ok_or(Error::InvalidSize(size))?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(n).map_err(|_| Error::InvalidSize(size))?;
        pixels.resize(n, 0);
        Ok(Canvas {
            size,
            scale: size as f64 / LOGICAL_SIZE as f64,
            pixels,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Output pixels per logical unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Row-major RGBA bytes, `size * size * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA at (x, y), or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let i = (y as usize * self.size as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Map a logical coordinate to a device pixel coordinate (floor).
    pub fn to_device(&self, v: i32) -> i64 {
        (v as f64 * self.scale).floor() as i64
    }

    /// Write one device pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color, alpha: u8) {
        let size = self.size as i64;
        if x < 0 || y < 0 || x >= size || y >= size {
            return;
        }
        let i = (y as usize * self.size as usize + x as usize) * 4;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
        self.pixels[i + 3] = alpha;
    }

    /// Fill the half-open logical rectangle `[x1,x2) × [y1,y2)` with an
    /// opaque color.
    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        let (px1, py1) = (self.to_device(x1), self.to_device(y1));
        let (px2, py2) = (self.to_device(x2), self.to_device(y2));
        self.fill_device(px1, py1, px2, py2, color);
    }

    /// Draw a raised two-tone border inside the logical rectangle.
    ///
    /// `thickness` is in logical units and never scales below one pixel.
    /// Each ring `i` is inset by `i` pixels: light along the top row and left
    /// column, then dark along the bottom row and right column.
    pub fn draw_beveled_rect(
        &mut self,
        x1: i32, y1: i32, x2: i32, y2: i32,
        thickness: i32,
        colors: BevelColors,
    ) {
        let (px1, py1) = (self.to_device(x1), self.to_device(y1));
        let (px2, py2) = (self.to_device(x2), self.to_device(y2));
        let t = self.bevel_width(thickness);

        for i in 0..t {
            let (left, top) = (px1 + i, py1 + i);
            let (right, bottom) = (px2 - i, py2 - i);
            if left >= right || top >= bottom { break; }

            self.fill_device(left, top, right, top + 1, colors.light);
            self.fill_device(left, top, left + 1, bottom, colors.light);
            self.fill_device(left, bottom - 1, right, bottom, colors.dark);
            self.fill_device(right - 1, top, right, bottom, colors.dark);
        }
    }

    /// Bevel thickness in device pixels (at least 1).
    pub fn bevel_width(&self, thickness: i32) -> i64 {
        self.to_device(thickness).max(1)
    }

    /// Encode the current contents as a PNG with the default compressor.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        png::encode_png(self.size, self.size, &self.pixels)
    }

    fn fill_device(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, color: Color) {
        // Clamp first so huge logical rectangles stay cheap
        let size = self.size as i64;
        let (x1, x2) = (x1.max(0), x2.min(size));
        let (y1, y2) = (y1.max(0), y2.min(size));
        for y in y1..y2 {
            for x in x1..x2 {
                self.set_pixel(x, y, color, 255);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = Canvas::new(16).unwrap();
        assert_eq!(canvas.pixels().len(), 16 * 16 * 4);
        assert!(canvas.pixels().iter().all(|&b| b == 0));
        assert_eq!(canvas.scale(), 16.0 / 512.0);
    }

    #[test]
    fn test_new_rejects_unusable_sizes() {
        assert_eq!(Canvas::new(0).unwrap_err(), Error::InvalidSize(0));
        assert_eq!(Canvas::new(u32::MAX).unwrap_err(), Error::InvalidSize(u32::MAX));
        // Valid PNG edge, but the buffer can never be allocated
        let edge = i32::MAX as u32;
        assert_eq!(Canvas::new(edge).unwrap_err(), Error::InvalidSize(edge));
    }

    #[test]
    fn test_set_pixel_channels() {
        let mut canvas = Canvas::new(4).unwrap();
        canvas.set_pixel(2, 1, Color::rgb(1, 2, 3), 200);
        assert_eq!(canvas.pixel(2, 1), Some([1, 2, 3, 200]));
        let i = (1 * 4 + 2) * 4;
        assert_eq!(&canvas.pixels()[i..i + 4], &[1, 2, 3, 200]);
    }

    #[test]
    fn test_set_pixel_clips_out_of_bounds() {
        let mut canvas = Canvas::new(8).unwrap();
        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8), (8, 8), (i64::MIN, i64::MAX), (100, 3)] {
            canvas.set_pixel(x, y, RED, 255);
        }
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_rect_full_scale() {
        let mut canvas = Canvas::new(512).unwrap();
        canvas.fill_rect(10, 20, 12, 23, RED);
        assert_eq!(canvas.pixel(10, 20), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(11, 22), Some([255, 0, 0, 255]));
        // Half-open: right and bottom edges excluded
        assert_eq!(canvas.pixel(12, 20), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(10, 23), Some([0, 0, 0, 0]));
        let lit = canvas.pixels().chunks_exact(4).filter(|p| p[3] != 0).count();
        assert_eq!(lit, 2 * 3);
    }

    #[test]
    fn test_fill_rect_scales_with_floor() {
        let mut canvas = Canvas::new(16).unwrap();
        // 32..480 logical → 1..15 device
        canvas.fill_rect(32, 40, 480, 368, RED);
        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(14, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(15, 10), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 0, 0, 0]));
        // 368 * 16 / 512 = 11.5 → 11, exclusive
        assert_eq!(canvas.pixel(1, 10), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 11), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_rect_clips_partially_outside() {
        let mut canvas = Canvas::new(8).unwrap();
        canvas.fill_rect(-512, -512, 1024, 64, RED);
        // 64 logical → 1 device row
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(7, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_bevel_light_and_dark_edges() {
        let mut canvas = Canvas::new(512).unwrap();
        canvas.draw_beveled_rect(0, 0, 10, 10, 2, BevelColors::CLASSIC);
        let light = [255, 255, 255, 255];
        let dark = [128, 128, 128, 255];
        // Outer ring
        assert_eq!(canvas.pixel(0, 0), Some(light));
        assert_eq!(canvas.pixel(5, 0), Some(light));
        assert_eq!(canvas.pixel(0, 5), Some(light));
        assert_eq!(canvas.pixel(5, 9), Some(dark));
        assert_eq!(canvas.pixel(9, 5), Some(dark));
        // Dark wins on the top-right and bottom-left corners
        assert_eq!(canvas.pixel(9, 0), Some(dark));
        assert_eq!(canvas.pixel(0, 9), Some(dark));
        // Second ring inset by one
        assert_eq!(canvas.pixel(1, 1), Some(light));
        assert_eq!(canvas.pixel(8, 5), Some(dark));
        // Interior untouched
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(7, 7), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_bevel_minimum_thickness_at_16() {
        let mut canvas = Canvas::new(16).unwrap();
        assert_eq!(canvas.to_device(12), 0);
        assert_eq!(canvas.bevel_width(12), 1);

        canvas.draw_beveled_rect(32, 40, 480, 368, 12, BevelColors::CLASSIC);
        // Device rect is 1..15 × 1..11
        assert_eq!(canvas.pixel(5, 1), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(1, 5), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(5, 10), Some([128, 128, 128, 255]));
        assert_eq!(canvas.pixel(14, 5), Some([128, 128, 128, 255]));
        assert_eq!(canvas.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_bevel_thicker_than_rect_stops() {
        let mut canvas = Canvas::new(512).unwrap();
        canvas.draw_beveled_rect(0, 0, 3, 3, 50, BevelColors::CLASSIC);
        let lit = canvas.pixels().chunks_exact(4).filter(|p| p[3] != 0).count();
        assert_eq!(lit, 9);
        assert!(canvas.pixel(3, 0) == Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_color_serde_as_array() {
        let json = serde_json::to_string(&Color::rgb(0, 128, 255)).unwrap();
        assert_eq!(json, "[0,128,255]");
        let back: Color = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(back, Color::rgb(1, 2, 3));
    }
}
