//! Software framebuffer the viewer composites into.
//!
//! Pixels are `0x00RRGGBB` words, row-major, matching what the presentation
//! surface expects. All drawing clips to the canvas bounds.

use image::RgbImage;

use crate::convert::pack_0rgb;
use crate::font;
use crate::layout::Quadrant;

/// Opaque black.
pub const BLACK: u32 = 0x0000_0000;
/// Opaque white.
pub const WHITE: u32 = 0x00FF_FFFF;
/// Opaque red.
pub const RED: u32 = 0x00FF_0000;

/// Row-major `0RGB` pixel buffer.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    /// A black canvas of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BLACK; width as usize * height as usize],
        }
    }

    /// Canvas width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Reallocate for a new size. Contents are reset to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![BLACK; width as usize * height as usize];
    }

    /// Pixel at (`x`, `y`), `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.offset(x, y).and_then(|i| self.pixels.get(i).copied())
    }

    /// Fill the whole canvas with `color`.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Copy `image` with its top-left corner at (`x`, `y`).
    pub fn blit(&mut self, image: &RgbImage, x: u32, y: u32) {
        let visible_width = image.width().min(self.width.saturating_sub(x));
        for (row_idx, row) in image.rows().enumerate() {
            let Ok(row_idx) = u32::try_from(row_idx) else {
                break;
            };
            let Some(start) = self.offset(x, y + row_idx) else {
                break;
            };
            let Some(dst) = self.pixels.get_mut(start..start + visible_width as usize) else {
                break;
            };
            for (dst, src) in dst.iter_mut().zip(row) {
                *dst = pack_0rgb(*src);
            }
        }
    }

    /// Fill a rectangle with `color`.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end {
            return;
        }
        for row in y..y_end {
            let Some(start) = self.offset(x, row) else {
                break;
            };
            if let Some(span) = self.pixels.get_mut(start..start + (x_end - x) as usize) {
                span.fill(color);
            }
        }
    }

    /// Draw a border of `thickness` pixels inside the quadrant's bounds.
    pub fn stroke_rect(&mut self, rect: Quadrant, thickness: u32, color: u32) {
        let Quadrant {
            x,
            y,
            width,
            height,
        } = rect;
        let t_x = thickness.min(width);
        let t_y = thickness.min(height);
        self.fill_rect(x, y, width, t_y, color);
        self.fill_rect(x, (y + height).saturating_sub(t_y), width, t_y, color);
        self.fill_rect(x, y, t_x, height, color);
        self.fill_rect((x + width).saturating_sub(t_x), y, t_x, height, color);
    }

    /// Draw `text` with the bitmap font, each font pixel `scale` wide.
    pub fn draw_text(&mut self, text: &str, x: u32, y: u32, scale: u32, color: u32) {
        let mut pen_x = x;
        for c in text.chars() {
            let glyph = font::glyph(c);
            for row in 0..font::GLYPH_HEIGHT {
                for col in 0..font::GLYPH_WIDTH {
                    if font::is_set(&glyph, col, row) {
                        self.fill_rect(pen_x + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            pen_x = pen_x.saturating_add(font::ADVANCE * scale);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}
