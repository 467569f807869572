//! Pure Rust placeholder backend.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Canvas | `image::RgbImage::from_pixel` |
//! | Text | built-in 5×7 bitmap font, nearest-neighbour scaled |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, ImageBackend};
use super::calculations::{font_scale, layout_placeholder, text_size};
use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::params::{CAPTION_PADDING, PlaceholderParams};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

/// Backend using the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }

    /// Draw the placeholder without encoding it.
    pub fn draw(&self, params: &PlaceholderParams) -> Result<RgbImage, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::InvalidDimensions {
                width: params.width,
                height: params.height,
            });
        }
        let mut canvas = RgbImage::from_pixel(params.width, params.height, Rgb(params.background));

        let scale = font_scale(params.font_size);
        let layout = layout_placeholder(
            (params.width, params.height),
            text_size(&params.label, scale),
            text_size(&params.caption, scale),
            CAPTION_PADDING,
        );
        let color = Rgb(params.foreground);
        draw_text(&mut canvas, &params.label, layout.label, scale, color);
        if let Some(origin) = layout.caption {
            draw_text(&mut canvas, &params.caption, origin, scale, color);
        }
        Ok(canvas)
    }
}

impl ImageBackend for RustBackend {
    fn render_placeholder(&self, params: &PlaceholderParams) -> Result<Vec<u8>, BackendError> {
        let canvas = self.draw(params)?;
        let mut bytes = Vec::new();
        let quality = params.quality.value().min(100) as u8;
        JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&canvas)?;
        Ok(bytes)
    }
}

fn draw_text(canvas: &mut RgbImage, text: &str, origin: (i64, i64), scale: u32, color: Rgb<u8>) {
    let advance = ((GLYPH_WIDTH + 1) * scale) as i64;
    let mut x = origin.0;
    for ch in text.chars() {
        let glyph = font::glyph(ch);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if font::is_set(&glyph, col, row) {
                    let px = x + (col * scale) as i64;
                    let py = origin.1 + (row * scale) as i64;
                    fill_square(canvas, px, py, scale, color);
                }
            }
        }
        x += advance;
    }
}

/// Fill a `size`×`size` square, clipped to the canvas.
fn fill_square(canvas: &mut RgbImage, x: i64, y: i64, size: u32, color: Rgb<u8>) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    for py in y.max(0)..(y + size as i64).min(height) {
        for px in x.max(0)..(x + size as i64).min(width) {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}
