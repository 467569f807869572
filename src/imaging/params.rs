//! Parameter types for placeholder rendering.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the [`ImageManager`](super::ImageManager) (which decides what
//! images a profile needs) and the [`backend`](super::backend) (which does
//! the pixel work and encoding), so tests can swap in a recording mock.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// An RGB color.
pub type Rgb = [u8; 3];

/// Everything needed to render one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderParams {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub foreground: Rgb,
    /// Centered text.
    pub label: String,
    /// Bottom-left text, drawn only when it fits below the label.
    pub caption: String,
    /// Cap height of the text in pixels.
    pub font_size: u32,
    pub quality: Quality,
}

/// Text size used for every placeholder.
pub const FONT_SIZE: u32 = 24;

/// Gap between the caption and the image edges.
pub const CAPTION_PADDING: u32 = 10;
