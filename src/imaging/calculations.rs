//! Pure layout calculations for placeholder text.
//!
//! All functions here are pure and testable without any pixels. Text is set
//! in a 5×7 bitmap font scaled by an integer factor, with one empty column
//! between glyphs.

use super::font::{GLYPH_HEIGHT, GLYPH_WIDTH};

/// Integer scale factor giving roughly `font_size` pixels of cap height.
pub fn font_scale(font_size: u32) -> u32 {
    (font_size / GLYPH_HEIGHT).max(1)
}

/// Rendered `(width, height)` of `text` at `scale`. Empty text is `(0, 0)`.
///
/// ```
/// # use sum_seed::imaging::text_size;
/// // 3 glyphs × 6 columns × scale 3, minus the trailing gap
/// assert_eq!(text_size("ABC", 3), (51, 21));
/// ```
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let glyphs = text.chars().count() as u32;
    if glyphs == 0 {
        return (0, 0);
    }
    let advance = (GLYPH_WIDTH + 1) * scale;
    (glyphs * advance - scale, GLYPH_HEIGHT * scale)
}

/// Where to draw the label and (optionally) the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderLayout {
    /// Top-left corner of the label. May be negative when the label is
    /// wider than the image; drawing clips.
    pub label: (i64, i64),
    /// Top-left corner of the caption, if it fits.
    pub caption: Option<(i64, i64)>,
}

/// Center the label and place the caption at the bottom-left corner.
///
/// The caption is only placed when the space between the bottom of the
/// label and the padded bottom edge is at least the caption's height.
pub fn layout_placeholder(
    canvas: (u32, u32),
    label: (u32, u32),
    caption: (u32, u32),
    padding: u32,
) -> PlaceholderLayout {
    let (width, height) = (canvas.0 as i64, canvas.1 as i64);
    let (label_w, label_h) = (label.0 as i64, label.1 as i64);
    let caption_h = caption.1 as i64;
    let padding = padding as i64;

    let x = (width - label_w) / 2;
    let y = (height - label_h) / 2;

    let space_below = height - (y + label_h) - padding;
    let caption = (caption.0 > 0 && space_below >= caption_h)
        .then_some((padding, height - caption_h - padding));

    PlaceholderLayout {
        label: (x, y),
        caption,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_scale_from_size() {
        assert_eq!(font_scale(24), 3);
        assert_eq!(font_scale(7), 1);
        assert_eq!(font_scale(3), 1);
    }

    #[test]
    fn text_size_counts_chars_not_bytes() {
        assert_eq!(text_size("", 3), (0, 0));
        assert_eq!(text_size("A", 1), (5, 7));
        assert_eq!(text_size("é", 1), (5, 7));
    }

    #[test]
    fn hero_layout_places_caption() {
        let scale = font_scale(24);
        let label = text_size("Hero Kitchen", scale);
        let caption = text_size("1920x1080", scale);
        let layout = layout_placeholder((1920, 1080), label, caption, 10);

        assert_eq!(label, (213, 21));
        assert_eq!(layout.label, (853, 529));
        assert_eq!(layout.caption, Some((10, 1049)));
    }

    #[test]
    fn small_image_drops_caption() {
        let scale = font_scale(24);
        let layout =
            layout_placeholder((64, 64), text_size("S", scale), text_size("64x64", scale), 10);
        assert_eq!(layout.label, (24, 21));
        assert_eq!(layout.caption, None);
    }

    #[test]
    fn wide_label_is_centered_off_canvas() {
        let layout = layout_placeholder((100, 100), (300, 21), (0, 0), 10);
        assert_eq!(layout.label.0, -100);
        assert_eq!(layout.caption, None);
    }
}
