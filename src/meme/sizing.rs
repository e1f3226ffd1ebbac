//! Font sizing for a meme line.

use ab_glyph::{Font, ScaleFont};

use super::MemeFont;

/// Font size, in em pixels, so that `text` roughly spans `canvas_width`.
///
/// `ceil(canvas_width / chars * 1.5)`, never below 1. Empty text gets the
/// full canvas width.
pub fn size_for(canvas_width: u32, text: &str) -> u32 {
    let chars = text.chars().count();
    if chars == 0 {
        return canvas_width;
    }
    let size = (f64::from(canvas_width) / chars as f64 * 1.5).ceil();
    (size as u32).max(1)
}

/// Shrinks `size` until the laid-out line is no wider than `max_width`.
///
/// Uses the real glyph advances of `font`. Never grows the size.
pub fn fit_to_width(font: &MemeFont, size: u32, text: &str, max_width: u32) -> u32 {
    let width = line_width(font, size, text);
    if width <= max_width as f32 || width <= 0.0 {
        return size;
    }
    let mut scaled = ((size as f32 * max_width as f32 / width).floor() as u32).clamp(1, size);
    while scaled > 1 && line_width(font, scaled, text) > max_width as f32 {
        scaled -= 1;
    }
    scaled
}

/// Horizontal advance of `text` set at `size`, kerning included.
pub fn line_width(font: &MemeFont, size: u32, text: &str) -> f32 {
    let scaled = font.inner().as_scaled(font.px_scale(size));
    let mut width = 0.0f32;
    let mut prev = None;
    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev_id) = prev {
            width += scaled.kern(prev_id, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meme::test_font;

    #[test]
    fn short_text_gets_a_big_font() {
        assert_eq!(size_for(1000, "HI"), 750);
    }

    #[test]
    fn empty_text_falls_back_to_canvas_width() {
        assert_eq!(size_for(1000, ""), 1000);
        assert_eq!(size_for(0, ""), 0);
    }

    #[test]
    fn rounds_up_and_never_hits_zero() {
        assert_eq!(size_for(100, "abc"), 50);
        assert_eq!(size_for(10, "abcdefghijklmnopqrstuvwxyz"), 1);
        assert_eq!(size_for(0, "abc"), 1);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(size_for(800, "мем"), size_for(800, "abc"));
    }

    #[test]
    fn longer_text_never_gets_a_bigger_font() {
        let mut last = u32::MAX;
        for len in 1..60 {
            let size = size_for(800, &"x".repeat(len));
            assert!(size <= last);
            last = size;
        }
    }

    #[test]
    fn fitting_shrinks_overflowing_lines() {
        let font = test_font();
        let text = "WWWWWWWW";
        let size = size_for(400, text);
        assert!(line_width(&font, size, text) > 400.0);

        let fitted = fit_to_width(&font, size, text, 400);
        assert!(fitted < size);
        assert!(line_width(&font, fitted, text) <= 400.0);
    }

    #[test]
    fn fitting_leaves_narrow_lines_alone() {
        let font = test_font();
        let text = "iiii";
        assert_eq!(fit_to_width(&font, 20, text, 400), 20);
        assert_eq!(fit_to_width(&font, 20, "", 400), 20);
    }
}
