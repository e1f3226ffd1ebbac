//! Outlined text drawing.

use ab_glyph::{Font, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

use super::MemeFont;
use super::sizing::line_width;

/// Offsets of the outline copies around the anchor.
const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Fill and outline colours for meme text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutlineStyle {
    /// Colour of the text itself
    pub fill: Rgb<u8>,
    /// Colour of the 1px halo around it
    pub outline: Rgb<u8>,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            fill: Rgb([255, 255, 255]),
            outline: Rgb([0, 0, 0]),
        }
    }
}

/// Draws `text` centred on `center_x` with its baseline on `baseline_y`.
///
/// The text goes down eight times in the outline colour, shifted one pixel in
/// every direction, then once in the fill colour on the anchor. Anything
/// falling outside the canvas is clipped.
pub fn draw_outlined(
    canvas: &mut RgbImage,
    text: &str,
    center_x: i32,
    baseline_y: i32,
    font: &MemeFont,
    size: u32,
    style: &OutlineStyle,
) {
    if text.is_empty() {
        return;
    }
    let scale = font.px_scale(size);
    let ascent = font.inner().as_scaled(scale).ascent();
    let width = line_width(font, size, text);

    let x = (center_x as f32 - width / 2.0).round() as i32;
    let y = (baseline_y as f32 - ascent).round() as i32;

    for (dx, dy) in OUTLINE_OFFSETS {
        draw_text_mut(canvas, style.outline, x + dx, y + dy, scale, font.inner(), text);
    }
    draw_text_mut(canvas, style.fill, x, y, scale, font.inner(), text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meme::test_font;

    const GREY: Rgb<u8> = Rgb([128, 128, 128]);

    fn changed_rows(canvas: &RgbImage) -> Vec<u32> {
        (0..canvas.height())
            .filter(|y| (0..canvas.width()).any(|x| *canvas.get_pixel(x, *y) != GREY))
            .collect()
    }

    #[test]
    fn text_sits_on_the_baseline() {
        let font = test_font();
        let mut canvas = RgbImage::from_pixel(200, 100, GREY);
        draw_outlined(&mut canvas, "HEH", 100, 60, &font, 30, &OutlineStyle::default());

        let rows = changed_rows(&canvas);
        let first = rows.first().copied().expect("something was drawn");
        let last = rows.last().copied().expect("something was drawn");
        // capitals rise above the baseline and stop just under it
        assert!(last <= 62, "last changed row {last}");
        assert!(first < 45, "first changed row {first}");
        assert!(first > 30, "first changed row {first}");
    }

    #[test]
    fn text_is_centred_horizontally() {
        let font = test_font();
        let mut canvas = RgbImage::from_pixel(200, 100, GREY);
        draw_outlined(&mut canvas, "MOM", 100, 60, &font, 30, &OutlineStyle::default());

        let columns: Vec<u32> = (0..canvas.width())
            .filter(|x| (0..canvas.height()).any(|y| *canvas.get_pixel(*x, y) != GREY))
            .collect();
        let left = columns.first().copied().expect("something was drawn");
        let right = columns.last().copied().expect("something was drawn");
        let middle = (left + right) / 2;
        assert!((96..=104).contains(&middle), "centre at {middle}");
    }

    #[test]
    fn uses_both_fill_and_outline_colours() {
        let font = test_font();
        let mut canvas = RgbImage::from_pixel(200, 100, GREY);
        draw_outlined(&mut canvas, "HI", 100, 60, &font, 40, &OutlineStyle::default());

        assert!(canvas.pixels().any(|p| p.0.iter().all(|c| *c > 215)));
        assert!(canvas.pixels().any(|p| p.0.iter().all(|c| *c < 40)));
    }

    #[test]
    fn empty_text_draws_nothing() {
        let font = test_font();
        let mut canvas = RgbImage::from_pixel(50, 50, GREY);
        draw_outlined(&mut canvas, "", 25, 25, &font, 30, &OutlineStyle::default());
        assert!(changed_rows(&canvas).is_empty());
    }

    #[test]
    fn text_off_the_canvas_is_clipped() {
        let font = test_font();
        let mut canvas = RgbImage::from_pixel(50, 50, GREY);
        draw_outlined(&mut canvas, "WIDE TEXT", 25, 5, &font, 80, &OutlineStyle::default());
        assert_eq!(canvas.dimensions(), (50, 50));
    }
}
