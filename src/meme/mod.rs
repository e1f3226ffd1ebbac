//! Caption layout: clean, split, size and draw meme text onto a photo.

pub mod clean;
pub mod overlay;
pub mod sizing;
pub mod split;

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale};
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::debug;

use crate::error::MemeError;

pub use clean::clean;
pub use overlay::{OutlineStyle, draw_outlined};
pub use sizing::{fit_to_width, size_for};
pub use split::{SplitPolicy, TextHalves, split};

/// The meme font, loaded once and shared by every request.
#[derive(Clone, Debug)]
pub struct MemeFont {
    font: FontArc,
    // ab_glyph scales by line height, memes are sized in em
    em_to_px: f32,
}

impl MemeFont {
    /// Loads a TTF/OTF font file.
    pub fn load(path: &Path) -> Result<Self, MemeError> {
        let bytes = std::fs::read(path)
            .map_err(|err| MemeError::Font(format!("{}: {}", path.display(), err)))?;
        Self::from_bytes(bytes)
    }

    /// Parses font data already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MemeError> {
        let font = FontArc::try_from_vec(bytes).map_err(|err| MemeError::Font(err.to_string()))?;
        let em_to_px = match font.units_per_em() {
            Some(units) if units > 0.0 => font.height_unscaled() / units,
            _ => 1.0,
        };
        Ok(Self { font, em_to_px })
    }

    /// Glyph scale for a size given in em pixels.
    pub fn px_scale(&self, size: u32) -> PxScale {
        PxScale::from(size as f32 * self.em_to_px)
    }

    pub(crate) fn inner(&self) -> &FontArc {
        &self.font
    }
}

/// Lays a caption out as top and bottom text on a photo.
#[derive(Clone, Debug)]
pub struct MemeComposer {
    font: MemeFont,
    policy: SplitPolicy,
    style: OutlineStyle,
}

impl MemeComposer {
    /// Composer with the default split policy and white-on-black text.
    pub fn new(font: MemeFont) -> Self {
        Self {
            font,
            policy: SplitPolicy::default(),
            style: OutlineStyle::default(),
        }
    }

    /// Swaps the caption split policy.
    pub fn with_policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Swaps the text colours.
    pub fn with_style(mut self, style: OutlineStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns a copy of `image` with the caption drawn on it.
    ///
    /// The upper line's baseline sits a tenth of the height from the top, the
    /// lower one a tenth from the bottom, both centred.
    pub fn compose_image(&self, image: &DynamicImage, caption: &str) -> Result<RgbImage, MemeError> {
        let cleaned = clean(caption);
        if cleaned.is_empty() {
            return Err(MemeError::EmptyCaption);
        }
        let halves = self.policy.split(&cleaned);
        debug!(upper = %halves.upper, lower = %halves.lower, "caption split");

        let mut canvas = image.to_rgb8();
        let (width, height) = canvas.dimensions();
        let center_x = (width / 2) as i32;
        let baselines = [height / 10, height - height / 10];

        for (line, baseline) in halves.lines().into_iter().zip(baselines) {
            if line.is_empty() {
                continue;
            }
            let size = fit_to_width(&self.font, size_for(width, line), line, width);
            debug!(line, size, baseline, "drawing caption line");
            draw_outlined(
                &mut canvas,
                line,
                center_x,
                baseline as i32,
                &self.font,
                size,
                &self.style,
            );
        }
        Ok(canvas)
    }

    /// Reads `input`, draws the caption and writes the meme to `output`.
    ///
    /// The input file is never modified. The output format follows the output
    /// file extension, and nothing is written if encoding fails.
    pub fn compose(&self, input: &Path, output: &Path, caption: &str) -> Result<(), MemeError> {
        if same_file(input, output) {
            return Err(MemeError::SamePath(output.display().to_string()));
        }
        let image = image::open(input)
            .map_err(|err| MemeError::UnreadableImage(format!("{}: {}", input.display(), err)))?;
        let canvas = self.compose_image(&image, caption)?;

        let format = ImageFormat::from_path(output)?;
        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(canvas).write_to(&mut encoded, format)?;
        std::fs::write(output, encoded.into_inner())?;
        debug!("wrote meme to {}", output.display());
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
pub(crate) fn test_font() -> MemeFont {
    let bytes = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/fonts/DejaVuSans-Bold.ttf"));
    MemeFont::from_bytes(bytes.to_vec()).expect("bundled font parses")
}
