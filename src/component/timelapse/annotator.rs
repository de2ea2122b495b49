use ab_glyph::{FontRef, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Bundled so annotation never depends on host font discovery.
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/DejaVuSans.ttf");

const MARGIN: u32 = 16;
const PLATE_PADDING: u32 = 8;
/// How far the plate darkens the pixels underneath the text.
const PLATE_OPACITY: f32 = 0.55;

/// Renders the capture timestamp near the bottom-right corner of an averaged
/// frame, over a darkened plate so the text stays legible whatever the image
/// content is.
pub struct Annotator {
    font: FontRef<'static>,
    scale: PxScale,
}

impl Annotator {
    pub fn new(font_scale: f32) -> Result<Self> {
        let font = FontRef::try_from_slice(FONT_BYTES).context("bundled font is invalid")?;
        Ok(Self {
            font,
            scale: PxScale::from(font_scale),
        })
    }

    pub fn annotate(&self, frame: &mut RgbImage, label: &str) {
        let (text_w, text_h) = text_size(self.scale, &self.font, label);
        let plate_w = text_w + 2 * PLATE_PADDING;
        let plate_h = text_h + 2 * PLATE_PADDING;

        let x0 = frame.width().saturating_sub(plate_w + MARGIN);
        let y0 = frame.height().saturating_sub(plate_h + MARGIN);

        for y in y0..(y0 + plate_h).min(frame.height()) {
            for x in x0..(x0 + plate_w).min(frame.width()) {
                let pixel = frame.get_pixel_mut(x, y);
                for channel in pixel.0.iter_mut() {
                    *channel = (f32::from(*channel) * (1.0 - PLATE_OPACITY)) as u8;
                }
            }
        }

        draw_text_mut(
            frame,
            Rgb([255, 255, 255]),
            (x0 + PLATE_PADDING) as i32,
            (y0 + PLATE_PADDING) as i32,
            self.scale,
            &self.font,
            label,
        );
    }
}
