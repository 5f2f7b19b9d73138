//! Alpha flattening onto an opaque background.
//!
//! JPEG has no alpha channel, so transparent images are composited onto a
//! caller-chosen color before any JPEG strategy runs.

use image::{DynamicImage, RgbImage};

use crate::config::Background;

/// Composite an image onto `background`, producing opaque RGB.
///
/// Each channel becomes `(c·a + bg·(255−a)) / 255`, rounded to nearest.
/// Images without alpha are converted to RGB unchanged.
pub fn flatten_alpha(image: &DynamicImage, background: Background) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let [br, bg, bb] = background.0;
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        [blend(r, br, a), blend(g, bg, a), blend(b, bb, a)].into()
    })
}

#[inline]
fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let value = u32::from(fg) * a + u32::from(bg) * (255 - a);
    ((value + 127) / 255) as u8
}
