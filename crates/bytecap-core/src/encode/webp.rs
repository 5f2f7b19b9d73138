//! WebP encoding.
//!
//! Lossless WebP comes from the `image` crate and is always available.
//! Lossy WebP needs libwebp through the `webp` crate and is compiled only
//! with the `lossy-webp` feature; without it [`encode_webp_lossy`] reports
//! [`EncodeError::Unsupported`] so the caller can move on to another
//! strategy.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use super::{Codec, EncodeError};

/// Largest edge a WebP bitstream can describe.
pub const MAX_WEBP_EDGE: u32 = 16383;

fn check_dimensions(width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if width > MAX_WEBP_EDGE || height > MAX_WEBP_EDGE {
        return Err(EncodeError::DimensionsTooLarge {
            codec: Codec::Webp,
            width,
            height,
            max: MAX_WEBP_EDGE,
        });
    }
    Ok(())
}

/// Encode an image as lossless WebP, keeping alpha when present.
pub fn encode_webp_lossless(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    check_dimensions(width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    let encoder = WebPEncoder::new_lossless(&mut buffer);

    let result = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        encoder.write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
    } else {
        let rgb = image.to_rgb8();
        encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
    };
    result.map_err(|e| EncodeError::EncodingFailed {
        codec: Codec::Webp,
        message: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}

/// libwebp's slowest, strongest compression method.
#[cfg(feature = "lossy-webp")]
const LOSSY_METHOD: i32 = 6;

/// Lossy encoder settings for `quality` at maximum compression effort.
#[cfg(feature = "lossy-webp")]
fn lossy_config(quality: u8) -> Result<::webp::WebPConfig, EncodeError> {
    let mut config = ::webp::WebPConfig::new().map_err(|()| EncodeError::EncodingFailed {
        codec: Codec::Webp,
        message: "libwebp rejected the default configuration".to_string(),
    })?;
    config.lossless = 0;
    config.quality = f32::from(quality.clamp(1, 100));
    config.method = LOSSY_METHOD;
    Ok(config)
}

/// Encode an image as lossy WebP at the given quality (clamped to 1-100).
#[cfg(feature = "lossy-webp")]
pub fn encode_webp_lossy(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    check_dimensions(width, height)?;

    let config = lossy_config(quality)?;
    let memory = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        ::webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_advanced(&config)
    } else {
        let rgb = image.to_rgb8();
        ::webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_advanced(&config)
    }
    .map_err(|e| EncodeError::EncodingFailed {
        codec: Codec::Webp,
        message: format!("{e:?}"),
    })?;

    Ok(memory.to_vec())
}

/// Encode an image as lossy WebP at the given quality (clamped to 1-100).
#[cfg(not(feature = "lossy-webp"))]
pub fn encode_webp_lossy(image: &DynamicImage, _quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(image.width(), image.height())?;
    Err(EncodeError::Unsupported {
        codec: Codec::Webp,
        reason: "lossy WebP requires the `lossy-webp` feature",
    })
}

/// Whether this build can produce lossy WebP.
pub fn lossy_webp_available() -> bool {
    cfg!(feature = "lossy-webp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, RgbaImage};

    fn assert_webp_magic(bytes: &[u8]) {
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_lossless_keeps_pixels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(9, 7, |x, y| {
            [(x * 20) as u8, (y * 30) as u8, 99, 255 - (x * y) as u8].into()
        }));

        let webp = encode_webp_lossless(&img).unwrap();
        assert_webp_magic(&webp);

        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_lossless_opaque() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, [1, 2, 3].into()));
        let webp = encode_webp_lossless(&img).unwrap();
        assert_webp_magic(&webp);
    }

    #[test]
    fn test_webp_edge_limit() {
        let img = DynamicImage::new_rgb8(MAX_WEBP_EDGE + 1, 1);
        assert!(matches!(
            encode_webp_lossless(&img),
            Err(EncodeError::DimensionsTooLarge {
                codec: Codec::Webp,
                ..
            })
        ));
    }

    #[cfg(feature = "lossy-webp")]
    #[test]
    fn test_lossy_quality_affects_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            [((x * 7 + y * 13) % 256) as u8, ((x * y) % 256) as u8, (x ^ y) as u8].into()
        }));

        let low = encode_webp_lossy(&img, 20).unwrap();
        let high = encode_webp_lossy(&img, 95).unwrap();
        assert_webp_magic(&low);
        assert!(high.len() > low.len());

        let decoded = image::load_from_memory(&low).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[cfg(feature = "lossy-webp")]
    #[test]
    fn test_lossy_config_uses_max_effort() {
        let config = lossy_config(80).unwrap();
        assert_eq!(config.method, 6);
        assert_eq!(config.lossless, 0);
        assert_eq!(config.quality, 80.0);

        assert_eq!(lossy_config(0).unwrap().quality, 1.0);
        assert_eq!(lossy_config(200).unwrap().quality, 100.0);
    }

    #[cfg(not(feature = "lossy-webp"))]
    #[test]
    fn test_lossy_unsupported_without_feature() {
        let img = DynamicImage::new_rgb8(4, 4);
        assert!(!lossy_webp_available());
        assert!(matches!(
            encode_webp_lossy(&img, 80),
            Err(EncodeError::Unsupported { .. })
        ));
    }
}
