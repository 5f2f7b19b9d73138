//! Source decoding with format detection, size limits and EXIF orientation.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader, Limits};

use super::{DecodeError, ImageKind, Orientation, SourceImage};
use crate::config::DecodeOptions;

/// Decode file bytes into a [`SourceImage`].
///
/// The container is detected from magic bytes, the declared dimensions are
/// checked against `options.max_pixels` before any pixel buffer is
/// allocated, and EXIF orientation is applied when requested.
///
/// # Errors
///
/// - `DecodeError::Empty` for zero-length input
/// - `DecodeError::UnsupportedFormat` if the container is not recognized
/// - `DecodeError::TooLarge` if the pixel count exceeds the limit
/// - `DecodeError::Corrupted` if the decoder rejects the data
pub fn decode_source(bytes: &[u8], options: &DecodeOptions) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let kind = detect_kind(bytes)?;

    if let Some(max_pixels) = options.max_pixels {
        let (width, height) = reader_for(bytes)?
            .into_dimensions()
            .map_err(|e| DecodeError::Corrupted(e.to_string()))?;
        if u64::from(width) * u64::from(height) > max_pixels {
            return Err(DecodeError::TooLarge {
                width,
                height,
                max_pixels,
            });
        }
    }

    let mut reader = reader_for(bytes)?;
    // The pixel limit above is the only cap; large product photos must not be
    // rejected by the decoder's default allocation ceiling.
    reader.limits(Limits::no_limits());
    let img = reader
        .decode()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

    let orientation = if options.apply_orientation {
        extract_orientation(bytes)
    } else {
        Orientation::Normal
    };
    let img = apply_orientation(img, orientation);

    tracing::debug!(
        ?kind,
        width = img.width(),
        height = img.height(),
        color = ?img.color(),
        ?orientation,
        "decoded source image"
    );

    Ok(SourceImage::from_decoded(img, kind, bytes.to_vec(), orientation))
}

/// Detect the container format from magic bytes.
pub fn detect_kind(bytes: &[u8]) -> Result<ImageKind, DecodeError> {
    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    ImageKind::from_image_format(format).ok_or(DecodeError::UnsupportedFormat)
}

fn reader_for(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupted(e.to_string()))
}

/// Extract EXIF orientation from encoded bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, [90, 140, 200].into()));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    /// Splice an APP1 EXIF segment carrying only an orientation tag right
    /// after the JPEG SOI marker.
    fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II*\0");
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation
        tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&0u16.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);
        let len = (payload.len() + 2) as u16;

        let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_decode_empty() {
        let result = decode_source(&[], &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_garbage() {
        let result = decode_source(b"definitely not an image", &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, [1, 2, 3].into()));
        let bytes = png_bytes(&img);
        let result = decode_source(&bytes[..bytes.len() / 2], &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Corrupted(_))));
    }

    #[test]
    fn test_decode_png_keeps_alpha_and_original() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 8, [10, 20, 30, 128].into()));
        let bytes = png_bytes(&img);

        let source = decode_source(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(source.kind(), ImageKind::Png);
        assert_eq!((source.width(), source.height()), (12, 8));
        assert!(source.has_alpha());
        assert_eq!(source.original_bytes(), Some(bytes.as_slice()));
    }

    #[test]
    fn test_decode_jpeg_kind() {
        let bytes = jpeg_bytes(16, 16);
        assert_eq!(detect_kind(&bytes).unwrap(), ImageKind::Jpeg);

        let source = decode_source(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(source.kind(), ImageKind::Jpeg);
        assert!(!source.has_alpha());
    }

    #[test]
    fn test_decode_rejects_too_many_pixels() {
        let bytes = jpeg_bytes(64, 32);
        let options = DecodeOptions {
            max_pixels: Some(1000),
            ..DecodeOptions::default()
        };

        let result = decode_source(&bytes, &options);
        assert!(matches!(
            result,
            Err(DecodeError::TooLarge {
                width: 64,
                height: 32,
                max_pixels: 1000
            })
        ));
    }

    #[test]
    fn test_decode_unlimited_by_default() {
        let bytes = jpeg_bytes(64, 32);
        assert!(DecodeOptions::default().max_pixels.is_none());
        assert!(decode_source(&bytes, &DecodeOptions::default()).is_ok());
    }

    #[test]
    fn test_orientation_applied() {
        let bytes = with_exif_orientation(&jpeg_bytes(32, 16), 6);
        assert_eq!(extract_orientation(&bytes), Orientation::Rotate90CW);

        let source = decode_source(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(source.orientation(), Orientation::Rotate90CW);
        assert_eq!((source.width(), source.height()), (16, 32));
    }

    #[test]
    fn test_orientation_ignored_when_disabled() {
        let bytes = with_exif_orientation(&jpeg_bytes(32, 16), 6);
        let options = DecodeOptions {
            apply_orientation: false,
            ..DecodeOptions::default()
        };

        let source = decode_source(&bytes, &options).unwrap();
        assert_eq!(source.orientation(), Orientation::Normal);
        assert_eq!((source.width(), source.height()), (32, 16));
    }

    #[test]
    fn test_no_exif_is_normal() {
        assert_eq!(extract_orientation(&jpeg_bytes(8, 8)), Orientation::Normal);
        assert_eq!(extract_orientation(&[0, 1, 2, 3]), Orientation::Normal);
    }
}
