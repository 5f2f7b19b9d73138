//! Lossless PNG re-encoding at maximum compression effort.
//!
//! Decoding through `image` expands palette PNGs to RGB/RGBA, which can
//! double their size on re-encode. [`encode_png_indexed`] works on the
//! original file instead and keeps the palette.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;

use super::{Codec, EncodeError};

/// Re-encode an image as PNG using the strongest deflate setting and
/// adaptive row filters.
///
/// The color type is preserved where PNG can store it (8/16-bit gray, gray
/// with alpha, RGB, RGBA); floating-point images are narrowed to 8 bits.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);

    let result = match image {
        DynamicImage::ImageRgb32F(_) => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
        }
        DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)
        }
        _ => image.write_with_encoder(encoder),
    };
    result.map_err(|e| EncodeError::EncodingFailed {
        codec: Codec::Png,
        message: e.to_string(),
    })?;

    Ok(buffer.into_inner())
}

/// Re-encode an indexed (palette) PNG file without expanding it.
///
/// Returns `Ok(None)` when `bytes` is not an indexed PNG. Only the palette
/// and its transparency survive; other ancillary chunks are dropped.
pub fn encode_png_indexed(bytes: &[u8]) -> Result<Option<Vec<u8>>, EncodeError> {
    let failed = |message: String| EncodeError::EncodingFailed {
        codec: Codec::Png,
        message,
    };

    let mut decoder = ::png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(::png::Transformations::IDENTITY);
    let Ok(mut reader) = decoder.read_info() else {
        return Ok(None);
    };

    let info = reader.info();
    if info.color_type != ::png::ColorType::Indexed {
        return Ok(None);
    }
    let (width, height, depth) = (info.width, info.height, info.bit_depth);
    let palette = info
        .palette
        .as_ref()
        .map(|p| p.to_vec())
        .ok_or_else(|| failed("indexed PNG has no palette".to_string()))?;
    let trns = info.trns.as_ref().map(|t| t.to_vec());

    let mut indices = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut indices)
        .map_err(|e| failed(e.to_string()))?;
    indices.truncate(frame.buffer_size());

    let mut out = Vec::new();
    let mut encoder = ::png::Encoder::new(&mut out, width, height);
    encoder.set_color(::png::ColorType::Indexed);
    encoder.set_depth(depth);
    encoder.set_palette(palette);
    if let Some(trns) = trns {
        encoder.set_trns(trns);
    }
    encoder.set_compression(::png::Compression::Best);
    encoder.set_filter(::png::FilterType::NoFilter);
    encoder.set_adaptive_filter(::png::AdaptiveFilterType::NonAdaptive);

    let mut writer = encoder
        .write_header()
        .map_err(|e| failed(e.to_string()))?;
    writer
        .write_image_data(&indices)
        .map_err(|e| failed(e.to_string()))?;
    writer.finish().map_err(|e| failed(e.to_string()))?;

    Ok(Some(out))
}

/// 4-bit palette PNG of xorshift noise over 16 colors, optionally padded
/// with a `tEXt` chunk of `comment_len` bytes. The last palette entry is
/// half transparent when `with_trns` is set.
#[cfg(test)]
pub(crate) fn indexed_png_fixture(
    width: u32,
    height: u32,
    comment_len: usize,
    with_trns: bool,
) -> Vec<u8> {
    assert!(width % 2 == 0);
    let palette: Vec<u8> = (0..16u8)
        .flat_map(|i| [i * 16, 255 - i * 16, i.wrapping_mul(53)])
        .collect();

    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let indices: Vec<u8> = (0..(width / 2 * height))
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        })
        .collect();

    let mut out = Vec::new();
    let mut encoder = ::png::Encoder::new(&mut out, width, height);
    encoder.set_color(::png::ColorType::Indexed);
    encoder.set_depth(::png::BitDepth::Four);
    encoder.set_palette(palette);
    if with_trns {
        let mut trns = vec![255u8; 16];
        trns[15] = 128;
        encoder.set_trns(trns);
    }
    encoder.set_compression(::png::Compression::Best);
    encoder.set_filter(::png::FilterType::NoFilter);
    encoder.set_adaptive_filter(::png::AdaptiveFilterType::NonAdaptive);

    let mut writer = encoder.write_header().unwrap();
    if comment_len > 0 {
        let mut text = b"Comment\0".to_vec();
        text.resize(text.len() + comment_len, b'x');
        writer
            .write_chunk(::png::chunk::ChunkType(*b"tEXt"), &text)
            .unwrap();
    }
    writer.write_image_data(&indices).unwrap();
    writer.finish().unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, Rgb32FImage, RgbImage, RgbaImage};

    #[test]
    fn test_encode_png_magic_and_roundtrip_pixels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 6, |x, y| {
            [(x * 30) as u8, (y * 40) as u8, 7, (x * y) as u8].into()
        }));

        let png = encode_png(&img).unwrap();
        assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn test_encode_png_keeps_gray_alpha() {
        let img = DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(4, 4, [90, 20].into()));
        let png = encode_png(&img).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::La8);
    }

    #[test]
    fn test_encode_png_float_is_narrowed() {
        let img = DynamicImage::ImageRgb32F(Rgb32FImage::from_pixel(3, 3, [0.5, 0.25, 1.0].into()));
        let png = encode_png(&img).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_solid_image_is_tiny() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, [30, 60, 90].into()));
        let png = encode_png(&img).unwrap();
        assert!(png.len() <= 100, "solid 10x10 PNG was {} bytes", png.len());
    }

    fn png_color_type(bytes: &[u8]) -> ::png::ColorType {
        let decoder = ::png::Decoder::new(Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        reader.info().color_type
    }

    #[test]
    fn test_indexed_keeps_palette_and_pixels() {
        let original = indexed_png_fixture(64, 32, 0, false);
        let reencoded = encode_png_indexed(&original).unwrap().unwrap();

        assert_eq!(png_color_type(&reencoded), ::png::ColorType::Indexed);
        let before = image::load_from_memory(&original).unwrap();
        let after = image::load_from_memory(&reencoded).unwrap();
        assert_eq!(after.to_rgba8(), before.to_rgba8());
    }

    #[test]
    fn test_indexed_much_smaller_than_expanded() {
        let original = indexed_png_fixture(64, 64, 0, false);
        let indexed = encode_png_indexed(&original).unwrap().unwrap();
        let expanded = encode_png(&image::load_from_memory(&original).unwrap()).unwrap();
        assert!(
            indexed.len() < expanded.len(),
            "indexed {} vs expanded {}",
            indexed.len(),
            expanded.len()
        );
    }

    #[test]
    fn test_indexed_keeps_transparency() {
        let original = indexed_png_fixture(16, 16, 0, true);
        let reencoded = encode_png_indexed(&original).unwrap().unwrap();

        let before = image::load_from_memory(&original).unwrap();
        let after = image::load_from_memory(&reencoded).unwrap();
        assert!(after.color().has_alpha());
        assert_eq!(after.to_rgba8(), before.to_rgba8());
    }

    #[test]
    fn test_indexed_drops_ancillary_chunks() {
        let original = indexed_png_fixture(32, 32, 2_000, false);
        let reencoded = encode_png_indexed(&original).unwrap().unwrap();
        assert!(reencoded.len() + 2_000 <= original.len());
    }

    #[test]
    fn test_indexed_ignores_other_inputs() {
        let rgb = encode_png(&DynamicImage::new_rgb8(4, 4)).unwrap();
        assert_eq!(encode_png_indexed(&rgb).unwrap(), None);
        assert_eq!(encode_png_indexed(b"not a png").unwrap(), None);
    }

    #[test]
    fn test_encode_png_zero_dimensions() {
        let img = DynamicImage::new_rgb8(0, 5);
        assert!(matches!(
            encode_png(&img),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
