//! JPEG encoding with explicit structural parameters.
//!
//! Uses the `jpeg-encoder` crate, which exposes chroma subsampling,
//! progressive scans and optimized Huffman tables: the knobs the JPEG ladder
//! steps through while quality is searched.

use image::DynamicImage;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};

use super::{ChromaSubsampling, Codec, EncodeError, EntropyMode, JpegParams};

/// JPEG frame headers store dimensions as 16-bit values.
pub const MAX_JPEG_EDGE: u32 = u16::MAX as u32;

/// Encode an image to JPEG bytes.
///
/// Grayscale images without alpha are written as single-channel JPEGs; every
/// other color type is converted to 8-bit RGB, dropping any alpha channel.
/// Flatten transparent images first if the background matters.
///
/// # Arguments
///
/// * `image` - Image to encode
/// * `quality` - JPEG quality (clamped to 1-100)
/// * `params` - Subsampling, scan layout and Huffman table choice
pub fn encode_jpeg(
    image: &DynamicImage,
    quality: u8,
    params: JpegParams,
) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width(), image.height());
    match image {
        DynamicImage::ImageLuma8(gray) => {
            encode_jpeg_pixels(gray.as_raw(), width, height, ColorType::Luma, quality, params)
        }
        DynamicImage::ImageLuma16(_) => {
            let gray = image.to_luma8();
            encode_jpeg_pixels(gray.as_raw(), width, height, ColorType::Luma, quality, params)
        }
        DynamicImage::ImageRgb8(rgb) => {
            encode_jpeg_pixels(rgb.as_raw(), width, height, ColorType::Rgb, quality, params)
        }
        _ => {
            let rgb = image.to_rgb8();
            encode_jpeg_pixels(rgb.as_raw(), width, height, ColorType::Rgb, quality, params)
        }
    }
}

fn encode_jpeg_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    color: ColorType,
    quality: u8,
    params: JpegParams,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if width > MAX_JPEG_EDGE || height > MAX_JPEG_EDGE {
        return Err(EncodeError::DimensionsTooLarge {
            codec: Codec::Jpeg,
            width,
            height,
            max: MAX_JPEG_EDGE,
        });
    }

    let channels = match color {
        ColorType::Luma => 1,
        _ => 3,
    };
    let expected_len = (width as usize) * (height as usize) * channels;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, quality);
    encoder.set_sampling_factor(match params.subsampling {
        ChromaSubsampling::Full => SamplingFactor::F_1_1,
        ChromaSubsampling::Quarter => SamplingFactor::F_2_2,
    });
    encoder.set_progressive(params.entropy == EntropyMode::Progressive);
    encoder.set_optimized_huffman_tables(params.optimize_huffman);

    encoder
        .encode(pixels, width as u16, height as u16, color)
        .map_err(|e| EncodeError::EncodingFailed {
            codec: Codec::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer)
}
