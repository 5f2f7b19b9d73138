//! WASM-compatible wrapper types for compression results.
//!
//! This module provides JavaScript-friendly types that wrap the core bytecap
//! types, handling the conversion between Rust and JavaScript representations.

use bytecap_core::EncodingResult;
use wasm_bindgen::prelude::*;

/// An encoded image that fits the requested budget.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. Reading `bytes` copies them into a
/// fresh `Uint8Array`, so read it once and keep the array. `free()` releases
/// the WASM copy early; otherwise wasm-bindgen's finalizer handles it.
#[wasm_bindgen]
pub struct JsCompressedImage {
    result: EncodingResult,
}

#[wasm_bindgen]
impl JsCompressedImage {
    /// Encoded file bytes as a `Uint8Array` (copied).
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.result.bytes.clone()
    }

    /// File extension without the dot: `jpg`, `png`, `webp`, ...
    #[wasm_bindgen(getter)]
    pub fn extension(&self) -> String {
        self.result.extension().to_string()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.result.mime_type().to_string()
    }

    /// Quality chosen by the search, or `undefined` for lossless and
    /// unchanged output.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<u8> {
        self.result.quality
    }

    /// Human-readable summary of the strategy, e.g. `JPEG 4:2:0 progressive Q=71`.
    #[wasm_bindgen(getter)]
    pub fn strategy(&self) -> String {
        self.result.describe()
    }

    /// Whether the input was already within budget and returned as is.
    #[wasm_bindgen(getter)]
    pub fn unchanged(&self) -> bool {
        self.result.is_unchanged()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.result.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.result.height
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.result.len()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsCompressedImage {
    pub(crate) fn from_result(result: EncodingResult) -> Self {
        Self { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytecap_core::decode::ImageKind;
    use bytecap_core::encode::{ChromaSubsampling, EntropyMode, JpegParams};
    use bytecap_core::{EncodingStrategy, QualityRange};

    fn jpeg_result() -> EncodingResult {
        EncodingResult {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            quality: Some(71),
            strategy: EncodingStrategy::Jpeg {
                params: JpegParams {
                    subsampling: ChromaSubsampling::Quarter,
                    entropy: EntropyMode::Progressive,
                    optimize_huffman: true,
                },
                quality: QualityRange::new(10, 95).unwrap(),
            },
            flattened: false,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn test_getters() {
        let img = JsCompressedImage::from_result(jpeg_result());
        assert_eq!(img.bytes(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(img.extension(), "jpg");
        assert_eq!(img.mime_type(), "image/jpeg");
        assert_eq!(img.quality(), Some(71));
        assert_eq!(img.strategy(), "JPEG 4:2:0 progressive Q=71");
        assert!(!img.unchanged());
        assert_eq!((img.width(), img.height()), (640, 480));
        assert_eq!(img.byte_length(), 4);
    }

    #[test]
    fn test_unchanged_has_no_quality() {
        let img = JsCompressedImage::from_result(EncodingResult {
            bytes: vec![1, 2, 3],
            quality: None,
            strategy: EncodingStrategy::KeepOriginal {
                format: ImageKind::Png,
            },
            flattened: false,
            width: 2,
            height: 2,
        });
        assert!(img.unchanged());
        assert_eq!(img.quality(), None);
        assert_eq!(img.extension(), "png");
        assert_eq!(img.mime_type(), "image/png");
    }
}
