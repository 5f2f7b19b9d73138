//! Codec identifiers, JPEG structural parameters and encode errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::ImageKind;

/// Errors that can occur while encoding a single candidate.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec cannot represent an image this large
    #[error("{codec} cannot encode {width}x{height}: maximum edge is {max}")]
    DimensionsTooLarge {
        codec: Codec,
        width: u32,
        height: u32,
        max: u32,
    },

    /// The underlying encoder failed
    #[error("{codec} encoding failed: {message}")]
    EncodingFailed { codec: Codec, message: String },

    /// The codec or mode is not available in this build
    #[error("{codec} unavailable: {reason}")]
    Unsupported { codec: Codec, reason: &'static str },
}

/// Output codecs the encoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Jpeg,
    Png,
    Webp,
}

impl Codec {
    pub fn kind(self) -> ImageKind {
        match self {
            Codec::Jpeg => ImageKind::Jpeg,
            Codec::Png => ImageKind::Png,
            Codec::Webp => ImageKind::Webp,
        }
    }

    pub fn extension(self) -> &'static str {
        self.kind().extension()
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Codec::Jpeg => "JPEG",
            Codec::Png => "PNG",
            Codec::Webp => "WebP",
        })
    }
}

/// Chroma subsampling for JPEG output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromaSubsampling {
    /// 4:4:4, full color resolution.
    Full,
    /// 4:2:0, color halved in both directions.
    Quarter,
}

impl ChromaSubsampling {
    pub fn label(self) -> &'static str {
        match self {
            ChromaSubsampling::Full => "4:4:4",
            ChromaSubsampling::Quarter => "4:2:0",
        }
    }
}

/// JPEG scan layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntropyMode {
    Progressive,
    Baseline,
}

impl EntropyMode {
    pub fn label(self) -> &'static str {
        match self {
            EntropyMode::Progressive => "progressive",
            EntropyMode::Baseline => "baseline",
        }
    }
}

/// Structural JPEG parameters held fixed while quality is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JpegParams {
    pub subsampling: ChromaSubsampling,
    pub entropy: EntropyMode,
    /// Build image-specific Huffman tables instead of the standard ones.
    pub optimize_huffman: bool,
}

impl Default for JpegParams {
    fn default() -> Self {
        Self {
            subsampling: ChromaSubsampling::Full,
            entropy: EntropyMode::Progressive,
            optimize_huffman: true,
        }
    }
}
