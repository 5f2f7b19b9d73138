//! Caller-supplied options for size-bounded encoding.
//!
//! Everything the fallback chain can be tuned with lives here and is passed
//! into each call. All structs deserialize with per-field defaults, so a
//! partial JSON/JS object is enough.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strategy::QualityRange;

/// Errors from constructing budgets, ranges or options.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A byte budget of zero can never be met.
    #[error("Byte budget must be greater than zero")]
    ZeroBudget,

    /// Megabyte budgets must be finite and positive.
    #[error("Invalid megabyte budget: {0}")]
    InvalidMegabytes(f64),

    /// Quality ranges must satisfy 1 <= lo <= hi <= 100.
    #[error("Invalid quality range [{lo}, {hi}]: expected 1 <= lo <= hi <= 100")]
    InvalidQualityRange { lo: u8, hi: u8 },
}

/// Opaque RGB color that transparent pixels are composited onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255]);
    pub const BLACK: Background = Background([0, 0, 0]);
}

impl Default for Background {
    fn default() -> Self {
        Background::WHITE
    }
}

/// Search bounds for each quality-searched strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBounds {
    /// JPEG 4:4:4 progressive.
    pub jpeg_full_chroma: QualityRange,
    /// JPEG 4:2:0 progressive.
    pub jpeg_subsampled: QualityRange,
    /// JPEG 4:2:0 baseline.
    pub jpeg_baseline: QualityRange,
    /// JPEG 4:2:0 baseline with standard Huffman tables, the last resort.
    pub jpeg_aggressive: QualityRange,
    /// Lossy WebP. The floor keeps visual loss acceptable.
    pub webp_lossy: QualityRange,
}

impl Default for QualityBounds {
    fn default() -> Self {
        Self {
            jpeg_full_chroma: QualityRange::new_const(10, 95),
            jpeg_subsampled: QualityRange::new_const(10, 95),
            jpeg_baseline: QualityRange::new_const(5, 95),
            jpeg_aggressive: QualityRange::new_const(1, 90),
            webp_lossy: QualityRange::new_const(70, 95),
        }
    }
}

/// Options for turning file bytes into a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject images whose width × height exceeds this. `None` is unlimited.
    pub max_pixels: Option<u64>,
    /// Rotate/flip pixels according to the EXIF orientation tag.
    pub apply_orientation: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_pixels: None,
            apply_orientation: true,
        }
    }
}

/// Options controlling which fallbacks the encoder may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Permit lossless WebP as a PNG fallback.
    pub allow_lossless_webp: bool,
    /// Permit quality-searched WebP as a fallback.
    pub allow_lossy_webp: bool,
    /// Permit flattening PNGs into opaque JPEGs when PNG alone is too big.
    pub allow_png_to_jpg: bool,
    /// Background used when compositing away transparency.
    pub flatten_background: Background,
    pub quality: QualityBounds,
    pub decode: DecodeOptions,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            allow_lossless_webp: false,
            allow_lossy_webp: true,
            allow_png_to_jpg: true,
            flatten_background: Background::WHITE,
            quality: QualityBounds::default(),
            decode: DecodeOptions::default(),
        }
    }
}

impl CompressOptions {
    pub fn new() -> Self {
        Self::default()
    }
}
