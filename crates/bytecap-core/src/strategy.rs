//! Encoding strategies and the fallback chain.
//!
//! A strategy is one codec plus fixed structural parameters, tried as a
//! unit. [`plan_attempts`] lays out, for a given source, the ordered list of
//! strategies the encoder will try, highest visual fidelity first. The plan
//! is plain data so it can be inspected without encoding anything.

use serde::{Deserialize, Serialize};

use crate::config::{CompressOptions, ConfigError, QualityBounds};
use crate::decode::ImageKind;
use crate::encode::{ChromaSubsampling, Codec, EntropyMode, JpegParams};

/// Inclusive quality range with `1 <= lo <= hi <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQualityRange")]
pub struct QualityRange {
    lo: u8,
    hi: u8,
}

#[derive(Deserialize)]
struct RawQualityRange {
    lo: u8,
    hi: u8,
}

impl TryFrom<RawQualityRange> for QualityRange {
    type Error = ConfigError;

    fn try_from(raw: RawQualityRange) -> Result<Self, Self::Error> {
        QualityRange::new(raw.lo, raw.hi)
    }
}

impl QualityRange {
    pub fn new(lo: u8, hi: u8) -> Result<Self, ConfigError> {
        if lo == 0 || lo > hi || hi > 100 {
            return Err(ConfigError::InvalidQualityRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// For compile-time defaults known to be valid.
    pub(crate) const fn new_const(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    pub fn lo(self) -> u8 {
        self.lo
    }

    pub fn hi(self) -> u8 {
        self.hi
    }
}

/// One attempt in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingStrategy {
    /// The source bytes already fit and are returned untouched.
    KeepOriginal { format: ImageKind },
    /// JPEG with fixed structure, quality searched within `quality`.
    Jpeg {
        params: JpegParams,
        quality: QualityRange,
    },
    /// PNG at maximum compression effort.
    PngLossless,
    WebpLossless,
    /// WebP with quality searched within `quality`.
    WebpLossy { quality: QualityRange },
}

impl EncodingStrategy {
    /// Output container produced by this strategy.
    pub fn format(&self) -> ImageKind {
        match self {
            EncodingStrategy::KeepOriginal { format } => *format,
            EncodingStrategy::Jpeg { .. } => ImageKind::Jpeg,
            EncodingStrategy::PngLossless => ImageKind::Png,
            EncodingStrategy::WebpLossless | EncodingStrategy::WebpLossy { .. } => ImageKind::Webp,
        }
    }

    /// Codec that encodes with this strategy; `None` for the passthrough.
    pub fn codec(&self) -> Option<Codec> {
        match self {
            EncodingStrategy::KeepOriginal { .. } => None,
            EncodingStrategy::Jpeg { .. } => Some(Codec::Jpeg),
            EncodingStrategy::PngLossless => Some(Codec::Png),
            EncodingStrategy::WebpLossless | EncodingStrategy::WebpLossy { .. } => {
                Some(Codec::Webp)
            }
        }
    }

    /// Short human label, e.g. `JPEG 4:2:0 baseline`.
    pub fn label(&self) -> String {
        match self {
            EncodingStrategy::KeepOriginal { format } => {
                format!("{} unchanged", format.extension().to_uppercase())
            }
            EncodingStrategy::Jpeg { params, .. } => {
                let mut label = format!(
                    "JPEG {} {}",
                    params.subsampling.label(),
                    params.entropy.label()
                );
                if !params.optimize_huffman {
                    label.push_str(" (standard tables)");
                }
                label
            }
            EncodingStrategy::PngLossless => "PNG lossless".to_string(),
            EncodingStrategy::WebpLossless => "WebP lossless".to_string(),
            EncodingStrategy::WebpLossy { .. } => "WebP".to_string(),
        }
    }
}

/// A strategy plus whether the image is flattened onto the background first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAttempt {
    pub strategy: EncodingStrategy,
    pub flatten: bool,
}

impl PlannedAttempt {
    fn direct(strategy: EncodingStrategy) -> Self {
        Self {
            strategy,
            flatten: false,
        }
    }

    fn flattened(strategy: EncodingStrategy) -> Self {
        Self {
            strategy,
            flatten: true,
        }
    }
}

/// The four JPEG strategies, from 4:4:4 progressive down to baseline with
/// standard Huffman tables and the lowest quality floor.
pub fn jpeg_ladder(bounds: &QualityBounds) -> [EncodingStrategy; 4] {
    let step = |subsampling: ChromaSubsampling,
                entropy: EntropyMode,
                optimize_huffman: bool,
                quality: QualityRange| EncodingStrategy::Jpeg {
        params: JpegParams {
            subsampling,
            entropy,
            optimize_huffman,
        },
        quality,
    };

    [
        step(
            ChromaSubsampling::Full,
            EntropyMode::Progressive,
            true,
            bounds.jpeg_full_chroma,
        ),
        step(
            ChromaSubsampling::Quarter,
            EntropyMode::Progressive,
            true,
            bounds.jpeg_subsampled,
        ),
        step(
            ChromaSubsampling::Quarter,
            EntropyMode::Baseline,
            true,
            bounds.jpeg_baseline,
        ),
        step(
            ChromaSubsampling::Quarter,
            EntropyMode::Baseline,
            false,
            bounds.jpeg_aggressive,
        ),
    ]
}

/// Ordered strategies for a source of `kind`, after the passthrough check.
///
/// - JPEG: the JPEG ladder.
/// - PNG: lossless PNG; then either the flattened JPEG ladder (when PNG→JPG
///   is allowed) or lossless then lossy WebP, each if allowed.
/// - Anything else: the JPEG ladder if opaque; lossy WebP if allowed; and,
///   for images with alpha, the flattened JPEG ladder as a last resort.
pub fn plan_attempts(
    kind: ImageKind,
    has_alpha: bool,
    options: &CompressOptions,
) -> Vec<PlannedAttempt> {
    let ladder = jpeg_ladder(&options.quality);
    let lossy_webp = EncodingStrategy::WebpLossy {
        quality: options.quality.webp_lossy,
    };
    let mut plan = Vec::with_capacity(8);

    match kind {
        ImageKind::Jpeg => {
            plan.extend(ladder.into_iter().map(PlannedAttempt::direct));
        }
        ImageKind::Png => {
            plan.push(PlannedAttempt::direct(EncodingStrategy::PngLossless));
            if options.allow_png_to_jpg {
                plan.extend(ladder.into_iter().map(PlannedAttempt::flattened));
            } else {
                if options.allow_lossless_webp {
                    plan.push(PlannedAttempt::direct(EncodingStrategy::WebpLossless));
                }
                if options.allow_lossy_webp {
                    plan.push(PlannedAttempt::direct(lossy_webp));
                }
            }
        }
        ImageKind::Webp | ImageKind::Tiff | ImageKind::Bmp | ImageKind::Gif => {
            if !has_alpha {
                plan.extend(ladder.into_iter().map(PlannedAttempt::direct));
            }
            if options.allow_lossy_webp {
                plan.push(PlannedAttempt::direct(lossy_webp));
            }
            if has_alpha {
                plan.extend(ladder.into_iter().map(PlannedAttempt::flattened));
            }
        }
    }

    plan
}
