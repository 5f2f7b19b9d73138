//! Size-bounded encoding: the fallback chain driver.
//!
//! [`encode_under_budget`] returns the original bytes when they already fit,
//! otherwise walks the planned strategies in order and returns the first
//! candidate that fits the budget. Failures inside one strategy are local
//! and fall through to the next; only exhaustion of the whole chain is
//! reported, as [`CompressError::BudgetUnattainable`].
//!
//! # Concurrency
//!
//! Calls are pure and synchronous. They share no state, so many images can
//! be compressed at once from separate threads, one image per call.

use std::borrow::Cow;

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;

use crate::budget::ByteBudget;
use crate::config::CompressOptions;
use crate::decode::{decode_source, DecodeError, ImageKind, Orientation, SourceImage};
use crate::encode::{
    encode_jpeg, encode_png, encode_png_indexed, encode_webp_lossless, encode_webp_lossy,
    EncodeError,
};
use crate::flatten::flatten_alpha;
use crate::search::search_quality;
use crate::strategy::{plan_attempts, EncodingStrategy, PlannedAttempt};

/// Errors surfaced to callers of [`compress`] and [`encode_under_budget`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input could not be decoded. Terminal for this file only.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Every applicable strategy was exhausted without meeting the budget.
    #[error("No strategy fit the budget of {max_bytes} bytes{}", smallest_suffix(.smallest))]
    BudgetUnattainable {
        max_bytes: u64,
        /// Smallest candidate produced by any strategy, if one was encoded.
        smallest: Option<usize>,
    },
}

fn smallest_suffix(smallest: &Option<usize>) -> String {
    match smallest {
        Some(size) => format!(" (smallest attempt: {size} bytes)"),
        None => String::new(),
    }
}

/// Why a single strategy produced no result. Never surfaced directly.
#[derive(Debug, Error)]
pub enum StrategyFailure {
    /// No candidate within the strategy's parameters fit.
    #[error("strategy exhausted")]
    Exhausted { smallest: Option<usize> },

    /// The strategy is not available in this build or for this image.
    #[error("strategy unsupported: {reason}")]
    Unsupported { reason: String },

    /// The encoder failed outright.
    #[error(transparent)]
    Encode(EncodeError),
}

impl From<EncodeError> for StrategyFailure {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Unsupported { .. } => StrategyFailure::Unsupported {
                reason: err.to_string(),
            },
            other => StrategyFailure::Encode(other),
        }
    }
}

/// A candidate that fits the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingResult {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Quality the search settled on, for quality-searched strategies.
    pub quality: Option<u8>,
    pub strategy: EncodingStrategy,
    /// Whether transparency was composited onto the background first.
    pub flattened: bool,
    pub width: u32,
    pub height: u32,
}

impl EncodingResult {
    /// Container of [`Self::bytes`].
    pub fn format(&self) -> ImageKind {
        self.strategy.format()
    }

    /// File extension for the output, without the dot.
    pub fn extension(&self) -> &'static str {
        self.format().extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format().mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the original bytes were passed through untouched.
    pub fn is_unchanged(&self) -> bool {
        matches!(self.strategy, EncodingStrategy::KeepOriginal { .. })
    }

    /// Short human-readable summary, e.g. `JPEG 4:2:0 progressive Q=71`.
    pub fn describe(&self) -> String {
        let mut text = self.strategy.label();
        if let Some(quality) = self.quality {
            text.push_str(&format!(" Q={quality}"));
        }
        if self.flattened {
            text.push_str(" (alpha flattened)");
        }
        text
    }
}

/// Decode `bytes` and encode the result under `budget`.
///
/// # Errors
///
/// - `CompressError::Decode` if the bytes are not a usable image
/// - `CompressError::BudgetUnattainable` if no strategy fits
pub fn compress(
    bytes: &[u8],
    budget: ByteBudget,
    options: &CompressOptions,
) -> Result<EncodingResult, CompressError> {
    let source = decode_source(bytes, &options.decode)?;
    encode_under_budget(&source, budget, options)
}

/// Encode `source` so the output is at most `budget` bytes, never changing
/// its pixel dimensions.
pub fn encode_under_budget(
    source: &SourceImage,
    budget: ByteBudget,
    options: &CompressOptions,
) -> Result<EncodingResult, CompressError> {
    let (width, height) = (source.width(), source.height());

    if let Some(original) = source.original_bytes() {
        if budget.fits(original.len()) {
            tracing::debug!(size = original.len(), %budget, "original already fits");
            return Ok(EncodingResult {
                bytes: original.to_vec(),
                quality: None,
                strategy: EncodingStrategy::KeepOriginal {
                    format: source.kind(),
                },
                flattened: false,
                width,
                height,
            });
        }
    }

    let plan = plan_attempts(source.kind(), source.has_alpha(), options);
    let mut flattened: Option<DynamicImage> = None;
    let mut smallest: Option<usize> = None;

    for PlannedAttempt { strategy, flatten } in plan {
        let image = if flatten {
            &*flattened.get_or_insert_with(|| {
                DynamicImage::ImageRgb8(flatten_alpha(source.image(), options.flatten_background))
            })
        } else {
            source.image()
        };

        match run_attempt(source, image, strategy, budget) {
            Ok((bytes, quality)) => {
                tracing::info!(
                    strategy = %strategy.label(),
                    quality,
                    size = bytes.len(),
                    %budget,
                    "candidate fits budget"
                );
                return Ok(EncodingResult {
                    bytes,
                    quality,
                    strategy,
                    flattened: flatten && source.has_alpha(),
                    width,
                    height,
                });
            }
            Err(StrategyFailure::Exhausted { smallest: size }) => {
                tracing::debug!(strategy = %strategy.label(), smallest = size, "strategy exhausted");
                smallest = match (smallest, size) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            Err(failure) => {
                tracing::debug!(strategy = %strategy.label(), error = %failure, "strategy skipped");
            }
        }
    }

    tracing::debug!(%budget, ?smallest, "all strategies exhausted");
    Err(CompressError::BudgetUnattainable {
        max_bytes: budget.get(),
        smallest,
    })
}

/// Try one strategy on one image. `image` is the source pixels, flattened
/// when the attempt asks for it.
fn run_attempt(
    source: &SourceImage,
    image: &DynamicImage,
    strategy: EncodingStrategy,
    budget: ByteBudget,
) -> Result<(Vec<u8>, Option<u8>), StrategyFailure> {
    match strategy {
        EncodingStrategy::KeepOriginal { .. } => Err(StrategyFailure::Unsupported {
            reason: "passthrough is decided before the chain".to_string(),
        }),
        EncodingStrategy::Jpeg { params, quality } => {
            // Convert once instead of on every probe.
            let pixels: Cow<'_, DynamicImage> = match image {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => Cow::Borrowed(image),
                _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
            };
            search_quality(quality, budget, |q| encode_jpeg(&pixels, q, params))
                .map(|fit| (fit.bytes, Some(fit.quality)))
        }
        EncodingStrategy::WebpLossy { quality } => {
            search_quality(quality, budget, |q| encode_webp_lossy(image, q))
                .map(|fit| (fit.bytes, Some(fit.quality)))
        }
        EncodingStrategy::PngLossless => {
            let indexed = match palette_file(source) {
                Some(bytes) => encode_png_indexed(bytes)?,
                None => None,
            };
            let bytes = match indexed {
                Some(bytes) => bytes,
                None => encode_png(image)?,
            };
            single(bytes, budget)
        }
        EncodingStrategy::WebpLossless => single(encode_webp_lossless(image)?, budget),
    }
}

/// The original PNG file, when its pixels were used as stored. Palette
/// re-encoding works on the file, so it must not undo an applied rotation.
fn palette_file(source: &SourceImage) -> Option<&[u8]> {
    if source.kind() != ImageKind::Png || source.orientation() != Orientation::Normal {
        return None;
    }
    source.original_bytes()
}

fn single(bytes: Vec<u8>, budget: ByteBudget) -> Result<(Vec<u8>, Option<u8>), StrategyFailure> {
    if budget.fits(bytes.len()) {
        Ok((bytes, None))
    } else {
        Err(StrategyFailure::Exhausted {
            smallest: Some(bytes.len()),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use image::RgbImage;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: every success fits the budget and keeps dimensions.
        #[test]
        fn prop_budget_and_dimension_invariants(
            width in 8u32..=48,
            height in 8u32..=48,
            max_bytes in 800u64..20_000,
            seed in any::<u32>(),
        ) {
            let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                let v = x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed;
                [(v % 256) as u8, ((v >> 8) % 256) as u8, ((v >> 16) % 256) as u8].into()
            }));
            let source = SourceImage::from_image(img, ImageKind::Jpeg);

            if let Ok(result) = encode_under_budget(
                &source,
                ByteBudget::new(max_bytes).unwrap(),
                &CompressOptions::default(),
            ) {
                prop_assert!(result.len() as u64 <= max_bytes);
                let decoded = image::load_from_memory(&result.bytes).unwrap();
                prop_assert_eq!((decoded.width(), decoded.height()), (width, height));
            }
        }
    }
}
