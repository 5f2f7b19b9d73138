//! bytecap core - size-bounded image encoding
//!
//! Given an image and a byte budget, this crate produces an encoded image no
//! larger than the budget while keeping its pixel dimensions. Already-small
//! files pass through untouched; otherwise a fixed chain of strategies
//! (JPEG with decreasing chroma/scan fidelity, lossless PNG, WebP) is tried
//! in order, each searching for the highest quality that fits.
//!
//! # Example
//!
//! ```ignore
//! use bytecap_core::{compress, ByteBudget, CompressOptions};
//!
//! let bytes = std::fs::read("product.png").unwrap();
//! let budget = ByteBudget::from_megabytes(2.0).unwrap();
//! let result = compress(&bytes, budget, &CompressOptions::default()).unwrap();
//! std::fs::write(format!("product.{}", result.extension()), &result.bytes).unwrap();
//! ```

pub mod batch;
pub mod budget;
pub mod compress;
pub mod config;
pub mod decode;
pub mod encode;
pub mod flatten;
pub mod search;
pub mod strategy;

pub use batch::{compress_batch, output_file_name, BatchItem, BatchReport, BatchSummary, CompressedFile};
pub use budget::ByteBudget;
pub use compress::{compress, encode_under_budget, CompressError, EncodingResult, StrategyFailure};
pub use config::{Background, CompressOptions, ConfigError, DecodeOptions, QualityBounds};
pub use decode::{decode_source, DecodeError, ImageKind, SourceImage};
pub use encode::Codec;
pub use flatten::flatten_alpha;
pub use search::{search_quality, QualityFit};
pub use strategy::{plan_attempts, EncodingStrategy, PlannedAttempt, QualityRange};
