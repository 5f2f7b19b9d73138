//! Single-candidate encoders used by the fallback chain.
//!
//! This module provides functionality for:
//! - Encoding JPEG with explicit subsampling, scan layout and Huffman tables
//! - Re-encoding PNG losslessly at maximum compression, keeping palettes
//! - Encoding WebP losslessly, and lossily when built with `lossy-webp`
//!
//! Each function produces one in-memory candidate. Choosing parameters and
//! checking the byte budget is the job of [`crate::search`] and
//! [`crate::compress`].
//!
//! # Examples
//!
//! ```ignore
//! use bytecap_core::encode::{encode_jpeg, JpegParams};
//!
//! let img = image::DynamicImage::new_rgb8(100, 100);
//! let jpeg_bytes = encode_jpeg(&img, 90, JpegParams::default()).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;
mod png;
mod types;
mod webp;

pub use self::jpeg::{encode_jpeg, MAX_JPEG_EDGE};
pub use self::png::{encode_png, encode_png_indexed};
#[cfg(test)]
pub(crate) use self::png::indexed_png_fixture;
pub use self::types::{ChromaSubsampling, Codec, EncodeError, EntropyMode, JpegParams};
pub use self::webp::{encode_webp_lossless, encode_webp_lossy, lossy_webp_available, MAX_WEBP_EDGE};
