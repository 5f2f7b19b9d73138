//! Source decoding for the size-bounded encoder.
//!
//! This module provides functionality for:
//! - Detecting the container format (JPEG, PNG, WebP, TIFF, BMP, GIF)
//! - Enforcing an explicit pixel-count limit before decoding
//! - Applying EXIF orientation so re-encoded output is upright
//!
//! # Examples
//!
//! ```ignore
//! use bytecap_core::config::DecodeOptions;
//! use bytecap_core::decode::decode_source;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let source = decode_source(&bytes, &DecodeOptions::default()).unwrap();
//! println!("Decoded {}x{} {:?}", source.width(), source.height(), source.kind());
//! ```

mod source;
mod types;

pub use source::{decode_source, detect_kind};
pub use types::{DecodeError, ImageKind, Orientation, SourceImage};
