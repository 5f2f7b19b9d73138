//! bytecap WASM - WebAssembly bindings for bytecap
//!
//! This crate exposes bytecap-core's size-bounded encoder to JavaScript so a
//! browser-side batch driver can shrink files before upload.
//!
//! # Module Structure
//!
//! - `compress` - Compression bindings (`compress_to_budget`, `megabytes_to_bytes`,
//!   `supports_lossy_webp`)
//! - `types` - WASM-compatible wrapper for the compression result
//!
//! Lossy WebP relies on libwebp and is not part of this build; the encoder
//! skips that fallback.
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_to_budget, megabytes_to_bytes } from '@bytecap/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_budget(bytes, megabytes_to_bytes(1.5), undefined);
//! console.log(`${result.width}x${result.height} -> ${result.byteLength} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

pub use compress::{compress_to_budget, megabytes_to_bytes, supports_lossy_webp};
pub use types::JsCompressedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
