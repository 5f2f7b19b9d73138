//! Size-bounded compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_to_budget`] - Re-encode file bytes so they fit a byte budget
//! - [`megabytes_to_bytes`] - Convert a megabyte budget to bytes
//! - [`supports_lossy_webp`] - Whether the lossy WebP fallback is compiled in
//!
//! # Example
//!
//! ```typescript
//! import { compress_to_budget, megabytes_to_bytes } from '@bytecap/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_budget(bytes, megabytes_to_bytes(2), {
//!   allowPngToJpg: false,
//!   flattenBackground: [0, 0, 0],
//! });
//! const blob = new Blob([result.bytes], { type: result.mimeType });
//! console.log(`${file.name}: ${result.strategy}, ${result.byteLength} bytes`);
//! ```

use bytecap_core::encode::lossy_webp_available;
use bytecap_core::{
    compress, Background, ByteBudget, CompressOptions, ConfigError, DecodeOptions,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::types::JsCompressedImage;

/// Options object accepted from JavaScript. Missing fields take the core
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct JsCompressOptions {
    allow_lossless_webp: bool,
    allow_lossy_webp: bool,
    allow_png_to_jpg: bool,
    flatten_background: [u8; 3],
    max_pixels: Option<u64>,
    apply_orientation: bool,
}

impl Default for JsCompressOptions {
    fn default() -> Self {
        Self::from(&CompressOptions::default())
    }
}

impl From<&CompressOptions> for JsCompressOptions {
    fn from(options: &CompressOptions) -> Self {
        Self {
            allow_lossless_webp: options.allow_lossless_webp,
            allow_lossy_webp: options.allow_lossy_webp,
            allow_png_to_jpg: options.allow_png_to_jpg,
            flatten_background: options.flatten_background.0,
            max_pixels: options.decode.max_pixels,
            apply_orientation: options.decode.apply_orientation,
        }
    }
}

impl From<JsCompressOptions> for CompressOptions {
    fn from(js: JsCompressOptions) -> Self {
        CompressOptions {
            allow_lossless_webp: js.allow_lossless_webp,
            allow_lossy_webp: js.allow_lossy_webp,
            allow_png_to_jpg: js.allow_png_to_jpg,
            flatten_background: Background(js.flatten_background),
            decode: DecodeOptions {
                max_pixels: js.max_pixels,
                apply_orientation: js.apply_orientation,
            },
            ..CompressOptions::default()
        }
    }
}

/// Re-encode an image so its file size is at most `max_bytes`.
///
/// Pixel dimensions are never changed. Files already within the budget come
/// back byte-for-byte identical.
///
/// # Arguments
///
/// * `bytes` - Encoded image file (JPEG, PNG, WebP, TIFF, BMP or GIF)
/// * `max_bytes` - Budget in bytes; fractional values are truncated
/// * `options` - `undefined`, `null` or an object with any of `allowLosslessWebp`,
///   `allowLossyWebp`, `allowPngToJpg`, `flattenBackground` (`[r, g, b]`),
///   `maxPixels`, `applyOrientation`
///
/// # Errors
///
/// Returns an error string if the budget is not positive, the options object
/// is malformed, the bytes do not decode, or no strategy fits the budget.
/// Lossy WebP is not available in the WASM build and is skipped.
#[wasm_bindgen]
pub fn compress_to_budget(
    bytes: &[u8],
    max_bytes: f64,
    options: JsValue,
) -> Result<JsCompressedImage, JsValue> {
    let options = parse_options(options)?;
    let budget = budget_from_bytes(max_bytes).map_err(to_js_error)?;

    let result = compress(bytes, budget, &options).map_err(to_js_error)?;
    log_result(&result.describe(), result.len());

    Ok(JsCompressedImage::from_result(result))
}

/// Convert a budget in megabytes (1 MB = 1,048,576 bytes) to bytes.
///
/// # Errors
///
/// Returns an error if `mb` is not finite or not positive, or rounds down to
/// zero bytes.
#[wasm_bindgen]
pub fn megabytes_to_bytes(mb: f64) -> Result<f64, JsValue> {
    ByteBudget::from_megabytes(mb)
        .map(|budget| budget.get() as f64)
        .map_err(to_js_error)
}

/// Whether this build can fall back to lossy WebP.
///
/// `false` in the browser build, where libwebp is not available; the
/// encoder then skips that step of the chain.
#[wasm_bindgen]
pub fn supports_lossy_webp() -> bool {
    lossy_webp_available()
}

fn parse_options(value: JsValue) -> Result<CompressOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CompressOptions::default());
    }
    let js: JsCompressOptions = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {e}")))?;
    Ok(js.into())
}

/// Budget from a JS number. NaN, infinities and anything below one byte are
/// rejected.
pub(crate) fn budget_from_bytes(max_bytes: f64) -> Result<ByteBudget, ConfigError> {
    if !max_bytes.is_finite() || max_bytes < 1.0 {
        return Err(ConfigError::ZeroBudget);
    }
    // `as` saturates above u64::MAX
    ByteBudget::new(max_bytes as u64)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(target_arch = "wasm32")]
fn log_result(summary: &str, size: usize) {
    web_sys::console::debug_1(&JsValue::from_str(&format!(
        "bytecap: {summary}, {size} bytes"
    )));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_result(_summary: &str, _size: usize) {}
