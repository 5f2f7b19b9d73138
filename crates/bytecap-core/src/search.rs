//! Quality binary search under a byte budget.
//!
//! [`search_quality`] finds the highest quality in an inclusive range whose
//! encoded size fits the budget, using O(log(range)) encodes.
//!
//! # Precondition
//!
//! For the encode closure, output size must be non-decreasing in quality.
//! This holds for the JPEG and WebP encoders with fixed structural
//! parameters, but it is not checked. If an encoder violates it the returned
//! candidate still fits the budget, but a higher fitting quality may exist.

use crate::budget::ByteBudget;
use crate::compress::StrategyFailure;
use crate::encode::EncodeError;
use crate::strategy::QualityRange;

/// The best candidate a search found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityFit {
    pub bytes: Vec<u8>,
    pub quality: u8,
    /// Number of encodes the search performed.
    pub probes: u32,
}

/// Search `range` for the highest quality whose encoding fits `budget`.
///
/// # Errors
///
/// - `StrategyFailure::Exhausted` if even the lowest quality is too large;
///   carries the smallest size observed.
/// - `StrategyFailure::Unsupported` / `StrategyFailure::Encode` if the
///   closure fails; the search stops at the first error.
pub fn search_quality<F>(
    range: QualityRange,
    budget: ByteBudget,
    mut encode: F,
) -> Result<QualityFit, StrategyFailure>
where
    F: FnMut(u8) -> Result<Vec<u8>, EncodeError>,
{
    // i16 so `mid - 1` cannot underflow when lo is 1
    let mut lo = i16::from(range.lo());
    let mut hi = i16::from(range.hi());
    let mut best: Option<(Vec<u8>, u8)> = None;
    let mut smallest: Option<usize> = None;
    let mut probes = 0u32;

    while lo <= hi {
        let mid = (lo + hi) / 2;
        let quality = mid as u8;
        let data = encode(quality).map_err(StrategyFailure::from)?;
        probes += 1;

        let fits = budget.fits(data.len());
        tracing::trace!(quality, size = data.len(), fits, "quality probe");

        if fits {
            best = Some((data, quality));
            lo = mid + 1;
        } else {
            smallest = Some(smallest.map_or(data.len(), |s| s.min(data.len())));
            hi = mid - 1;
        }
    }

    match best {
        Some((bytes, quality)) => Ok(QualityFit {
            bytes,
            quality,
            probes,
        }),
        None => Err(StrategyFailure::Exhausted { smallest }),
    }
}
