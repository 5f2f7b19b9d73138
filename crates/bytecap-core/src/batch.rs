//! In-memory batch helper.
//!
//! Compresses many named inputs with one budget and one set of options.
//! Each item is independent: a corrupt file or an unattainable budget is
//! recorded for that item and the batch moves on. Reading and writing files
//! is left to the caller; [`output_file_name`] tells it what to call each
//! output.

use std::path::Path;

use crate::budget::ByteBudget;
use crate::compress::{compress, CompressError, EncodingResult};
use crate::config::CompressOptions;
use crate::decode::ImageKind;
use crate::strategy::EncodingStrategy;

/// A successfully compressed item.
#[derive(Debug, Clone)]
pub struct CompressedFile {
    /// Name to write the output under; the extension follows the codec used.
    pub output_name: String,
    pub result: EncodingResult,
}

/// Outcome for one batch item.
#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub outcome: Result<CompressedFile, CompressError>,
}

/// Outcomes for a whole batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

/// Counts of how a batch went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Already within budget and passed through untouched.
    pub unchanged: usize,
    pub recompressed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.unchanged + self.recompressed + self.failed
    }
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for item in &self.items {
            match &item.outcome {
                Ok(file) if file.result.is_unchanged() => summary.unchanged += 1,
                Ok(_) => summary.recompressed += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &CompressedFile)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().ok().map(|f| (item.name.as_str(), f)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &CompressError)> {
        self.items
            .iter()
            .filter_map(|item| item.outcome.as_ref().err().map(|e| (item.name.as_str(), e)))
    }
}

/// Compress every `(name, bytes)` pair, isolating failures per item.
pub fn compress_batch<I, N, B>(items: I, budget: ByteBudget, options: &CompressOptions) -> BatchReport
where
    I: IntoIterator<Item = (N, B)>,
    N: Into<String>,
    B: AsRef<[u8]>,
{
    let items = items
        .into_iter()
        .map(|(name, bytes)| {
            let name = name.into();
            let outcome = compress(bytes.as_ref(), budget, options).map(|result| CompressedFile {
                output_name: output_file_name(&name, &result),
                result,
            });

            match &outcome {
                Ok(file) => tracing::info!(
                    name = %name,
                    output = %file.output_name,
                    size = file.result.len(),
                    summary = %file.result.describe(),
                    "compressed"
                ),
                Err(err) => tracing::warn!(name = %name, error = %err, "skipped"),
            }

            BatchItem { name, outcome }
        })
        .collect();

    BatchReport { items }
}

/// Name for the output of `name` encoded as `result`.
///
/// Keeps `name` when the output container matches what its extension
/// already says (unchanged copies, lossless PNG of a `.png`); otherwise the
/// extension is replaced with the codec's, e.g. `photo.png` → `photo.jpg`.
pub fn output_file_name(name: &str, result: &EncodingResult) -> String {
    let path = Path::new(name);
    let current = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageKind::from_extension);

    let keep = matches!(result.strategy, EncodingStrategy::KeepOriginal { .. })
        || current == Some(result.format());
    if keep {
        return name.to_string();
    }

    path.with_extension(result.extension())
        .to_string_lossy()
        .into_owned()
}
