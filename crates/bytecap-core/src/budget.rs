//! Byte budget for one encoded image.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Bytes per megabyte as used for budgets (binary megabytes).
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Maximum allowed encoded size in bytes. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ByteBudget(NonZeroU64);

impl ByteBudget {
    pub fn new(max_bytes: u64) -> Result<Self, ConfigError> {
        NonZeroU64::new(max_bytes)
            .map(ByteBudget)
            .ok_or(ConfigError::ZeroBudget)
    }

    /// Budget of `megabytes × 1,048,576` bytes, truncated.
    pub fn from_megabytes(megabytes: f64) -> Result<Self, ConfigError> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(ConfigError::InvalidMegabytes(megabytes));
        }
        let bytes = (megabytes * BYTES_PER_MEGABYTE) as u64;
        Self::new(bytes).map_err(|_| ConfigError::InvalidMegabytes(megabytes))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Whether an encoded candidate of `len` bytes fits.
    #[inline]
    pub fn fits(self, len: usize) -> bool {
        (len as u64) <= self.0.get()
    }
}

impl TryFrom<u64> for ByteBudget {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        ByteBudget::new(value)
    }
}

impl From<ByteBudget> for u64 {
    fn from(budget: ByteBudget) -> Self {
        budget.get()
    }
}

impl std::fmt::Display for ByteBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bytes", self.get())
    }
}
