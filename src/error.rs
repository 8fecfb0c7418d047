//! Error types surfaced by the engine.
//!
//! Unknown cities, jurisdictions and fuel labels are never errors: they
//! degrade to documented defaults inside the engine.  Only a malformed
//! ex-showroom price or an unusable tariff file reaches the caller.

use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Rejection of an ex-showroom price at the engine boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("ex-showroom price must not be negative, got {0}")]
    Negative(Decimal),

    #[error("ex-showroom price must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("ex-showroom price {0} is outside the supported range")]
    OutOfRange(f64),

    #[error("ex-showroom price {0} exceeds the supported maximum of {1}")]
    ExceedsCeiling(Decimal, Decimal),
}

/// Failure to load or validate a tariff table.
#[derive(Debug, Error)]
pub enum TariffError {
    #[error("failed to read tariff file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tariff data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("default jurisdiction {0} is missing from the tariff table")]
    MissingDefault(String),

    #[error("negative tariff entry for {jurisdiction} / {fuel} band {band}")]
    NegativeEntry {
        jurisdiction: String,
        fuel: String,
        band: usize,
    },

    #[error("tariff entry for {jurisdiction} / {fuel} band {band} exceeds {max}")]
    OversizedEntry {
        jurisdiction: String,
        fuel: String,
        band: usize,
        max: Decimal,
    },
}
