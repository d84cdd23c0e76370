//! Error type shared by every stage of the OD pipeline.

use thiserror::Error;

use crate::taxonomy::Axis;
use crate::zones::ZoneId;

pub type Result<T> = std::result::Result<T, OdError>;

#[derive(Error, Debug)]
pub enum OdError {
    /// Zone definitions are malformed or contradictory.
    #[error("Config error: {0}")]
    Config(String),

    /// A trip record used a code the classifier does not know.
    #[error("Unknown {axis} code: {code:?}")]
    UnknownCode { axis: Axis, code: String },

    /// A trip record referenced a zone outside the configured universe.
    #[error("Zone {zone} is not in the zone registry")]
    Lookup { zone: ZoneId },

    #[error("Invalid trip record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("Trip count overflow for zone pair {origin} -> {dest}")]
    CountOverflow { origin: ZoneId, dest: ZoneId },

    #[error("Tensor output requires an aggregation built with the time axis")]
    MissingTimeAxis,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
