//! Serialized forms of an [`OdMatrix`].
//!
//! Both encoders walk [`OdMatrix::nonzero_pairs`], so they always agree on
//! which rows exist and in what order.

mod flat;
mod tensor;

pub use flat::{FlatEncoder, flat_header};
pub use tensor::{TensorEncoder, TensorRow};

use std::fmt;
use std::str::FromStr;

use crate::aggregate::OdMatrix;
use crate::error::{OdError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// JSON array of rows with a `[mode][purpose][time]` trips tensor.
    Tensor,
    /// CSV with one column per mode/purpose pair, summed over time.
    Flat,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Tensor, OutputFormat::Flat];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Tensor => "tensor",
            OutputFormat::Flat => "flat",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Tensor => "od.json",
            OutputFormat::Flat => "od.csv",
        }
    }

    pub fn encoder(self) -> Box<dyn MatrixEncoder> {
        match self {
            OutputFormat::Tensor => Box::new(TensorEncoder),
            OutputFormat::Flat => Box::new(FlatEncoder),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = OdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tensor" | "json" => Ok(OutputFormat::Tensor),
            "flat" | "csv" => Ok(OutputFormat::Flat),
            other => Err(OdError::Config(format!("unknown output format {other:?}"))),
        }
    }
}

/// Projects a finished matrix into bytes.
pub trait MatrixEncoder {
    fn format(&self) -> OutputFormat;

    fn encode(&self, matrix: &OdMatrix) -> Result<Vec<u8>>;
}
