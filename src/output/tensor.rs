use serde::Serialize;
use tracing::debug;

use super::{MatrixEncoder, OutputFormat};
use crate::aggregate::{OdMatrix, OdPair};
use crate::error::{OdError, Result};
use crate::taxonomy::{Mode, Purpose};
use crate::zones::{DistrictId, ZoneId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorRow {
    pub origin_zone: ZoneId,
    pub dest_zone: ZoneId,
    pub origin_district: DistrictId,
    pub dest_district: DistrictId,
    /// `[mode][purpose][time]`
    pub trips: Vec<Vec<Vec<u64>>>,
}

impl TensorRow {
    fn from_pair(pair: &OdPair<'_>) -> Self {
        let trips = Mode::ALL
            .iter()
            .map(|&mode| {
                Purpose::ALL
                    .iter()
                    .map(|&purpose| pair.cells.by_time(mode, purpose).to_vec())
                    .collect()
            })
            .collect();

        Self {
            origin_zone: pair.origin.id,
            dest_zone: pair.dest.id,
            origin_district: pair.origin.district,
            dest_district: pair.dest.district,
            trips,
        }
    }
}

/// Compact JSON array of [`TensorRow`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TensorEncoder;

impl TensorEncoder {
    pub fn rows(matrix: &OdMatrix) -> Result<Vec<TensorRow>> {
        if !matrix.has_time_axis() {
            return Err(OdError::MissingTimeAxis);
        }
        Ok(matrix.nonzero_pairs().map(|p| TensorRow::from_pair(&p)).collect())
    }
}

impl MatrixEncoder for TensorEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Tensor
    }

    fn encode(&self, matrix: &OdMatrix) -> Result<Vec<u8>> {
        let rows = Self::rows(matrix)?;
        debug!(rows = rows.len(), "Encoding tensor rows");
        Ok(serde_json::to_vec(&rows)?)
    }
}
