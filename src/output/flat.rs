use csv::{Terminator, WriterBuilder};
use tracing::debug;

use super::{MatrixEncoder, OutputFormat};
use crate::aggregate::OdMatrix;
use crate::error::{OdError, Result};
use crate::taxonomy::{Mode, Purpose};

const LEADING_COLUMNS: [&str; 4] = ["originZone", "destZone", "originDistrict", "destDistrict"];

/// Header row: the zone/district columns, then `mode_purpose` pairs in
/// taxonomy order.
pub fn flat_header() -> Vec<String> {
    let mut header: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for mode in Mode::ALL {
        for purpose in Purpose::ALL {
            header.push(format!("{}_{}", mode.name(), purpose.name()));
        }
    }
    header
}

/// CSV with time-of-day summed away.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatEncoder;

impl MatrixEncoder for FlatEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Flat
    }

    fn encode(&self, matrix: &OdMatrix) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(flat_header())?;

        let mut rows = 0usize;
        for pair in matrix.nonzero_pairs() {
            let mut record = vec![
                pair.origin.id.to_string(),
                pair.dest.id.to_string(),
                pair.origin.district.to_string(),
                pair.dest.district.to_string(),
            ];
            for mode in Mode::ALL {
                for purpose in Purpose::ALL {
                    record.push(pair.cells.marginal(mode, purpose).to_string());
                }
            }
            writer.write_record(&record)?;
            rows += 1;
        }
        debug!(rows, "Encoding flat rows");

        writer
            .into_inner()
            .map_err(|e| OdError::Io(e.into_error()))
    }
}
