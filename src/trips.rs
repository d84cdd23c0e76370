//! Trip record input.

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;

use crate::error::{OdError, Result};
use crate::zones::ZoneId;

/// One surveyed trip, as found in the trips CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TripRecord {
    #[serde(rename = "I")]
    pub origin: ZoneId,
    #[serde(rename = "J")]
    pub dest: ZoneId,
    #[serde(rename = "Mode")]
    pub mode: String,
    #[serde(rename = "DPurp")]
    pub purpose: String,
    /// Only required when the aggregation keeps the time axis.
    #[serde(rename = "Time", default)]
    pub time: Option<String>,

    /// Source line, filled in by [`TripReader`].
    #[serde(skip)]
    pub line: u64,
}

impl TripRecord {
    pub fn new(origin: ZoneId, dest: ZoneId, mode: &str, purpose: &str, time: &str) -> Self {
        Self {
            origin,
            dest,
            mode: mode.to_string(),
            purpose: purpose.to_string(),
            time: Some(time.to_string()),
            line: 0,
        }
    }
}

pub struct TripReader<R: Read> {
    inner: csv::Reader<R>,
}

impl<R: Read> TripReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: ReaderBuilder::new().trim(Trim::Fields).from_reader(reader),
        }
    }

    /// Iterates trip rows. Malformed rows surface as [`OdError::InvalidRecord`].
    pub fn records(&mut self) -> Result<impl Iterator<Item = Result<TripRecord>> + '_> {
        let headers = self.inner.headers()?.clone();

        Ok(self
            .inner
            .records()
            .map(move |result| -> Result<TripRecord> {
                let record = result?;
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                let mut trip: TripRecord =
                    record
                        .deserialize(Some(&headers))
                        .map_err(|e| OdError::InvalidRecord {
                            line,
                            reason: e.to_string(),
                        })?;
                trip.line = line;
                Ok(trip)
            }))
    }
}
