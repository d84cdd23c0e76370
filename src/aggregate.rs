//! Dense OD trip counts.
//!
//! Every (origin, destination) pair owns a contiguous block of
//! `MODES * PURPOSES * time_bins` cells laid out `[mode][purpose][time]`.
//! Pairs are stored origin-major in zone registry order, so walking the
//! buffer front to back is the output order.

use tracing::{debug, info};

use crate::classifier;
use crate::error::{OdError, Result};
use crate::taxonomy::{Mode, Purpose, TimePeriod};
use crate::trips::TripRecord;
use crate::zones::{Zone, ZoneId, ZoneRegistry};

pub const MODES: usize = Mode::ALL.len();
pub const PURPOSES: usize = Purpose::ALL.len();
pub const TIME_PERIODS: usize = TimePeriod::ALL.len();

#[derive(Debug)]
pub struct OdMatrix {
    registry: ZoneRegistry,
    time_bins: usize,
    cells: Vec<u64>,
    records: u64,
}

impl OdMatrix {
    /// Allocates a zeroed cell for every pair, mode, purpose and time period.
    pub fn new(registry: ZoneRegistry) -> Self {
        Self::with_time_bins(registry, TIME_PERIODS)
    }

    /// Like [`OdMatrix::new`] but with a single time bin; trip time codes
    /// become optional.
    pub fn without_time(registry: ZoneRegistry) -> Self {
        Self::with_time_bins(registry, 1)
    }

    fn with_time_bins(registry: ZoneRegistry, time_bins: usize) -> Self {
        let n = registry.len();
        let len = n * n * MODES * PURPOSES * time_bins;
        debug!(zones = n, time_bins, cells = len, "Allocating OD matrix");

        Self {
            registry,
            time_bins,
            cells: vec![0; len],
            records: 0,
        }
    }

    pub fn has_time_axis(&self) -> bool {
        self.time_bins == TIME_PERIODS
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Number of trip records accumulated so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    fn row_len(&self) -> usize {
        MODES * PURPOSES * self.time_bins
    }

    fn row_offset(&self, origin_idx: usize, dest_idx: usize) -> usize {
        (origin_idx * self.registry.len() + dest_idx) * self.row_len()
    }

    /// Counts one trip. Any unknown zone or code aborts with an error and
    /// leaves the counts untouched.
    pub fn record(&mut self, trip: &TripRecord) -> Result<()> {
        let origin_idx = self.registry.index_of(trip.origin)?;
        let dest_idx = self.registry.index_of(trip.dest)?;
        let mode = classifier::mode(&trip.mode)?;
        let purpose = classifier::purpose(&trip.purpose)?;

        let time_idx = match (self.has_time_axis(), trip.time.as_deref()) {
            (true, Some(code)) => classifier::time_period(code)?.index(),
            (true, None) => {
                return Err(OdError::InvalidRecord {
                    line: trip.line,
                    reason: "missing Time code".to_string(),
                });
            }
            // still validated so a schema mismatch is not hidden
            (false, Some(code)) => {
                classifier::time_period(code)?;
                0
            }
            (false, None) => 0,
        };

        let offset = self.row_offset(origin_idx, dest_idx)
            + (mode.index() * PURPOSES + purpose.index()) * self.time_bins
            + time_idx;

        let cell = &mut self.cells[offset];
        *cell = cell.checked_add(1).ok_or(OdError::CountOverflow {
            origin: trip.origin,
            dest: trip.dest,
        })?;
        self.records += 1;

        Ok(())
    }

    /// Counts every trip in `trips`, stopping at the first error.
    #[tracing::instrument(skip_all)]
    pub fn record_all<I>(&mut self, trips: I) -> Result<u64>
    where
        I: IntoIterator<Item = Result<TripRecord>>,
    {
        let before = self.records;
        for trip in trips {
            self.record(&trip?)?;
        }
        let added = self.records - before;
        info!(records = added, "Trips aggregated");
        Ok(added)
    }

    pub fn cells_for(&self, origin: ZoneId, dest: ZoneId) -> Result<PairCells<'_>> {
        let origin_idx = self.registry.index_of(origin)?;
        let dest_idx = self.registry.index_of(dest)?;
        Ok(self.pair_at(origin_idx, dest_idx))
    }

    fn pair_at(&self, origin_idx: usize, dest_idx: usize) -> PairCells<'_> {
        let start = self.row_offset(origin_idx, dest_idx);
        PairCells {
            cells: &self.cells[start..start + self.row_len()],
            time_bins: self.time_bins,
        }
    }

    pub fn has_any_nonzero(row: &PairCells<'_>) -> bool {
        row.has_any_nonzero()
    }

    /// Pairs with at least one trip, origin-major in registry order.
    pub fn nonzero_pairs(&self) -> impl Iterator<Item = OdPair<'_>> + '_ {
        let zones = self.registry.zones();
        zones
            .iter()
            .enumerate()
            .flat_map(move |(oi, origin)| {
                zones.iter().enumerate().map(move |(di, dest)| OdPair {
                    origin: *origin,
                    dest: *dest,
                    cells: self.pair_at(oi, di),
                })
            })
            .filter(|pair| Self::has_any_nonzero(&pair.cells))
    }
}

/// All cells of one zone pair.
#[derive(Debug, Clone, Copy)]
pub struct PairCells<'a> {
    cells: &'a [u64],
    time_bins: usize,
}

impl<'a> PairCells<'a> {
    /// Counts for (mode, purpose) across the time bins.
    pub fn by_time(&self, mode: Mode, purpose: Purpose) -> &'a [u64] {
        let cells: &'a [u64] = self.cells;
        let start = (mode.index() * PURPOSES + purpose.index()) * self.time_bins;
        &cells[start..start + self.time_bins]
    }

    /// Count for one cell, or `None` when the matrix has no time axis.
    pub fn get(&self, mode: Mode, purpose: Purpose, time: TimePeriod) -> Option<u64> {
        if self.time_bins != TIME_PERIODS {
            return None;
        }
        Some(self.by_time(mode, purpose)[time.index()])
    }

    /// Count for (mode, purpose) summed over all time periods.
    pub fn marginal(&self, mode: Mode, purpose: Purpose) -> u64 {
        self.by_time(mode, purpose).iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn has_any_nonzero(&self) -> bool {
        self.cells.iter().any(|&c| c != 0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OdPair<'a> {
    pub origin: Zone,
    pub dest: Zone,
    pub cells: PairCells<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Axis;

    fn registry() -> ZoneRegistry {
        ZoneRegistry::load("TAZ,District\n101,9\n102,9\n103,4\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_new_matrix_is_all_zero() {
        let m = OdMatrix::new(registry());
        assert_eq!(m.cells.len(), 3 * 3 * MODES * PURPOSES * TIME_PERIODS);
        assert_eq!(m.nonzero_pairs().count(), 0);
        assert_eq!(m.records(), 0);
    }

    #[test]
    fn test_record_increments_single_cell() {
        let mut m = OdMatrix::new(registry());
        m.record(&TripRecord::new(101, 102, "SOV", "W", "21")).unwrap();

        let row = m.cells_for(101, 102).unwrap();
        assert_eq!(row.get(Mode::Auto, Purpose::Work, TimePeriod::AmRush), Some(1));
        assert_eq!(row.total(), 1);
        assert!(!m.cells_for(102, 101).unwrap().has_any_nonzero());
    }

    #[test]
    fn test_codes_sharing_a_category_accumulate() {
        let mut m = OdMatrix::new(registry());
        for code in ["41", "42", "43"] {
            m.record(&TripRecord::new(103, 101, "WAT", "C", code)).unwrap();
        }
        m.record(&TripRecord::new(103, 101, "PNR", "L", "42")).unwrap();

        let row = m.cells_for(103, 101).unwrap();
        assert_eq!(
            row.get(Mode::Transit, Purpose::Other, TimePeriod::PmRush),
            Some(4)
        );
        assert_eq!(m.records(), 4);
    }

    #[test]
    fn test_unknown_origin_is_lookup_error() {
        let mut m = OdMatrix::new(registry());
        let err = m
            .record(&TripRecord::new(999, 102, "SOV", "W", "21"))
            .unwrap_err();
        assert!(matches!(err, OdError::Lookup { zone: 999 }));
        assert_eq!(m.records(), 0);
    }

    #[test]
    fn test_unknown_destination_is_lookup_error() {
        let mut m = OdMatrix::new(registry());
        let err = m
            .record(&TripRecord::new(101, 7, "SOV", "W", "21"))
            .unwrap_err();
        assert!(matches!(err, OdError::Lookup { zone: 7 }));
    }

    #[test]
    fn test_unknown_code_leaves_counts_untouched() {
        let mut m = OdMatrix::new(registry());
        let err = m
            .record(&TripRecord::new(101, 102, "SOV", "W", "99"))
            .unwrap_err();
        assert!(matches!(
            err,
            OdError::UnknownCode {
                axis: Axis::Time,
                ..
            }
        ));
        assert_eq!(m.nonzero_pairs().count(), 0);
    }

    #[test]
    fn test_missing_time_requires_time_less_matrix() {
        let mut trip = TripRecord::new(101, 102, "Walk", "S", "1");
        trip.time = None;

        let mut timed = OdMatrix::new(registry());
        assert!(matches!(
            timed.record(&trip),
            Err(OdError::InvalidRecord { .. })
        ));

        let mut flat = OdMatrix::without_time(registry());
        flat.record(&trip).unwrap();
        let row = flat.cells_for(101, 102).unwrap();
        assert_eq!(row.marginal(Mode::Active, Purpose::School), 1);
        assert_eq!(row.get(Mode::Active, Purpose::School, TimePeriod::Early), None);
    }

    #[test]
    fn test_time_less_matrix_still_rejects_unknown_time_code() {
        let mut m = OdMatrix::without_time(registry());
        assert!(m.record(&TripRecord::new(101, 102, "SOV", "W", "7")).is_err());
    }

    #[test]
    fn test_marginal_sums_over_time() {
        let mut m = OdMatrix::new(registry());
        for code in ["1", "3", "5", "6", "6"] {
            m.record(&TripRecord::new(101, 103, "HOV2", "H", code)).unwrap();
        }
        let row = m.cells_for(101, 103).unwrap();
        assert_eq!(row.marginal(Mode::Auto, Purpose::Shop), 5);
        assert_eq!(row.by_time(Mode::Auto, Purpose::Shop), &[1, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_nonzero_pairs_follow_registry_order() {
        let mut m = OdMatrix::new(registry());
        m.record(&TripRecord::new(103, 101, "SOV", "O", "3")).unwrap();
        m.record(&TripRecord::new(101, 103, "SOV", "O", "3")).unwrap();
        m.record(&TripRecord::new(101, 102, "SOV", "O", "3")).unwrap();
        m.record(&TripRecord::new(101, 102, "Bike", "R", "5")).unwrap();

        let pairs: Vec<_> = m
            .nonzero_pairs()
            .map(|p| (p.origin.id, p.dest.id, p.cells.total()))
            .collect();
        assert_eq!(pairs, vec![(101, 102, 2), (101, 103, 1), (103, 101, 1)]);
    }

    #[test]
    fn test_cell_overflow_is_an_error() {
        let mut m = OdMatrix::new(registry());
        let trip = TripRecord::new(101, 101, "SOV", "O", "1");
        m.record(&trip).unwrap();
        let offset = m.row_offset(0, 0);
        m.cells[offset] = u64::MAX;

        assert!(matches!(
            m.record(&trip),
            Err(OdError::CountOverflow {
                origin: 101,
                dest: 101
            })
        ));
    }

    #[test]
    fn test_record_all_stops_at_first_error() {
        let mut m = OdMatrix::new(registry());
        let trips = vec![
            Ok(TripRecord::new(101, 102, "SOV", "W", "21")),
            Ok(TripRecord::new(101, 102, "Skate", "W", "21")),
            Ok(TripRecord::new(101, 102, "SOV", "W", "21")),
        ];
        assert!(m.record_all(trips).is_err());
        assert_eq!(m.records(), 1);
    }
}
