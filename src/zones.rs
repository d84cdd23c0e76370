//! Zone registry: the ordered zone universe and its zone → district map.

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{OdError, Result};

pub type ZoneId = u32;
pub type DistrictId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    pub district: DistrictId,
}

#[derive(Debug, Deserialize)]
struct ZoneDefRow {
    #[serde(rename = "TAZ")]
    taz: ZoneId,
    #[serde(rename = "District")]
    district: DistrictId,
}

#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    index: HashMap<ZoneId, usize>,
}

impl ZoneRegistry {
    /// Opens and loads a zone definition CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            OdError::Config(format!("cannot open zone definitions {}: {e}", path.display()))
        })?;
        Self::load(file)
    }

    /// Reads `TAZ`/`District` rows. Zone order follows input order; a zone
    /// repeated with the same district keeps its first position.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);
        let mut zones = Vec::new();
        let mut index = HashMap::new();

        for result in rdr.deserialize() {
            let row: ZoneDefRow =
                result.map_err(|e| OdError::Config(format!("bad zone definition: {e}")))?;

            match index.get(&row.taz).copied() {
                Some(i) => {
                    let existing: &Zone = &zones[i];
                    if existing.district != row.district {
                        return Err(OdError::Config(format!(
                            "zone {} assigned to districts {} and {}",
                            row.taz, existing.district, row.district
                        )));
                    }
                    debug!(zone = row.taz, "Duplicate zone definition ignored");
                }
                None => {
                    index.insert(row.taz, zones.len());
                    zones.push(Zone {
                        id: row.taz,
                        district: row.district,
                    });
                }
            }
        }

        if zones.is_empty() {
            return Err(OdError::Config("zone definitions are empty".to_string()));
        }

        Ok(Self { zones, index })
    }

    pub fn district_of(&self, zone: ZoneId) -> Result<DistrictId> {
        self.index_of(zone).map(|i| self.zones[i].district)
    }

    /// Position of `zone` in the universe.
    pub fn index_of(&self, zone: ZoneId) -> Result<usize> {
        self.index
            .get(&zone)
            .copied()
            .ok_or(OdError::Lookup { zone })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
