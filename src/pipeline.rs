//! End-to-end run: zones + trips in, OD artifacts out.
//!
//! Everything is encoded and compressed in memory before the first file is
//! touched, and files are staged under a temporary name and renamed only once
//! all of them are written. A failed run leaves no artifacts behind.

use flate2::Compression;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::aggregate::OdMatrix;
use crate::compress::gzip;
use crate::config::RunConfig;
use crate::error::Result;
use crate::output::OutputFormat;
use crate::trips::TripReader;
use crate::zones::ZoneRegistry;

/// One encoded output, raw and gzipped.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub compressed: Vec<u8>,
}

impl Artifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn compressed_file_name(&self) -> String {
        format!("{}.gz", self.format.file_name())
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub zones: usize,
    pub records: u64,
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

/// Builds the matrix from a trips CSV. The time axis is kept only when
/// `with_time` is set.
pub fn aggregate_trips<R: Read>(
    registry: ZoneRegistry,
    trips: R,
    with_time: bool,
) -> Result<OdMatrix> {
    let mut matrix = if with_time {
        OdMatrix::new(registry)
    } else {
        OdMatrix::without_time(registry)
    };
    let mut reader = TripReader::new(trips);
    matrix.record_all(reader.records()?)?;
    Ok(matrix)
}

pub fn encode_artifacts(
    matrix: &OdMatrix,
    formats: &[OutputFormat],
    level: Compression,
) -> Result<Vec<Artifact>> {
    formats
        .iter()
        .map(|format| -> Result<Artifact> {
            let bytes = format.encoder().encode(matrix)?;
            let compressed = gzip(&bytes, level)?;
            info!(
                format = %format,
                bytes = bytes.len(),
                compressed = compressed.len(),
                "Artifact encoded"
            );
            Ok(Artifact {
                format: *format,
                bytes,
                compressed,
            })
        })
        .collect()
}

/// Writes every artifact (raw and `.gz`) into `dir`, all or nothing.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut planned = Vec::new();
    for artifact in artifacts {
        planned.push((dir.join(artifact.file_name()), artifact.bytes.as_slice()));
        planned.push((
            dir.join(artifact.compressed_file_name()),
            artifact.compressed.as_slice(),
        ));
    }

    let mut staged = Vec::new();
    for (path, bytes) in &planned {
        let tmp = staging_path(path);
        if let Err(e) = fs::write(&tmp, bytes) {
            warn!(path = %tmp.display(), error = %e, "Staging failed, discarding run output");
            discard(std::slice::from_ref(&tmp));
            discard(&staged);
            return Err(e.into());
        }
        staged.push(tmp);
    }

    let mut written = Vec::new();
    for (i, ((path, _), tmp)) in planned.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            warn!(path = %path.display(), error = %e, "Rename failed, discarding run output");
            discard(&written);
            discard(&staged[i..]);
            return Err(e.into());
        }
        debug!(path = %path.display(), "Artifact written");
        written.push(path.clone());
    }

    Ok(written)
}

/// Best-effort removal; the original error is what gets reported.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Loads zones, aggregates `trips_path`, and writes every configured format.
#[tracing::instrument(skip_all, fields(trips = %trips_path.display()))]
pub fn run(config: &RunConfig, trips_path: &Path) -> Result<RunSummary> {
    let registry = ZoneRegistry::from_path(&config.zone_defs)?;
    let zones = registry.len();
    info!(zones, zone_defs = %config.zone_defs.display(), "Zone registry loaded");

    let trips = fs::File::open(trips_path)?;
    let matrix = aggregate_trips(registry, trips, config.needs_time_axis())?;
    let records = matrix.records();
    let rows = matrix.nonzero_pairs().count();
    info!(records, rows, "OD matrix built");

    let artifacts = encode_artifacts(&matrix, &config.formats, config.gzip_level)?;
    drop(matrix);

    let files = write_artifacts(&config.output_dir, &artifacts)?;

    Ok(RunSummary {
        zones,
        records,
        rows,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("od_matrix_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn registry() -> ZoneRegistry {
        ZoneRegistry::load("TAZ,District\n101,9\n102,9\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_aggregate_trips_from_csv() {
        let trips = "I,J,Mode,DPurp,Time\n101,102,SOV,W,21\n101,102,HOV3,W,23\n";
        let m = aggregate_trips(registry(), trips.as_bytes(), true).unwrap();
        assert_eq!(m.records(), 2);
        assert_eq!(m.nonzero_pairs().count(), 1);
    }

    #[test]
    fn test_encode_artifacts_in_requested_order() {
        let m = aggregate_trips(
            registry(),
            "I,J,Mode,DPurp,Time\n102,101,WAT,S,1\n".as_bytes(),
            true,
        )
        .unwrap();
        let artifacts =
            encode_artifacts(&m, &[OutputFormat::Flat, OutputFormat::Tensor], Compression::fast())
                .unwrap();
        assert_eq!(artifacts[0].format, OutputFormat::Flat);
        assert_eq!(artifacts[1].file_name(), "od.json");
        assert_eq!(artifacts[1].compressed_file_name(), "od.json.gz");
    }

    #[test]
    fn test_write_artifacts_leaves_no_staging_files() {
        let dir = temp_dir("write");
        let artifact = Artifact {
            format: OutputFormat::Flat,
            bytes: b"a\n".to_vec(),
            compressed: gzip(b"a\n", Compression::default()).unwrap(),
        };
        let files = write_artifacts(&dir, &[artifact]).unwrap();
        assert_eq!(files.len(), 2);

        let mut names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["od.csv", "od.csv.gz"]);
        assert_eq!(fs::read(dir.join("od.csv")).unwrap(), b"a\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_rename_removes_every_artifact() {
        let dir = temp_dir("rename_fail");
        // a non-empty directory where od.csv.gz should land makes that rename fail
        fs::create_dir_all(dir.join("od.csv.gz")).unwrap();
        fs::write(dir.join("od.csv.gz").join("keep"), b"x").unwrap();

        let artifact = Artifact {
            format: OutputFormat::Flat,
            bytes: b"a\n".to_vec(),
            compressed: gzip(b"a\n", Compression::default()).unwrap(),
        };
        assert!(write_artifacts(&dir, &[artifact]).is_err());

        let mut names: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["od.csv.gz"]);
        assert!(!dir.join("od.csv").exists());
        assert!(dir.join("od.csv.gz").is_dir());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_staging_path_appends_suffix() {
        assert_eq!(
            staging_path(Path::new("out/od.json.gz")),
            PathBuf::from("out/od.json.gz.tmp")
        );
    }
}
