//! Run configuration, read from the environment (and `.env` via dotenvy).
//!
//! | Variable        | Default               |
//! |-----------------|-----------------------|
//! | `OD_ZONE_DEFS`  | `config/ZoneDefs.csv` |
//! | `OD_OUTPUT_DIR` | `output`              |
//! | `OD_FORMATS`    | `tensor,flat`         |
//! | `OD_GZIP_LEVEL` | flate2 default (6)    |

use flate2::Compression;
use std::path::PathBuf;

use crate::error::{OdError, Result};
use crate::output::OutputFormat;

pub const DEFAULT_ZONE_DEFS: &str = "config/ZoneDefs.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub zone_defs: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub gzip_level: Compression,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            zone_defs: PathBuf::from(DEFAULT_ZONE_DEFS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: OutputFormat::ALL.to_vec(),
            gzip_level: Compression::default(),
        }
    }
}

impl RunConfig {
    pub fn new(zone_defs: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            zone_defs: zone_defs.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("OD_ZONE_DEFS") {
            config.zone_defs = PathBuf::from(path);
        }
        if let Some(dir) = lookup("OD_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(list) = lookup("OD_FORMATS") {
            config.formats = parse_formats(&list)?;
        }
        if let Some(level) = lookup("OD_GZIP_LEVEL") {
            let level: u32 = level
                .trim()
                .parse()
                .ok()
                .filter(|l| *l <= 9)
                .ok_or_else(|| OdError::Config(format!("OD_GZIP_LEVEL must be 0-9, got {level:?}")))?;
            config.gzip_level = Compression::new(level);
        }

        Ok(config)
    }

    /// Tensor output needs per-trip time codes.
    pub fn needs_time_axis(&self) -> bool {
        self.formats.contains(&OutputFormat::Tensor)
    }
}

fn parse_formats(list: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for name in list.split(',').filter(|s| !s.trim().is_empty()) {
        let format: OutputFormat = name.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(OdError::Config("OD_FORMATS names no output format".to_string()));
    }
    Ok(formats)
}
