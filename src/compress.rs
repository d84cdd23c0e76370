//! Gzip compression of serialized artifacts.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

use crate::error::Result;

pub fn gzip(bytes: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), level);
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
