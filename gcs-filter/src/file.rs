//! Filter persistence. A filter file holds exactly the serialized bytes.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::Bytes;
use tracing::info;

use gcs_core::error::{Error, Result, ResultExt};
use gcs_core::HEADER_SIZE;

use crate::query::GcsQuery;

/// Write a serialized filter to `path`, replacing any existing file
pub fn write_filter(path: impl AsRef<Path>, filter: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    writer.write_all(filter)?;
    writer.flush()?;

    info!("Wrote filter to {:?}: {} bytes", path, filter.len());
    Ok(())
}

/// Read a serialized filter from `path`
pub fn read_filter(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if data.len() < HEADER_SIZE {
        return Err(Error::MalformedFilter {
            message: format!("{} is too small to be a filter", path.display()),
        });
    }
    Ok(Bytes::from(data))
}

impl GcsQuery {
    /// Load a filter file for querying with the MD5 mapper
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        GcsQuery::new(read_filter(path)?)
    }
}
