//! # GCS Filter
//!
//! Builds and queries Golomb-coded sets: compact, immutable filters that
//! answer "is this item probably in the set?" with no false negatives and a
//! false-positive rate of about `1/P`.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Build Path                           │
//! │                                                              │
//! │  items ──> HashMapper ──> sort ──> deltas ──> Golomb-Rice    │
//! │                                                  │           │
//! │                                                  ▼           │
//! │                              header(N, P) + BitWriter bytes  │
//! └──────────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Query Path                           │
//! │                                                              │
//! │  filter ──> header(N, P) ──> BitReader ──> Golomb-Rice       │
//! │                                               │              │
//! │                                               ▼              │
//! │                   running sum vs HashMapper(item): stop at   │
//! │                   the first sum >= target                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod bitstream;
pub mod builder;
pub mod file;
pub mod golomb;
pub mod query;

pub use bitstream::{BitReader, BitWriter, MAX_WIDTH};
pub use builder::GcsBuilder;
pub use file::{read_filter, write_filter};
pub use golomb::{GolombDecoder, GolombEncoder, GolombRice};
pub use query::{GcsQuery, QueryOutcome, QueryTrace};

pub use gcs_core::{Error, FilterInfo, FilterParams, HashMapper, Md5Mapper, Result};

use bytes::Bytes;
use gcs_core::HEADER_SIZE;

/// Build a serialized filter from `items` with the MD5 mapper
pub fn build<I>(items: I, n: u32, p: u32) -> Result<Bytes>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut builder = GcsBuilder::new(n, p)?;
    builder.extend(items);
    builder.finalize()
}

/// Test `item` for membership in a serialized filter.
///
/// Fails only when the header is malformed; a payload that ends early
/// reads as "absent".
pub fn query(filter: &[u8], item: impl AsRef<[u8]>) -> Result<bool> {
    let params = FilterParams::from_header(filter)?;
    let target = Md5Mapper.map(item.as_ref(), &params);
    let codec = GolombRice::from_params(&params);
    Ok(query::scan_payload(&filter[HEADER_SIZE..], codec, target).found())
}
