//! Filter builder: hash, sort, delta, encode, prefix the header.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, info};

use gcs_core::error::{Error, Result};
use gcs_core::{FilterInfo, FilterParams, HashMapper, Md5Mapper, HEADER_SIZE};

use crate::bitstream::BitWriter;
use crate::golomb::{GolombEncoder, GolombRice};

/// Single-owner builder for a serialized Golomb-coded set.
///
/// `finish`/`finalize` consume the builder, so a filter can be produced only
/// once and nothing can be added afterwards.
pub struct GcsBuilder<H: HashMapper = Md5Mapper> {
    params: FilterParams,
    mapper: H,
    values: Vec<u64>,
    items_added: u64,
}

impl GcsBuilder<Md5Mapper> {
    /// Create a builder using the MD5 reference mapper
    pub fn new(n: u32, p: u32) -> Result<Self> {
        Ok(Self::with_mapper(FilterParams::new(n, p)?, Md5Mapper))
    }
}

impl<H: HashMapper> GcsBuilder<H> {
    pub fn with_mapper(params: FilterParams, mapper: H) -> Self {
        Self {
            params,
            mapper,
            // sentinel anchoring the first delta
            values: vec![0],
            items_added: 0,
        }
    }

    pub fn add(&mut self, item: impl AsRef<[u8]>) {
        let value = self.mapper.map(item.as_ref(), &self.params);
        self.values.push(value);
        self.items_added += 1;
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Items added so far, duplicates included
    pub fn len(&self) -> usize {
        self.items_added as usize
    }

    pub fn is_empty(&self) -> bool {
        self.items_added == 0
    }

    /// Produce the serialized filter
    pub fn finalize(self) -> Result<Bytes> {
        self.finish().map(|(filter, _)| filter)
    }

    /// Produce the serialized filter along with its build statistics.
    ///
    /// Fails without emitting bytes if the mapper returned a value outside
    /// `[0, N*P)`.
    pub fn finish(mut self) -> Result<(Bytes, FilterInfo)> {
        self.values.sort_unstable();

        let range = self.params.range();
        if let Some(&largest) = self.values.last().filter(|&&v| v >= range) {
            return Err(Error::Internal {
                message: format!(
                    "hash mapper produced {} outside [0, {}) for N={}, P={}",
                    largest,
                    range,
                    self.params.n(),
                    self.params.p()
                ),
            });
        }

        let codec = GolombRice::from_params(&self.params);
        let estimate = self.values.len() * (codec.remainder_bits() as usize + 2) / 8 + 1;
        let mut buffer = BytesMut::with_capacity(HEADER_SIZE + estimate);
        self.params.write_header(&mut (&mut buffer).writer())?;

        let mut encoder = GolombEncoder::with_writer(BitWriter::with_buffer(buffer), codec);
        for pair in self.values.windows(2) {
            let delta = pair[1] - pair[0];
            // equal hashes collapse to one entry, including a hash equal to the sentinel
            if delta == 0 {
                continue;
            }
            encoder.encode(delta)?;
        }

        let encoded_deltas = encoder.count();
        debug!(
            "Encoded {} deltas in {} bits (N={}, P={})",
            encoded_deltas,
            encoder.bits_written(),
            self.params.n(),
            self.params.p()
        );

        let filter = encoder.finish()?;
        let info = FilterInfo::new(
            &self.params,
            self.items_added,
            encoded_deltas,
            (filter.len() - HEADER_SIZE) as u64,
        );

        info!(
            "Finished building filter: {} items, {} distinct values, {} bytes",
            info.items_added, info.encoded_deltas, info.filter_bytes
        );

        Ok((filter, info))
    }
}

impl<H: HashMapper, T: AsRef<[u8]>> Extend<T> for GcsBuilder<H> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }
}
