//! Membership queries against a serialized filter.
//!
//! A query walks the delta stream from the start, keeping a running sum of
//! the decoded deltas. Values are strictly increasing, so the scan stops at
//! the first sum that reaches or passes the target hash.
//!
//! ```text
//! SCANNING ──sum == h──> FOUND
//!     │
//!     ├──sum > h───────> NOT_FOUND (overshot)
//!     └──end of data───> NOT_FOUND (exhausted)
//! ```

use bytes::Bytes;
use tracing::debug;

use gcs_core::error::Result;
use gcs_core::{FilterParams, HashMapper, Md5Mapper, HEADER_SIZE};

use crate::golomb::{GolombDecoder, GolombRice};

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Found,
    /// The running sum passed the target
    Overshot,
    /// The payload ran out first
    Exhausted,
}

/// Result of a query with the amount of work it took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTrace {
    pub target: u64,
    pub outcome: QueryOutcome,
    pub deltas_consumed: u64,
}

impl QueryTrace {
    pub fn found(&self) -> bool {
        self.outcome == QueryOutcome::Found
    }
}

/// Read-only view of a serialized filter.
///
/// Holds no cursor state, so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct GcsQuery<H: HashMapper = Md5Mapper> {
    params: FilterParams,
    codec: GolombRice,
    filter: Bytes,
    mapper: H,
}

impl GcsQuery<Md5Mapper> {
    /// Parse the header of `filter` and prepare it for queries
    pub fn new(filter: impl Into<Bytes>) -> Result<Self> {
        Self::with_mapper(filter, Md5Mapper)
    }
}

impl<H: HashMapper> GcsQuery<H> {
    pub fn with_mapper(filter: impl Into<Bytes>, mapper: H) -> Result<Self> {
        let filter = filter.into();
        let params = FilterParams::from_header(&filter)?;
        debug!(
            "Opened filter: N={}, P={}, {} payload bytes",
            params.n(),
            params.p(),
            filter.len() - HEADER_SIZE
        );

        Ok(Self {
            params,
            codec: GolombRice::from_params(&params),
            filter,
            mapper,
        })
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// The complete serialized filter, header included
    pub fn as_bytes(&self) -> &Bytes {
        &self.filter
    }

    /// The encoded deltas following the header
    pub fn payload(&self) -> &[u8] {
        &self.filter[HEADER_SIZE..]
    }

    /// `true` if `item` is probably in the set, `false` if it is definitely not
    pub fn query(&self, item: impl AsRef<[u8]>) -> bool {
        self.query_traced(item).found()
    }

    pub fn query_traced(&self, item: impl AsRef<[u8]>) -> QueryTrace {
        let target = self.mapper.map(item.as_ref(), &self.params);
        self.scan(target)
    }

    /// Look up an already-mapped value in `[0, N*P)`
    pub fn contains_hash(&self, target: u64) -> bool {
        self.scan(target).found()
    }

    pub fn scan(&self, target: u64) -> QueryTrace {
        scan_payload(self.payload(), self.codec, target)
    }

    /// Decode every value stored in the filter, in ascending order
    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        GolombDecoder::new(self.payload(), self.codec)
            .take_while(|&delta| delta != 0)
            .scan(0u64, |sum, delta| {
                *sum = sum.saturating_add(delta);
                Some(*sum)
            })
    }
}

/// Walk the encoded deltas in `payload` until the running sum reaches `target`
pub(crate) fn scan_payload(payload: &[u8], codec: GolombRice, target: u64) -> QueryTrace {
    let trace = |outcome, deltas_consumed| QueryTrace {
        target,
        outcome,
        deltas_consumed,
    };

    // the sentinel is always a member: a hash of 0 collapsed into it
    if target == 0 {
        return trace(QueryOutcome::Found, 0);
    }

    let mut decoder = GolombDecoder::new(payload, codec);
    let mut sum = 0u64;
    loop {
        let delta = match decoder.next_value() {
            Ok(delta) => delta,
            Err(e) => {
                if !e.is_recoverable() {
                    debug!("Treating undecodable filter data as absent: {}", e);
                }
                return trace(QueryOutcome::Exhausted, decoder.decoded());
            }
        };

        // zero deltas are never encoded; one can only come from the padding bits
        if delta == 0 {
            return trace(QueryOutcome::Exhausted, decoder.decoded() - 1);
        }

        sum = sum.saturating_add(delta);
        if sum == target {
            return trace(QueryOutcome::Found, decoder.decoded());
        }
        if sum > target {
            return trace(QueryOutcome::Overshot, decoder.decoded());
        }
    }
}
