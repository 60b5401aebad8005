//! Filter parameters and the fixed 8-byte header.
//!
//! ```text
//! ┌────────────┬────────────┬──────────────────────────────────┐
//! │ N (u32 BE) │ P (u32 BE) │ Golomb-Rice coded deltas ...     │
//! │  bytes 0-3 │  bytes 4-7 │  MSB-first, zero-padded tail     │
//! └────────────┴────────────┴──────────────────────────────────┘
//! ```

use std::io::{Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of the serialized `(N, P)` header
pub const HEADER_SIZE: usize = 8;

/// `(N, P)` pair fixed at build time and stored in the filter header.
///
/// `N` scales the hash range to the expected set size, `P` sets the
/// false-positive rate to roughly `1/P`. `P` must be a power of two so the
/// Golomb-Rice remainder width `log2(P)` is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParams {
    n: u32,
    p: u32,
}

impl FilterParams {
    pub fn new(n: u32, p: u32) -> Result<Self> {
        if n == 0 {
            return Err(Error::invalid_parameter("N must be positive"));
        }
        if !p.is_power_of_two() {
            return Err(Error::invalid_parameter(format!(
                "P must be a positive power of two, got {}",
                p
            )));
        }
        Ok(Self { n, p })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    /// Width in bits of the fixed Golomb-Rice remainder field
    pub fn remainder_bits(&self) -> u32 {
        self.p.trailing_zeros()
    }

    /// Size of the hash range, `N*P`. Never overflows: both factors are u32.
    pub fn range(&self) -> u64 {
        self.n as u64 * self.p as u64
    }

    pub fn false_positive_rate(&self) -> f64 {
        1.0 / self.p as f64
    }

    /// Write the 8-byte big-endian header
    pub fn write_header<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u32::<BigEndian>(self.n)?;
        out.write_u32::<BigEndian>(self.p)?;
        Ok(())
    }

    /// Parse and validate the header at the start of a serialized filter
    pub fn from_header(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::MalformedFilter {
                message: format!(
                    "filter is {} bytes, header needs {}",
                    data.len(),
                    HEADER_SIZE
                ),
            });
        }

        let mut cursor = Cursor::new(&data[..HEADER_SIZE]);
        let n = cursor.read_u32::<BigEndian>()?;
        let p = cursor.read_u32::<BigEndian>()?;
        Self::new(n, p)
    }
}
