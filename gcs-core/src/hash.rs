//! # Item Hashing
//!
//! Maps an item to a value in `[0, N*P)`. Builders and queries must use the
//! same mapper bit for bit, or membership answers are meaningless.
//!
//! ## Reference Mapping
//!
//! ```text
//! digest = MD5(item)                       16 bytes
//! h32    = u32::from_be(digest[12..16])    low 32 bits of the digest
//! value  = h32 % (N * P)
//! ```
//!
//! The digest is truncated to 32 bits before the modulus. For `N*P` close to
//! 2^32 this skews the distribution; the order is kept as-is so filters stay
//! readable by other implementations of the same format.

use md5::{Digest, Md5};

use crate::params::FilterParams;

/// Deterministic map from an item to `[0, N*P)`
pub trait HashMapper: Send + Sync {
    fn map(&self, item: &[u8], params: &FilterParams) -> u64;
}

/// MD5-based mapper compatible with the reference filter format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Md5Mapper;

impl Md5Mapper {
    /// Low 32 bits of the MD5 digest, read big-endian
    #[inline]
    pub fn digest32(item: &[u8]) -> u32 {
        let digest = Md5::digest(item);
        u32::from_be_bytes([digest[12], digest[13], digest[14], digest[15]])
    }
}

impl HashMapper for Md5Mapper {
    #[inline]
    fn map(&self, item: &[u8], params: &FilterParams) -> u64 {
        Self::digest32(item) as u64 % params.range()
    }
}

impl<F> HashMapper for F
where
    F: Fn(&[u8], &FilterParams) -> u64 + Send + Sync,
{
    fn map(&self, item: &[u8], params: &FilterParams) -> u64 {
        self(item, params)
    }
}
