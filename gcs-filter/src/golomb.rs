//! Golomb-Rice coding with a power-of-two divisor `P`.
//!
//! A value `v` is written as `v / P` in unary (ones, then a zero) followed by
//! `v % P` in a fixed field of `log2(P)` bits.

use bytes::Bytes;

use gcs_core::error::{Error, Result};
use gcs_core::FilterParams;

use crate::bitstream::{BitReader, BitWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GolombRice {
    p: u64,
    remainder_bits: u32,
}

impl GolombRice {
    pub fn new(p: u64) -> Result<Self> {
        if !p.is_power_of_two() {
            return Err(Error::invalid_parameter(format!(
                "Golomb-Rice divisor must be a positive power of two, got {}",
                p
            )));
        }
        Ok(Self {
            p,
            remainder_bits: p.trailing_zeros(),
        })
    }

    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            p: params.p() as u64,
            remainder_bits: params.remainder_bits(),
        }
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn remainder_bits(&self) -> u32 {
        self.remainder_bits
    }

    /// Number of bits `value` occupies once encoded
    pub fn encoded_bits(&self, value: u64) -> u64 {
        (value >> self.remainder_bits) + 1 + self.remainder_bits as u64
    }

    pub fn encode(&self, writer: &mut BitWriter, value: u64) -> Result<()> {
        writer.write_unary(value >> self.remainder_bits)?;
        writer.write(self.remainder_bits, value & (self.p - 1))
    }

    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u64> {
        let quotient = reader.read_unary()?;
        let remainder = reader.read(self.remainder_bits)?;
        quotient
            .checked_mul(self.p)
            .and_then(|base| base.checked_add(remainder))
            .ok_or_else(|| Error::MalformedFilter {
                message: format!("unary run of {} overflows a 64-bit delta", quotient),
            })
    }
}

/// Encoder owning its bit stream
#[derive(Debug)]
pub struct GolombEncoder {
    writer: BitWriter,
    codec: GolombRice,
    count: u64,
}

impl GolombEncoder {
    pub fn new(codec: GolombRice) -> Self {
        Self::with_writer(BitWriter::new(), codec)
    }

    pub fn with_writer(writer: BitWriter, codec: GolombRice) -> Self {
        Self {
            writer,
            codec,
            count: 0,
        }
    }

    pub fn encode(&mut self, value: u64) -> Result<()> {
        self.codec.encode(&mut self.writer, value)?;
        self.count += 1;
        Ok(())
    }

    /// Values encoded so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn bits_written(&self) -> u64 {
        self.writer.bits_written()
    }

    /// Close the underlying stream and return its bytes
    pub fn finish(self) -> Result<Bytes> {
        self.writer.into_bytes()
    }
}

/// Streaming decoder over an encoded payload.
///
/// As an iterator it yields values until the payload runs out; use
/// [`GolombDecoder::next_value`] to see why decoding stopped.
#[derive(Debug, Clone)]
pub struct GolombDecoder<'a> {
    reader: BitReader<'a>,
    codec: GolombRice,
    decoded: u64,
}

impl<'a> GolombDecoder<'a> {
    pub fn new(payload: &'a [u8], codec: GolombRice) -> Self {
        Self {
            reader: BitReader::new(payload),
            codec,
            decoded: 0,
        }
    }

    pub fn next_value(&mut self) -> Result<u64> {
        let value = self.codec.decode(&mut self.reader)?;
        self.decoded += 1;
        Ok(value)
    }

    /// Values successfully decoded so far
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    pub fn bits_consumed(&self) -> u64 {
        self.reader.bits_consumed()
    }
}

impl Iterator for GolombDecoder<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.next_value().ok()
    }
}
