//! MSB-first bit packing over a byte buffer.
//!
//! Fields of any width up to [`MAX_WIDTH`] are moved through the stream in
//! chunks of at most 8 bits, so the accumulator never holds more than 15
//! pending bits and no width needs a wider register. Unary runs of any
//! length go through [`BitWriter::write_unary`] / [`BitReader::read_unary`].

use bytes::{BufMut, Bytes, BytesMut};

use gcs_core::error::{Error, Result};

/// Widest field accepted by a single `write` or `read`
pub const MAX_WIDTH: u32 = u64::BITS;

#[inline]
fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[inline]
fn check_width(width: u32) -> Result<()> {
    if width > MAX_WIDTH {
        return Err(Error::UnsupportedWidth {
            width,
            max: MAX_WIDTH,
        });
    }
    Ok(())
}

/// Bit writer appending to a growable buffer
#[derive(Debug)]
pub struct BitWriter {
    buffer: BytesMut,
    accum: u64,
    pending_bits: u32,
    bits_written: u64,
    closed: bool,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_buffer(BytesMut::new())
    }

    /// Continue writing after whatever `buffer` already holds
    pub fn with_buffer(buffer: BytesMut) -> Self {
        Self {
            buffer,
            accum: 0,
            pending_bits: 0,
            bits_written: 0,
            closed: false,
        }
    }

    /// Append the low `width` bits of `value`, most significant bit first
    pub fn write(&mut self, width: u32, value: u64) -> Result<()> {
        self.ensure_open()?;
        check_width(width)?;

        let mut remaining = width;
        while remaining > 0 {
            let take = match remaining % 8 {
                0 => 8,
                lead => lead,
            };
            remaining -= take;
            self.push_chunk(take, value >> remaining);
        }

        self.bits_written += width as u64;
        Ok(())
    }

    /// Append `count` one-bits followed by a terminating zero-bit
    pub fn write_unary(&mut self, count: u64) -> Result<()> {
        self.ensure_open()?;

        let mut ones = count;
        while ones >= 8 {
            self.push_chunk(8, 0xFF);
            ones -= 8;
        }
        let tail = ones as u32;
        self.push_chunk(tail + 1, low_mask(tail) << 1);

        self.bits_written += count + 1;
        Ok(())
    }

    /// Flush the final partial byte, left-justified and zero-padded.
    ///
    /// Must be called exactly once; a second call fails with `WriterClosed`.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.pending_bits > 0 {
            let byte = (self.accum << (8 - self.pending_bits)) as u8;
            self.buffer.put_u8(byte);
            self.accum = 0;
            self.pending_bits = 0;
        }
        self.closed = true;
        Ok(())
    }

    /// Close the stream if still open and hand over the bytes
    pub fn into_bytes(mut self) -> Result<Bytes> {
        if !self.closed {
            self.close()?;
        }
        Ok(self.buffer.freeze())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bits accepted so far, padding excluded
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Whole bytes emitted so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.pending_bits == 0
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        Ok(())
    }

    // bits <= 8, pending_bits < 8 on entry
    #[inline]
    fn push_chunk(&mut self, bits: u32, chunk: u64) {
        self.accum = (self.accum << bits) | (chunk & low_mask(bits));
        self.pending_bits += bits;
        if self.pending_bits >= 8 {
            self.pending_bits -= 8;
            self.buffer.put_u8((self.accum >> self.pending_bits) as u8);
            self.accum &= low_mask(self.pending_bits);
        }
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit reader over a borrowed byte slice. Consumed bytes are never revisited.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    offset: usize,
    accum: u64,
    available: u32,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            accum: 0,
            available: 0,
        }
    }

    /// Consume the next `width` bits, most significant bit first.
    ///
    /// Fails with `EndOfStream` without consuming anything when fewer than
    /// `width` bits remain.
    pub fn read(&mut self, width: u32) -> Result<u64> {
        check_width(width)?;
        let remaining_bits = self.remaining_bits();
        if width as u64 > remaining_bits {
            return Err(Error::EndOfStream {
                requested: width,
                available: remaining_bits,
            });
        }

        let mut value = 0u64;
        let mut remaining = width;
        while remaining > 0 {
            if self.available == 0 {
                self.accum = self.data[self.offset] as u64;
                self.offset += 1;
                self.available = 8;
            }
            let take = remaining.min(self.available);
            self.available -= take;
            value = (value << take) | ((self.accum >> self.available) & low_mask(take));
            self.accum &= low_mask(self.available);
            remaining -= take;
        }

        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read(1)? == 1)
    }

    /// Count one-bits up to and including the terminating zero-bit
    pub fn read_unary(&mut self) -> Result<u64> {
        let mut count = 0u64;
        while self.read_bit()? {
            count += 1;
        }
        Ok(count)
    }

    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() - self.offset) as u64 * 8 + self.available as u64
    }

    pub fn bits_consumed(&self) -> u64 {
        self.offset as u64 * 8 - self.available as u64
    }
}
