//! Bounded message writer.

use huffman::{BitSink, HuffmanCodec};

use crate::encoding::Encoding;
use crate::error::{BitError, BitResult};
use crate::limits::MessageLimits;
use crate::width::BitWidth;

/// Writes a message into a caller-provided buffer.
///
/// The writer never touches bytes beyond its buffer. A write that does not
/// fit marks the writer overflowed; from then on every write is dropped until
/// [`clear`](Self::clear) is called, and [`finish`](Self::finish) reports the
/// overflow.
#[derive(Debug)]
pub struct MessageWriter<'a> {
    buf: &'a mut [u8],
    encoding: Encoding<'a>,
    limits: MessageLimits,
    bit: usize,
    overflowed: bool,
    range_anomalies: u32,
}

/// Appends bits LSB first, zeroing each byte as it is entered.
struct PackedSink<'b> {
    buf: &'b mut [u8],
    bit: &'b mut usize,
}

impl BitSink for PackedSink<'_> {
    fn put_bit(&mut self, bit: bool) {
        let idx = *self.bit >> 3;
        let shift = *self.bit & 7;
        if shift == 0 {
            self.buf[idx] = 0;
        }
        self.buf[idx] |= u8::from(bit) << shift;
        *self.bit += 1;
    }
}

impl<'a> MessageWriter<'a> {
    /// Creates a writer over `buf` with the given encoding.
    pub fn new(buf: &'a mut [u8], encoding: Encoding<'a>) -> Self {
        Self {
            buf,
            encoding,
            limits: MessageLimits::default(),
            bit: 0,
            overflowed: false,
            range_anomalies: 0,
        }
    }

    /// Creates an out-of-band writer.
    pub fn raw(buf: &'a mut [u8]) -> Self {
        Self::new(buf, Encoding::Raw)
    }

    /// Creates a writer using the shared Huffman code.
    pub fn compressed(buf: &'a mut [u8]) -> Self {
        Self::new(buf, Encoding::huffman())
    }

    /// Replaces the string limits.
    #[must_use]
    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the channel encoding.
    #[must_use]
    pub const fn encoding(&self) -> Encoding<'a> {
        self.encoding
    }

    /// Returns the buffer size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit
    }

    /// Returns the number of bytes the message occupies.
    #[must_use]
    pub const fn bytes_used(&self) -> usize {
        self.bit.div_ceil(8)
    }

    /// Returns `true` once a write did not fit.
    #[must_use]
    pub const fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns how many values did not fit the width they were written at.
    #[must_use]
    pub const fn range_anomalies(&self) -> u32 {
        self.range_anomalies
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.bytes_used().min(self.buf.len())]
    }

    /// Resets the writer to an empty message.
    pub fn clear(&mut self) {
        self.bit = 0;
        self.overflowed = false;
    }

    /// Writes `value` using `width` bits.
    ///
    /// A value outside the width's range is masked and counted in
    /// [`range_anomalies`](Self::range_anomalies).
    ///
    /// # Panics
    ///
    /// Panics if the writer is out-of-band and `width` is not 8, 16 or 32 bits.
    pub fn write_bits(&mut self, value: i32, width: BitWidth) {
        if self.overflowed {
            return;
        }
        if !width.fits(value) {
            self.range_anomalies += 1;
            tracing::trace!(value, %width, "value out of range for width");
        }
        match self.encoding {
            Encoding::Raw => self.write_raw(value, width),
            Encoding::Huffman(codec) => {
                self.write_compressed(codec, value as u32 & width.mask(), width.bits());
            }
        }
    }

    fn write_raw(&mut self, value: i32, width: BitWidth) {
        let len = match width.bits() {
            8 => 1,
            16 => 2,
            32 => 4,
            bits => panic!("out-of-band messages carry 8, 16 or 32 bit values, not {bits}"),
        };
        let pos = self.bit >> 3;
        if pos + len > self.buf.len() {
            self.mark_overflowed();
            return;
        }
        self.buf[pos..pos + len].copy_from_slice(&value.to_le_bytes()[..len]);
        self.bit += len * 8;
    }

    fn write_compressed(&mut self, codec: &HuffmanCodec, mut value: u32, bits: u8) {
        let capacity_bits = self.buf.len() * 8;
        let literal = usize::from(bits & 7);
        if literal > 0 {
            if self.bit + literal > capacity_bits {
                self.mark_overflowed();
                return;
            }
            let mut sink = PackedSink {
                buf: &mut *self.buf,
                bit: &mut self.bit,
            };
            for _ in 0..literal {
                sink.put_bit(value & 1 == 1);
                value >>= 1;
            }
        }
        for _ in 0..bits >> 3 {
            let byte = (value & 0xFF) as u8;
            if self.bit + usize::from(codec.code(byte).length()) > capacity_bits {
                self.mark_overflowed();
                return;
            }
            let mut sink = PackedSink {
                buf: &mut *self.buf,
                bit: &mut self.bit,
            };
            codec.encode_byte(byte, &mut sink);
            value >>= 8;
        }
    }

    fn mark_overflowed(&mut self) {
        if !self.overflowed {
            tracing::warn!(
                capacity = self.buf.len(),
                bits_written = self.bit,
                "message overflowed, dropping further writes"
            );
        }
        self.overflowed = true;
    }

    /// Writes a single flag bit.
    pub fn write_flag(&mut self, flag: bool) {
        self.write_bits(i32::from(flag), BitWidth::BIT);
    }

    /// Writes an unsigned byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bits(i32::from(value), BitWidth::U8);
    }

    /// Writes a signed byte.
    pub fn write_i8(&mut self, value: i8) {
        self.write_bits(i32::from(value), BitWidth::S8);
    }

    /// Writes a signed 16-bit word.
    pub fn write_i16(&mut self, value: i16) {
        self.write_bits(i32::from(value), BitWidth::S16);
    }

    /// Writes a 32-bit long.
    pub fn write_i32(&mut self, value: i32) {
        self.write_bits(value, BitWidth::U32);
    }

    /// Writes the bit pattern of a float.
    pub fn write_f32(&mut self, value: f32) {
        self.write_bits(value.to_bits() as i32, BitWidth::U32);
    }

    /// Writes each byte of `data`.
    pub fn write_data(&mut self, data: &[u8]) {
        for &byte in data {
            self.write_u8(byte);
        }
    }

    /// Writes a NUL-terminated string of at most `max_string_chars` bytes.
    ///
    /// A string that does not fit is replaced by the empty string.
    pub fn write_string(&mut self, text: &str) {
        self.write_string_capped(text, self.limits.max_string_chars);
    }

    /// Writes a NUL-terminated string of at most `max_big_string_chars` bytes.
    pub fn write_big_string(&mut self, text: &str) {
        self.write_string_capped(text, self.limits.max_big_string_chars);
    }

    fn write_string_capped(&mut self, text: &str, max_chars: usize) {
        let size = text.len() + 1;
        if size > max_chars {
            tracing::warn!(size, max_chars, "string too long, sending empty string");
            self.write_u8(0);
            return;
        }
        self.write_data(text.as_bytes());
        self.write_u8(0);
    }

    /// Writes an angle in degrees quantized to a byte.
    pub fn write_angle8(&mut self, degrees: f32) {
        self.write_u8(((degrees * 256.0 / 360.0) as i32 & 255) as u8);
    }

    /// Writes an angle in degrees quantized to 16 bits.
    pub fn write_angle16(&mut self, degrees: f32) {
        self.write_bits(angle_to_short(degrees), BitWidth::U16);
    }

    /// Ends the message and returns its length in bytes.
    pub fn finish(self) -> BitResult<usize> {
        if self.overflowed {
            return Err(BitError::Overflow {
                capacity: self.buf.len(),
            });
        }
        Ok(self.bytes_used())
    }

    /// Copies the message bytes into `dst`, returning how many were copied.
    pub fn copy_into(&self, dst: &mut [u8]) -> BitResult<usize> {
        let src = self.as_bytes();
        if dst.len() < src.len() {
            return Err(BitError::CopyTooSmall {
                needed: src.len(),
                available: dst.len(),
            });
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }
}

/// Quantizes degrees to the 16-bit angle representation.
#[must_use]
pub fn angle_to_short(degrees: f32) -> i32 {
    (degrees * 65536.0 / 360.0) as i32 & 0xFFFF
}
