//! Message reader that tolerates short and corrupt input.

use huffman::{BitSource, HuffmanCodec};

use crate::encoding::Encoding;
use crate::limits::MessageLimits;
use crate::width::BitWidth;

/// Reads a message produced by [`MessageWriter`](crate::MessageWriter).
///
/// Reading past the end of the data never fails loudly: the reader becomes
/// exhausted, the read that crossed the end and every later one return zero,
/// and the `Option` helpers return `None`. Only [`rewind`](Self::rewind)
/// clears the condition.
#[derive(Debug, Clone)]
pub struct MessageReader<'a> {
    data: &'a [u8],
    encoding: Encoding<'a>,
    limits: MessageLimits,
    bit: usize,
    exhausted: bool,
}

struct PackedSource<'b> {
    data: &'b [u8],
    bit: &'b mut usize,
}

impl BitSource for PackedSource<'_> {
    fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(*self.bit >> 3)?;
        let bit = (byte >> (*self.bit & 7)) & 1 == 1;
        *self.bit += 1;
        Some(bit)
    }
}

impl<'a> MessageReader<'a> {
    /// Creates a reader over `data` with the given encoding.
    #[must_use]
    pub fn new(data: &'a [u8], encoding: Encoding<'a>) -> Self {
        Self {
            data,
            encoding,
            limits: MessageLimits::default(),
            bit: 0,
            exhausted: false,
        }
    }

    /// Creates an out-of-band reader.
    #[must_use]
    pub fn raw(data: &'a [u8]) -> Self {
        Self::new(data, Encoding::Raw)
    }

    /// Creates a reader using the shared Huffman code.
    #[must_use]
    pub fn compressed(data: &'a [u8]) -> Self {
        Self::new(data, Encoding::huffman())
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

    /// Returns the message length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for an empty message.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bits consumed.
    #[must_use]
    pub const fn bits_read(&self) -> usize {
        self.bit
    }

    /// Returns the number of bytes touched by the bits consumed.
    #[must_use]
    pub const fn bytes_read(&self) -> usize {
        self.bit.div_ceil(8)
    }

    /// Returns `true` once a read ran past the end of the data.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Restarts reading from the beginning of the message.
    pub fn rewind(&mut self) {
        self.bit = 0;
        self.exhausted = false;
    }

    /// Reads a value of `width` bits.
    ///
    /// Signed widths are sign-extended; everything else comes back as the
    /// raw unsigned value.
    ///
    /// # Panics
    ///
    /// Panics if the reader is out-of-band and `width` is not 8, 16 or 32 bits.
    pub fn read_bits(&mut self, width: BitWidth) -> i32 {
        if self.exhausted {
            return 0;
        }
        let raw = match self.encoding {
            Encoding::Raw => self.read_raw(width),
            Encoding::Huffman(codec) => self.read_compressed(codec, width.bits()),
        };
        match raw {
            Some(raw) => width.extend(raw),
            None => {
                self.mark_exhausted();
                0
            }
        }
    }

    fn read_raw(&mut self, width: BitWidth) -> Option<u32> {
        let len = match width.bits() {
            8 => 1,
            16 => 2,
            32 => 4,
            bits => panic!("out-of-band messages carry 8, 16 or 32 bit values, not {bits}"),
        };
        let pos = self.bit >> 3;
        let bytes = self.data.get(pos..pos + len)?;
        let mut le = [0u8; 4];
        le[..len].copy_from_slice(bytes);
        self.bit += len * 8;
        Some(u32::from_le_bytes(le))
    }

    fn read_compressed(&mut self, codec: &HuffmanCodec, bits: u8) -> Option<u32> {
        let literal = u32::from(bits & 7);
        let mut source = PackedSource {
            data: self.data,
            bit: &mut self.bit,
        };
        let mut value = 0u32;
        if literal > 0 {
            if *source.bit + literal as usize > self.data.len() * 8 {
                return None;
            }
            for i in 0..literal {
                value |= u32::from(source.next_bit()?) << i;
            }
        }
        for i in 0..u32::from(bits >> 3) {
            let byte = codec.decode_byte(&mut source)?;
            value |= u32::from(byte) << (literal + 8 * i);
        }
        Some(value)
    }

    fn mark_exhausted(&mut self) {
        tracing::debug!(
            bits_read = self.bit,
            len = self.data.len(),
            "message exhausted"
        );
        self.exhausted = true;
    }

    fn checked<T>(&self, value: T) -> Option<T> {
        (!self.exhausted).then_some(value)
    }

    /// Reads a single flag bit.
    pub fn read_flag(&mut self) -> bool {
        self.read_bits(BitWidth::BIT) != 0
    }

    /// Reads an unsigned byte.
    pub fn read_u8(&mut self) -> Option<u8> {
        let value = self.read_bits(BitWidth::U8) as u8;
        self.checked(value)
    }

    /// Reads a signed byte.
    pub fn read_i8(&mut self) -> Option<i8> {
        let value = self.read_bits(BitWidth::S8) as i8;
        self.checked(value)
    }

    /// Reads a signed 16-bit word.
    pub fn read_i16(&mut self) -> Option<i16> {
        let value = self.read_bits(BitWidth::S16) as i16;
        self.checked(value)
    }

    /// Reads a 32-bit long.
    pub fn read_i32(&mut self) -> Option<i32> {
        let value = self.read_bits(BitWidth::U32);
        self.checked(value)
    }

    /// Reads a float from its bit pattern.
    pub fn read_f32(&mut self) -> Option<f32> {
        let value = f32::from_bits(self.read_bits(BitWidth::U32) as u32);
        self.checked(value)
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&mut self) -> Option<u8> {
        let (bit, exhausted) = (self.bit, self.exhausted);
        let value = self.read_u8();
        self.bit = bit;
        self.exhausted = exhausted;
        value
    }

    /// Fills `out` with message bytes; bytes past the end read as zero.
    pub fn read_data(&mut self, out: &mut [u8]) {
        for byte in out.iter_mut() {
            *byte = self.read_bits(BitWidth::U8) as u8;
        }
    }

    /// Reads a NUL-terminated string of at most `max_string_chars - 1` bytes.
    pub fn read_string(&mut self) -> String {
        self.read_text(self.limits.max_string_chars, false)
    }

    /// Reads a NUL-terminated string of at most `max_big_string_chars - 1` bytes.
    pub fn read_big_string(&mut self) -> String {
        self.read_text(self.limits.max_big_string_chars, false)
    }

    /// Reads a string that also ends at a newline.
    pub fn read_string_line(&mut self) -> String {
        self.read_text(self.limits.max_string_chars, true)
    }

    fn read_text(&mut self, max_chars: usize, stop_at_newline: bool) -> String {
        let mut bytes = Vec::new();
        while bytes.len() + 1 < max_chars {
            match self.read_u8() {
                None | Some(0) => break,
                Some(b'\n') if stop_at_newline => break,
                Some(byte) => bytes.push(byte),
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Reads a 16-bit quantized angle in degrees.
    pub fn read_angle16(&mut self) -> Option<f32> {
        self.read_i16().map(short_to_angle)
    }
}

/// Expands a 16-bit quantized angle to degrees.
#[must_use]
pub fn short_to_angle(value: i16) -> f32 {
    f32::from(value) * (360.0 / 65536.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageWriter;

    #[test]
    fn empty_reader() {
        let reader = MessageReader::compressed(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.bits_read(), 0);
        assert!(!reader.is_exhausted());
    }

    #[test]
    fn read_from_empty_exhausts() {
        let mut reader = MessageReader::compressed(&[]);
        assert_eq!(reader.read_bits(BitWidth::U8), 0);
        assert!(reader.is_exhausted());
        assert_eq!(reader.read_u8(), None);
    }

    #[test]
    fn exhaustion_is_sticky_until_rewind() {
        let mut reader = MessageReader::raw(&[0x11, 0x22]);
        assert_eq!(reader.read_i32(), None);
        assert_eq!(reader.read_u8(), None);
        assert_eq!(reader.read_bits(BitWidth::U8), 0);
        reader.rewind();
        assert_eq!(reader.read_u8(), Some(0x11));
    }

    #[test]
    fn raw_reads_are_unsigned_unless_signed() {
        let data = [0xFE, 0xFF, 0xFE, 0xFF];
        let mut reader = MessageReader::raw(&data);
        assert_eq!(reader.read_bits(BitWidth::U16), 0xFFFE);
        assert_eq!(reader.read_bits(BitWidth::S16), -2);
    }

    #[test]
    fn literal_bits_read_lsb_first() {
        let mut reader = MessageReader::compressed(&[0b0001_1101]);
        assert_eq!(reader.read_bits(BitWidth::unsigned(3)), 0b101);
        assert_eq!(reader.read_bits(BitWidth::unsigned(2)), 0b11);
        assert_eq!(reader.read_bits(BitWidth::signed(3)), 0);
        assert!(!reader.is_exhausted());
        assert_eq!(reader.read_bits(BitWidth::unsigned(4)), 0);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut buf = [0u8; 8];
        let mut writer = MessageWriter::compressed(&mut buf);
        writer.write_u8(42);
        writer.write_u8(7);
        let len = writer.finish().unwrap();

        let mut reader = MessageReader::compressed(&buf[..len]);
        assert_eq!(reader.peek_u8(), Some(42));
        assert_eq!(reader.read_u8(), Some(42));
        assert_eq!(reader.read_u8(), Some(7));
    }

    #[test]
    fn string_line_stops_at_newline() {
        let mut reader = MessageReader::raw(b"status\nrest\0");
        assert_eq!(reader.read_string_line(), "status");
        assert_eq!(reader.read_string(), "rest");
    }

    #[test]
    fn unterminated_string_stops_at_end() {
        let mut reader = MessageReader::raw(b"abc");
        assert_eq!(reader.read_string(), "abc");
        assert!(reader.is_exhausted());
    }

    #[test]
    fn string_read_is_capped() {
        let data = [b'a'; 40];
        let mut reader = MessageReader::raw(&data).with_limits(MessageLimits::for_testing());
        assert_eq!(reader.read_string().len(), 31);
    }

    #[test]
    fn read_data_zero_fills_past_end() {
        let mut reader = MessageReader::raw(&[1, 2]);
        let mut out = [9u8; 4];
        reader.read_data(&mut out);
        assert_eq!(out, [1, 2, 0, 0]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn angle16_roundtrip() {
        let mut buf = [0u8; 2];
        let mut writer = MessageWriter::raw(&mut buf);
        writer.write_angle16(90.0);
        writer.finish().unwrap();
        let mut reader = MessageReader::raw(&buf);
        assert_eq!(reader.read_angle16(), Some(90.0));
        assert!((short_to_angle(-16384) + 90.0).abs() < f32::EPSILON);
    }
}
