//! Bit-level message channels for tremnet.
//!
//! A message is produced by a [`MessageWriter`] into a fixed buffer and
//! consumed by a [`MessageReader`]. Both sides agree on an [`Encoding`]:
//! out-of-band framing of whole little-endian values, or a bit-packed stream
//! whose byte-sized chunks pass through the shared Huffman code.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Writers never leave their buffer, readers never
//!   leave their input.
//! - **Sticky failure** - Overflow and exhaustion are flags, not early
//!   returns, so encoders and decoders stay straight-line code.
//! - **No domain knowledge** - This crate knows nothing about entities or
//!   players.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitWidth, MessageReader, MessageWriter};
//!
//! let mut buf = [0u8; 16];
//! let mut writer = MessageWriter::compressed(&mut buf);
//! writer.write_flag(true);
//! writer.write_bits(-42, BitWidth::signed(7));
//! let len = writer.finish().unwrap();
//!
//! let mut reader = MessageReader::compressed(&buf[..len]);
//! assert!(reader.read_flag());
//! assert_eq!(reader.read_bits(BitWidth::signed(7)), -42);
//! ```

mod encoding;
mod error;
mod limits;
mod reader;
mod width;
mod writer;

pub use encoding::Encoding;
pub use error::{BitError, BitResult};
pub use huffman::HuffmanCodec;
pub use limits::{MessageLimits, BIG_INFO_STRING, MAX_MSGLEN, MAX_STRING_CHARS};
pub use reader::{short_to_angle, MessageReader};
pub use width::BitWidth;
pub use writer::{angle_to_short, MessageWriter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_roundtrip() {
        let mut buf = [0u8; 32];
        let mut writer = MessageWriter::compressed(&mut buf);
        writer.write_flag(true);
        writer.write_bits(0b1010, BitWidth::unsigned(4));
        writer.write_flag(false);
        writer.write_u8(0xFF);
        writer.write_bits(42, BitWidth::unsigned(7));
        writer.write_f32(-1.5);
        let len = writer.finish().unwrap();

        let mut reader = MessageReader::compressed(&buf[..len]);
        assert!(reader.read_flag());
        assert_eq!(reader.read_bits(BitWidth::unsigned(4)), 0b1010);
        assert!(!reader.read_flag());
        assert_eq!(reader.read_u8(), Some(0xFF));
        assert_eq!(reader.read_bits(BitWidth::unsigned(7)), 42);
        assert_eq!(reader.read_f32(), Some(-1.5));
        assert!(!reader.is_exhausted());
    }

    #[test]
    fn doctest_example() {
        let mut buf = [0u8; 16];
        let mut writer = MessageWriter::compressed(&mut buf);
        writer.write_flag(true);
        writer.write_bits(-42, BitWidth::signed(7));
        let len = writer.finish().unwrap();

        let mut reader = MessageReader::compressed(&buf[..len]);
        assert!(reader.read_flag());
        assert_eq!(reader.read_bits(BitWidth::signed(7)), -42);
    }
}
