//! Static Huffman code for tremnet message payloads.
//!
//! Both ends of a connection build the same canonical code from a fixed
//! byte-frequency table, so no code table is ever transmitted. The table in
//! [`frequencies`] was measured on typical message traffic, where zero bytes
//! dominate.
//!
//! This crate only maps bytes to bit sequences. Packing bits into a byte
//! buffer is left to callers through the [`BitSink`] and [`BitSource`] traits.

mod code;
mod error;
pub mod frequencies;

pub use code::{BitSink, BitSource, Code, HuffmanCodec, MAX_CODE_LEN, SYMBOL_COUNT};
pub use error::{HuffmanError, HuffmanResult};
pub use frequencies::MESSAGE_FREQUENCIES;
