//! How a channel lays bits out in its buffer.

use huffman::HuffmanCodec;

/// Encoding of a message channel, fixed for the channel's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding<'a> {
    /// Out-of-band framing: whole little-endian bytes, words and longs only.
    Raw,
    /// Bit-packed stream with byte-sized chunks passed through a Huffman code.
    Huffman(&'a HuffmanCodec),
}

impl Encoding<'static> {
    /// Compressed encoding with the shared message code.
    #[must_use]
    pub fn huffman() -> Self {
        Self::Huffman(HuffmanCodec::shared())
    }
}

impl Encoding<'_> {
    /// Returns `true` for out-of-band framing.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw)
    }
}
