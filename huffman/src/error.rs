//! Error types for code construction.

use thiserror::Error;

/// Result type for Huffman code construction.
pub type HuffmanResult<T> = Result<T, HuffmanError>;

/// Errors that can occur while building a code from a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuffmanError {
    /// A byte value has no weight and would receive no code.
    #[error("byte value {symbol} has zero frequency")]
    ZeroFrequency {
        /// The byte value without weight.
        symbol: u8,
    },

    /// The table is so skewed that a code exceeds the supported length.
    #[error("code for byte value {symbol} is {length} bits, maximum is {max}")]
    CodeTooLong {
        /// The byte value whose code is too long.
        symbol: u8,
        /// Length of the generated code.
        length: usize,
        /// Maximum supported code length.
        max: u8,
    },
}
