//! Error types for codec operations.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a delta.
///
/// Every variant is fatal to the message being processed, never to the
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Channel error.
    #[error(transparent)]
    Bitstream(#[from] bitstream::BitError),

    /// Field table error.
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),

    /// Entity number outside `0..MAX_GENTITIES`.
    #[error("invalid entity number {number}")]
    InvalidEntityNumber { number: i32 },

    /// A delta claims more fields than the record has on the wire.
    #[error("invalid field count {count}, at most {max} fields are sent")]
    InvalidFieldCount { count: usize, max: usize },

    /// The message ended in the middle of a delta.
    #[error("message truncated")]
    Truncated,
}
