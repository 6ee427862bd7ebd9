//! Error types for message channel operations.

use thiserror::Error;

/// Result type for message channel operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur while producing or consuming a message.
///
/// Running out of input while reading is not an error at this layer: the
/// reader turns exhausted and yields zeros, and callers decide what a short
/// message means.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// A legacy integer width outside `-31..=-1` or `1..=32`.
    #[error("invalid bit width {width}, expected -31..=-1 or 1..=32")]
    InvalidWidth {
        /// The rejected width.
        width: i32,
    },

    /// The writer ran out of buffer space and dropped the remaining writes.
    #[error("message overflowed its {capacity} byte buffer")]
    Overflow {
        /// Capacity of the writer's buffer in bytes.
        capacity: usize,
    },

    /// The destination of a message copy cannot hold the message.
    #[error("cannot copy {needed} message bytes into a {available} byte buffer")]
    CopyTooSmall {
        /// Bytes the message occupies.
        needed: usize,
        /// Bytes the destination provides.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_width() {
        let err = BitError::InvalidWidth { width: 40 };
        let msg = err.to_string();
        assert!(msg.contains("40"), "should mention the width");
    }

    #[test]
    fn error_display_overflow() {
        let err = BitError::Overflow { capacity: 64 };
        let msg = err.to_string();
        assert!(msg.contains("64"), "should mention capacity");
        assert!(msg.contains("overflow"));
    }

    #[test]
    fn error_display_copy_too_small() {
        let err = BitError::CopyTooSmall {
            needed: 100,
            available: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("10 byte"));
    }

    #[test]
    fn error_equality() {
        let a = BitError::Overflow { capacity: 8 };
        let b = BitError::Overflow { capacity: 8 };
        let c = BitError::Overflow { capacity: 9 };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<BitError>();
    }
}
