//! Size limits for messages and strings.

/// Largest message a connection sends or accepts, in bytes.
pub const MAX_MSGLEN: usize = 16384;

/// Capacity of a regular string including its terminator.
pub const MAX_STRING_CHARS: usize = 1024;

/// Capacity of a big info string including its terminator.
pub const BIG_INFO_STRING: usize = 8192;

/// Limits applied by message channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MessageLimits {
    /// Size of a message buffer in bytes.
    pub max_message_bytes: usize,
    /// Capacity of a regular string, terminator included.
    pub max_string_chars: usize,
    /// Capacity of a big string, terminator included.
    pub max_big_string_chars: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_message_bytes: MAX_MSGLEN,
            max_string_chars: MAX_STRING_CHARS,
            max_big_string_chars: BIG_INFO_STRING,
        }
    }
}

impl MessageLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_message_bytes: 256,
            max_string_chars: 32,
            max_big_string_chars: 64,
        }
    }
}
