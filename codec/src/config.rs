//! Codec configuration.

use bitstream::{Encoding, MessageLimits, MessageReader, MessageWriter};
use schema::ProtocolVariant;

use crate::entity::EntityDeltaCodec;
use crate::error::CodecResult;
use crate::fields::{entity_fields, entity_rules, player_fields, player_rules};
use crate::player::PlayerDeltaCodec;

/// Channel encoding selected by a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EncodingKind {
    /// Out-of-band byte framing.
    Raw,
    /// Huffman-compressed bit stream with the shared message code.
    #[default]
    Huffman,
}

impl EncodingKind {
    /// Returns the channel encoding.
    #[must_use]
    pub fn encoding(self) -> Encoding<'static> {
        match self {
            Self::Raw => Encoding::Raw,
            Self::Huffman => Encoding::huffman(),
        }
    }
}

/// Everything a connection needs to encode and decode messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    /// Protocol generation of the peer.
    pub variant: ProtocolVariant,
    /// Channel encoding.
    pub encoding: EncodingKind,
    /// Buffer and string limits.
    pub limits: MessageLimits,
}

impl CodecConfig {
    /// Configuration for a legacy peer.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            variant: ProtocolVariant::Legacy,
            ..Self::default()
        }
    }

    /// Creates a writer over `buf`.
    pub fn writer<'a>(&self, buf: &'a mut [u8]) -> MessageWriter<'a> {
        MessageWriter::new(buf, self.encoding.encoding()).with_limits(self.limits)
    }

    /// Creates a reader over `data`.
    pub fn reader<'a>(&self, data: &'a [u8]) -> MessageReader<'a> {
        MessageReader::new(data, self.encoding.encoding()).with_limits(self.limits)
    }

    /// Allocates a zeroed buffer of the configured message size.
    #[must_use]
    pub fn message_buffer(&self) -> Vec<u8> {
        vec![0; self.limits.max_message_bytes]
    }

    /// Returns the entity codec for this variant.
    #[must_use]
    pub const fn entity_codec(&self) -> EntityDeltaCodec {
        EntityDeltaCodec::new(self.variant)
    }

    /// Returns the player codec for this variant.
    #[must_use]
    pub const fn player_codec(&self) -> PlayerDeltaCodec {
        PlayerDeltaCodec::new(self.variant)
    }

    /// Checks the variant's rules against both field tables.
    pub fn validate(&self) -> CodecResult<()> {
        entity_fields().validate_rules(&entity_rules(self.variant))?;
        player_fields().validate_rules(&player_rules(self.variant))?;
        Ok(())
    }
}
