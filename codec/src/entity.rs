//! Entity state deltas.

use bitstream::{BitWidth, MessageReader, MessageWriter};
use schema::{FieldRules, ProtocolVariant};

use crate::error::{CodecError, CodecResult};
use crate::fields::{entity_fields, entity_rules};
use crate::types::{EntityState, GENTITYNUM_BITS, MAX_GENTITIES};
use crate::walk::{ValueStyle, Walk};

const NUMBER: BitWidth = BitWidth::unsigned(GENTITYNUM_BITS);

/// Outcome of decoding one entity delta.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityUpdate {
    /// The entity left the snapshot.
    Removed,
    /// The entity's new state.
    Present(EntityState),
}

impl EntityUpdate {
    /// Returns the state of a present entity.
    #[must_use]
    pub const fn state(&self) -> Option<&EntityState> {
        match self {
            Self::Removed => None,
            Self::Present(state) => Some(state),
        }
    }
}

/// Encodes and decodes entity states against a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityDeltaCodec {
    variant: ProtocolVariant,
    rules: FieldRules,
}

impl EntityDeltaCodec {
    /// Creates a codec for `variant`.
    #[must_use]
    pub const fn new(variant: ProtocolVariant) -> Self {
        Self {
            variant,
            rules: entity_rules(variant),
        }
    }

    /// Returns the protocol variant.
    #[must_use]
    pub const fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    fn walk(&self) -> Walk<'static, EntityState> {
        Walk::new(entity_fields(), self.rules, ValueStyle::ZeroFlagged)
    }

    /// Writes `to` as a delta from `from`.
    ///
    /// A missing `to` removes `from`'s entity; if both are missing nothing is
    /// written. A missing `from` encodes against an all-zero state.
    ///
    /// When nothing changed this writes nothing at all unless `force` is set,
    /// in which case the entity number and two clear bits are written so the
    /// receiver keeps the entity. Callers that walk an entity list rely on
    /// this to skip unchanged entities.
    pub fn write_delta(
        &self,
        w: &mut MessageWriter<'_>,
        from: Option<&EntityState>,
        to: Option<&EntityState>,
        force: bool,
    ) -> CodecResult<()> {
        let Some(to) = to else {
            if let Some(from) = from {
                check_number(from.number)?;
                tracing::trace!(number = from.number, "entity removed");
                w.write_bits(from.number, NUMBER);
                w.write_flag(true);
            }
            return Ok(());
        };
        check_number(to.number)?;

        let zero = EntityState::default();
        let from = from.unwrap_or(&zero);
        let walk = self.walk();
        let end = walk.last_changed(from, to);
        if end == 0 {
            if force {
                w.write_bits(to.number, NUMBER);
                w.write_flag(false);
                w.write_flag(false);
            }
            return Ok(());
        }

        w.write_bits(to.number, NUMBER);
        w.write_flag(false);
        w.write_flag(true);
        walk.write_changes(w, from, to, end);
        Ok(())
    }

    /// Reads the delta for entity `number`, whose number was already read.
    ///
    /// Fields the delta does not carry keep their value from `from`.
    pub fn read_delta(
        &self,
        r: &mut MessageReader<'_>,
        from: Option<&EntityState>,
        number: i32,
    ) -> CodecResult<EntityUpdate> {
        check_number(number)?;

        let removed = r.read_flag();
        let has_delta = !removed && r.read_flag();
        if r.is_exhausted() {
            return Err(CodecError::Truncated);
        }
        if removed {
            tracing::trace!(number, "entity removed");
            return Ok(EntityUpdate::Removed);
        }

        let zero = EntityState::default();
        let from = from.unwrap_or(&zero);
        let mut to = if has_delta {
            self.walk().read_changes(r, from)?
        } else {
            from.clone()
        };
        to.number = number;
        Ok(EntityUpdate::Present(to))
    }
}

/// Reads the entity number that prefixes every entity delta.
pub fn read_entity_number(r: &mut MessageReader<'_>) -> CodecResult<i32> {
    let number = r.read_bits(NUMBER);
    if r.is_exhausted() {
        return Err(CodecError::Truncated);
    }
    Ok(number)
}

fn check_number(number: i32) -> CodecResult<()> {
    if (0..MAX_GENTITIES).contains(&number) {
        return Ok(());
    }
    tracing::warn!(number, "entity number out of range");
    Err(CodecError::InvalidEntityNumber { number })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(number: i32) -> EntityState {
        EntityState {
            number,
            ..EntityState::default()
        }
    }

    #[test]
    fn out_of_range_number_is_rejected() {
        let codec = EntityDeltaCodec::default();
        let mut buf = [0u8; 64];
        let mut w = MessageWriter::compressed(&mut buf);
        let err = codec
            .write_delta(&mut w, None, Some(&entity(MAX_GENTITIES)), true)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidEntityNumber {
                number: MAX_GENTITIES
            }
        );
        assert_eq!(w.bits_written(), 0);
    }

    #[test]
    fn removal_without_baseline_writes_nothing() {
        let codec = EntityDeltaCodec::default();
        let mut buf = [0u8; 64];
        let mut w = MessageWriter::compressed(&mut buf);
        codec.write_delta(&mut w, None, None, true).unwrap();
        assert_eq!(w.bits_written(), 0);
    }

    #[test]
    fn removal_roundtrip() {
        let codec = EntityDeltaCodec::new(ProtocolVariant::Legacy);
        let from = entity(42);
        let mut buf = [0u8; 64];
        let mut w = MessageWriter::compressed(&mut buf);
        codec.write_delta(&mut w, Some(&from), None, false).unwrap();
        let len = w.finish().unwrap();

        let mut r = MessageReader::compressed(&buf[..len]);
        let number = read_entity_number(&mut r).unwrap();
        assert_eq!(number, 42);
        let update = codec.read_delta(&mut r, Some(&from), number).unwrap();
        assert_eq!(update, EntityUpdate::Removed);
        assert!(update.state().is_none());
    }

    #[test]
    fn empty_input_is_truncated() {
        let mut r = MessageReader::compressed(&[]);
        assert_eq!(read_entity_number(&mut r), Err(CodecError::Truncated));
        let codec = EntityDeltaCodec::default();
        let mut r = MessageReader::compressed(&[]);
        assert_eq!(codec.read_delta(&mut r, None, 3), Err(CodecError::Truncated));
    }
}
