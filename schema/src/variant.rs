//! Protocol variants and the per-variant field rules they select.

use bitstream::BitWidth;

use crate::field::FieldKind;

/// Protocol generation spoken on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProtocolVariant {
    /// Current protocol with every field on the wire.
    #[default]
    Current,
    /// Older protocol that omits some fields and packs others narrower.
    Legacy,
}

impl ProtocolVariant {
    /// Raw connection value that selects the legacy protocol.
    pub const LEGACY_RAW: i32 = 2;

    /// Maps the raw alternate-protocol value of a connection.
    #[must_use]
    pub const fn from_raw(alternate_protocol: i32) -> Self {
        if alternate_protocol == Self::LEGACY_RAW {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    /// Returns `true` for the legacy protocol.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// Per-variant exceptions to a field table.
///
/// Skipped fields are never sent; on decode they keep the baseline value.
/// Overridden fields are sent narrower than their declared width; on decode
/// the bits above the override keep the baseline value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldRules {
    skipped: &'static [usize],
    width_overrides: &'static [(usize, BitWidth)],
}

impl FieldRules {
    /// No exceptions.
    pub const NONE: Self = Self::new(&[], &[]);

    /// Creates rules from skipped indices and `(index, width)` overrides.
    #[must_use]
    pub const fn new(
        skipped: &'static [usize],
        width_overrides: &'static [(usize, BitWidth)],
    ) -> Self {
        Self {
            skipped,
            width_overrides,
        }
    }

    /// Returns the skipped field indices.
    #[must_use]
    pub const fn skipped(&self) -> &'static [usize] {
        self.skipped
    }

    /// Returns the width overrides.
    #[must_use]
    pub const fn width_overrides(&self) -> &'static [(usize, BitWidth)] {
        self.width_overrides
    }

    /// Returns `true` if the field at `index` is not sent.
    #[must_use]
    pub fn is_skipped(&self, index: usize) -> bool {
        self.skipped.contains(&index)
    }

    /// Returns the override width for the field at `index`, if any.
    #[must_use]
    pub fn width_override(&self, index: usize) -> Option<BitWidth> {
        self.width_overrides
            .iter()
            .find(|(i, _)| *i == index)
            .map(|&(_, width)| width)
    }

    /// Returns the kind actually sent for a field declared as `kind`.
    #[must_use]
    pub fn effective_kind(&self, index: usize, kind: FieldKind) -> FieldKind {
        match (kind, self.width_override(index)) {
            (FieldKind::Int(_), Some(width)) => FieldKind::Int(width),
            _ => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: FieldRules = FieldRules::new(&[13], &[(33, BitWidth::U8)]);

    #[test]
    fn variant_from_raw() {
        assert_eq!(ProtocolVariant::from_raw(2), ProtocolVariant::Legacy);
        assert_eq!(ProtocolVariant::from_raw(0), ProtocolVariant::Current);
        assert_eq!(ProtocolVariant::from_raw(1), ProtocolVariant::Current);
        assert!(ProtocolVariant::Legacy.is_legacy());
        assert_eq!(ProtocolVariant::default(), ProtocolVariant::Current);
    }

    #[test]
    fn rules_lookup() {
        assert!(LEGACY.is_skipped(13));
        assert!(!LEGACY.is_skipped(14));
        assert_eq!(LEGACY.width_override(33), Some(BitWidth::U8));
        assert_eq!(LEGACY.width_override(32), None);
        assert!(!FieldRules::NONE.is_skipped(13));
    }

    #[test]
    fn override_applies_to_ints_only() {
        assert_eq!(
            LEGACY.effective_kind(33, FieldKind::uint(10)),
            FieldKind::uint(8)
        );
        assert_eq!(LEGACY.effective_kind(33, FieldKind::Float), FieldKind::Float);
        assert_eq!(
            LEGACY.effective_kind(5, FieldKind::uint(10)),
            FieldKind::uint(10)
        );
    }
}
