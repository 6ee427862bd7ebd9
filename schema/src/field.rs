//! Field descriptors: how one wire field maps onto a record.

use std::fmt;

use bitstream::BitWidth;

/// The encoding family of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 32-bit float, eligible for the small-integer fast path.
    Float,
    /// Integer sent at a fixed width.
    Int(BitWidth),
}

impl FieldKind {
    /// Creates an unsigned integer kind.
    #[must_use]
    pub const fn uint(bits: u8) -> Self {
        Self::Int(BitWidth::unsigned(bits))
    }

    /// Creates a signed integer kind.
    #[must_use]
    pub const fn sint(bits: u8) -> Self {
        Self::Int(BitWidth::signed(bits))
    }

    /// Returns `true` for float fields.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float)
    }

    /// Returns the width of an integer field; floats are full 32-bit values.
    #[must_use]
    pub const fn width(self) -> BitWidth {
        match self {
            Self::Float => BitWidth::U32,
            Self::Int(width) => width,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => f.write_str("float"),
            Self::Int(width) => write!(f, "{width}"),
        }
    }
}

/// One wire field of record type `R`.
///
/// `get` and `set` move the field's raw 32-bit pattern in and out of the
/// record: floats by their bit pattern, integers by two's complement. Change
/// detection compares these patterns, so `-0.0` and `0.0` differ and a NaN
/// equals itself.
pub struct FieldDescriptor<R> {
    /// Name used in logs and tooling.
    pub name: &'static str,
    /// Wire encoding.
    pub kind: FieldKind,
    /// Reads the raw bits of the field.
    pub get: fn(&R) -> u32,
    /// Stores raw bits into the field.
    pub set: fn(&mut R, u32),
}

impl<R> FieldDescriptor<R> {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        get: fn(&R) -> u32,
        set: fn(&mut R, u32),
    ) -> Self {
        Self {
            name,
            kind,
            get,
            set,
        }
    }

    /// Returns the raw bits of this field in `record`.
    pub fn read(&self, record: &R) -> u32 {
        (self.get)(record)
    }

    /// Stores raw bits into this field of `record`.
    pub fn write(&self, record: &mut R, bits: u32) {
        (self.set)(record, bits);
    }

    /// Returns `true` if the field differs between two records.
    pub fn differs(&self, old: &R, new: &R) -> bool {
        self.read(old) != self.read(new)
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldDescriptor<R> {}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
