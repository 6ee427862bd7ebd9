//! Field tables describing how tremnet records are laid out on the wire.
//!
//! This crate defines the reflection-free model the delta codecs walk:
//! - [`FieldDescriptor`]: a name, a [`FieldKind`], and typed accessors over a
//!   field's raw 32-bit pattern
//! - [`FieldTable`]: descriptors in wire order, checked against the record's
//!   declared field count
//! - [`FieldRules`]: per-[`ProtocolVariant`] skipped fields and width overrides
//! - [`table_hash`]: a deterministic fingerprint of a layout
//!
//! # Design Principles
//!
//! - **Explicit layouts** - No reflection on arbitrary Rust types.
//! - **Variants are data** - Protocol differences are rule values, not code paths.
//! - **Deterministic hashing** - A layout hashes the same on every peer.

mod error;
mod field;
mod hash;
mod table;
mod variant;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDescriptor, FieldKind};
pub use hash::table_hash;
pub use table::FieldTable;
pub use variant::{FieldRules, ProtocolVariant};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = FieldKind::Float;
        let _ = FieldRules::NONE;
        let _ = ProtocolVariant::from_raw(2);
        let table: FieldTable<()> = FieldTable::new(Vec::new(), 0).unwrap();
        assert!(table.is_empty());
        let _ = table_hash(&table, &FieldRules::NONE);
    }
}
