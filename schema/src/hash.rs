//! Deterministic field layout fingerprints.

use blake3::Hasher;

use crate::field::FieldKind;
use crate::table::FieldTable;
use crate::variant::FieldRules;

/// Computes a fingerprint of the wire layout `table` produces under `rules`.
///
/// Two peers whose fingerprints match encode and decode the same bits for
/// the same records.
#[must_use]
pub fn table_hash<R>(table: &FieldTable<R>, rules: &FieldRules) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, table.len() as u32);

    for (index, field) in table.fields().iter().enumerate() {
        write_u32(&mut hasher, field.name.len() as u32);
        hasher.update(field.name.as_bytes());
        if rules.is_skipped(index) {
            write_u8(&mut hasher, 0xFF);
            continue;
        }
        write_kind(&mut hasher, rules.effective_kind(index, field.kind));
    }

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

fn write_kind(hasher: &mut Hasher, kind: FieldKind) {
    match kind {
        FieldKind::Float => {
            write_u8(hasher, 0);
        }
        FieldKind::Int(width) => {
            write_u8(hasher, if width.is_signed() { 2 } else { 1 });
            write_u8(hasher, width.bits());
        }
    }
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use bitstream::BitWidth;

    struct Rec {
        a: i32,
        b: f32,
    }

    fn a(kind: FieldKind) -> FieldDescriptor<Rec> {
        FieldDescriptor::new("a", kind, |r| r.a as u32, |r, v| r.a = v as i32)
    }

    fn b() -> FieldDescriptor<Rec> {
        FieldDescriptor::new(
            "b",
            FieldKind::Float,
            |r| r.b.to_bits(),
            |r, v| r.b = f32::from_bits(v),
        )
    }

    #[test]
    fn table_hash_is_stable() {
        let table = FieldTable::new(vec![a(FieldKind::uint(8)), b()], 2).unwrap();
        assert_eq!(
            table_hash(&table, &FieldRules::NONE),
            table_hash(&table, &FieldRules::NONE)
        );
    }

    #[test]
    fn table_hash_changes_with_field_order() {
        let ab = FieldTable::new(vec![a(FieldKind::uint(8)), b()], 2).unwrap();
        let ba = FieldTable::new(vec![b(), a(FieldKind::uint(8))], 2).unwrap();
        assert_ne!(
            table_hash(&ab, &FieldRules::NONE),
            table_hash(&ba, &FieldRules::NONE)
        );
    }

    #[test]
    fn table_hash_changes_with_width_and_sign() {
        let unsigned = FieldTable::new(vec![a(FieldKind::uint(8)), b()], 2).unwrap();
        let signed = FieldTable::new(vec![a(FieldKind::sint(8)), b()], 2).unwrap();
        assert_ne!(
            table_hash(&unsigned, &FieldRules::NONE),
            table_hash(&signed, &FieldRules::NONE)
        );
    }

    #[test]
    fn table_hash_reflects_rules() {
        let table = FieldTable::new(vec![a(FieldKind::uint(10)), b()], 2).unwrap();
        let none = table_hash(&table, &FieldRules::NONE);
        let skip = table_hash(&table, &FieldRules::new(&[0], &[]));
        let narrow = table_hash(&table, &FieldRules::new(&[], &[(0, BitWidth::U8)]));
        assert_ne!(none, skip);
        assert_ne!(none, narrow);
        assert_ne!(skip, narrow);

        let declared_narrow = FieldTable::new(vec![a(FieldKind::uint(8)), b()], 2).unwrap();
        assert_eq!(narrow, table_hash(&declared_narrow, &FieldRules::NONE));
    }
}
