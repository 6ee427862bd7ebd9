//! Ordered field tables.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDescriptor;
use crate::variant::FieldRules;

/// The wire layout of a record: descriptors in transmission order.
///
/// The position of a descriptor is its wire index. Delta encoders send a
/// prefix of the table up to the highest changed index, so frequently
/// changing fields belong near the front.
#[derive(Debug)]
pub struct FieldTable<R> {
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> FieldTable<R> {
    /// Creates a table after checking it describes `expected_len` distinct fields.
    pub fn new(fields: Vec<FieldDescriptor<R>>, expected_len: usize) -> SchemaResult<Self> {
        if fields.len() != expected_len {
            return Err(SchemaError::FieldCountMismatch {
                expected: expected_len,
                actual: fields.len(),
            });
        }
        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name) {
                return Err(SchemaError::DuplicateField { name: field.name });
            }
        }
        Ok(Self { fields })
    }

    /// Checks that `rules` only refer to fields of this table.
    pub fn validate_rules(&self, rules: &FieldRules) -> SchemaResult<()> {
        let len = self.fields.len();
        for &index in rules.skipped() {
            if index >= len {
                return Err(SchemaError::RuleIndexOutOfRange { index, len });
            }
        }
        for &(index, _) in rules.width_overrides() {
            let field = self
                .fields
                .get(index)
                .ok_or(SchemaError::RuleIndexOutOfRange { index, len })?;
            if field.kind.is_float() {
                return Err(SchemaError::OverrideOnFloat { name: field.name });
            }
        }
        Ok(())
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` for a table without fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the descriptor at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FieldDescriptor<R>> {
        self.fields.get(index)
    }

    /// Returns all descriptors in wire order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Returns the wire index of the field called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Iterates over the fields `rules` puts on the wire, with their indices.
    pub fn sent<'t>(
        &'t self,
        rules: &'t FieldRules,
    ) -> impl Iterator<Item = (usize, &'t FieldDescriptor<R>)> + 't {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(index, _)| !rules.is_skipped(*index))
    }

    /// Returns one past the highest sent index whose bits differ, or 0.
    pub fn last_changed(&self, rules: &FieldRules, old: &R, new: &R) -> usize {
        self.sent(rules)
            .filter(|(_, field)| field.differs(old, new))
            .map(|(index, _)| index + 1)
            .last()
            .unwrap_or(0)
    }

    /// Counts the sent fields below `end`.
    pub fn sent_before(&self, rules: &FieldRules, end: usize) -> usize {
        self.sent(rules).take_while(|(index, _)| *index < end).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use bitstream::BitWidth;

    #[derive(Debug, Default, Clone)]
    struct Rec {
        values: [i32; 4],
    }

    fn field(name: &'static str, idx: usize) -> FieldDescriptor<Rec> {
        // Accessors cannot capture, so each index gets its own pair.
        match idx {
            0 => FieldDescriptor::new(name, FieldKind::uint(8), |r| r.values[0] as u32, |r, v| r.values[0] = v as i32),
            1 => FieldDescriptor::new(name, FieldKind::uint(8), |r| r.values[1] as u32, |r, v| r.values[1] = v as i32),
            2 => FieldDescriptor::new(name, FieldKind::Float, |r| r.values[2] as u32, |r, v| r.values[2] = v as i32),
            _ => FieldDescriptor::new(name, FieldKind::uint(8), |r| r.values[3] as u32, |r, v| r.values[3] = v as i32),
        }
    }

    fn table() -> FieldTable<Rec> {
        FieldTable::new(
            vec![field("a", 0), field("b", 1), field("c", 2), field("d", 3)],
            4,
        )
        .unwrap()
    }

    #[test]
    fn rejects_count_mismatch() {
        let err = FieldTable::new(vec![field("a", 0)], 2).unwrap_err();
        assert_eq!(
            err,
            SchemaError::FieldCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = FieldTable::new(vec![field("a", 0), field("a", 1)], 2).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField { name: "a" });
    }

    #[test]
    fn last_changed_ignores_skipped() {
        let table = table();
        let old = Rec::default();
        let new = Rec {
            values: [0, 5, 0, 9],
        };
        assert_eq!(table.last_changed(&FieldRules::NONE, &old, &new), 4);

        let rules = FieldRules::new(&[3], &[]);
        assert_eq!(table.last_changed(&rules, &old, &new), 2);
        assert_eq!(table.last_changed(&rules, &old, &old), 0);
    }

    #[test]
    fn sent_before_counts_unskipped() {
        let table = table();
        let rules = FieldRules::new(&[1], &[]);
        assert_eq!(table.sent_before(&rules, 4), 3);
        assert_eq!(table.sent_before(&rules, 2), 1);
        assert_eq!(table.sent_before(&FieldRules::NONE, 2), 2);
    }

    #[test]
    fn validate_rules_checks_indices_and_kinds() {
        const RULES: FieldRules = FieldRules::new(&[1], &[(3, BitWidth::unsigned(4))]);
        let table = table();
        assert!(table
            .validate_rules(&RULES)
            .is_ok());
        assert_eq!(
            table.validate_rules(&FieldRules::new(&[9], &[])),
            Err(SchemaError::RuleIndexOutOfRange { index: 9, len: 4 })
        );
        assert_eq!(
            table.validate_rules(&FieldRules::new(&[], &[(2, BitWidth::U8)])),
            Err(SchemaError::OverrideOnFloat { name: "c" })
        );
    }

    #[test]
    fn position_finds_names() {
        let table = table();
        assert_eq!(table.position("c"), Some(2));
        assert_eq!(table.position("z"), None);
        assert_eq!(table.len(), 4);
    }
}
