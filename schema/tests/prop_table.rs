use bitstream::BitWidth;
use proptest::prelude::*;
use schema::{table_hash, FieldDescriptor, FieldKind, FieldRules, FieldTable};

#[derive(Debug, Clone, Default)]
struct Rec {
    values: [i32; 6],
}

macro_rules! slot {
    ($name:literal, $idx:literal) => {
        FieldDescriptor::<Rec>::new(
            $name,
            FieldKind::uint(16),
            |r: &Rec| r.values[$idx] as u32,
            |r: &mut Rec, v| r.values[$idx] = v as i32,
        )
    };
}

fn table() -> FieldTable<Rec> {
    FieldTable::new(
        vec![
            slot!("a", 0),
            slot!("b", 1),
            slot!("c", 2),
            slot!("d", 3),
            slot!("e", 4),
            slot!("f", 5),
        ],
        6,
    )
    .unwrap()
}

const RULE_SETS: [FieldRules; 4] = [
    FieldRules::NONE,
    FieldRules::new(&[5], &[]),
    FieldRules::new(&[1, 3], &[(2, BitWidth::U8)]),
    FieldRules::new(&[0, 2, 4], &[(5, BitWidth::unsigned(4))]),
];

fn record() -> impl Strategy<Value = Rec> {
    prop::array::uniform6(0i32..4).prop_map(|values| Rec { values })
}

proptest! {
    #[test]
    fn prop_last_changed_matches_naive_scan(
        old in record(),
        new in record(),
        rules in prop::sample::select(RULE_SETS.to_vec()),
    ) {
        let table = table();
        let naive = (0..6)
            .filter(|&i| !rules.is_skipped(i) && old.values[i] != new.values[i])
            .map(|i| i + 1)
            .max()
            .unwrap_or(0);
        prop_assert_eq!(table.last_changed(&rules, &old, &new), naive);

        let sent = table.sent_before(&rules, naive);
        prop_assert_eq!(sent, (0..naive).filter(|&i| !rules.is_skipped(i)).count());
        prop_assert_eq!(
            table.sent_before(&rules, table.len()),
            table.len() - rules.skipped().len()
        );
    }

    #[test]
    fn prop_rules_change_the_fingerprint(a in 0usize..4, b in 0usize..4) {
        let table = table();
        let (ha, hb) = (table_hash(&table, &RULE_SETS[a]), table_hash(&table, &RULE_SETS[b]));
        prop_assert_eq!(a == b, ha == hb);
    }
}
