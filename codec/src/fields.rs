//! Wire layouts of the entity and player records.
//!
//! Order matters: deltas send a prefix of the table up to the last changed
//! field, so the fields that change most often come first.

use std::sync::OnceLock;

use bitstream::BitWidth;
use schema::{FieldDescriptor, FieldKind, FieldRules, FieldTable, ProtocolVariant};

use crate::types::{
    EntityState, PlayerState, ENTITY_FIELD_COUNT, GENTITYNUM_BITS, PLAYER_FIELD_COUNT,
};

macro_rules! float_field {
    ($rec:ty, $name:literal, $($path:tt)+) => {
        FieldDescriptor::<$rec>::new(
            $name,
            FieldKind::Float,
            |s: &$rec| s.$($path)+.to_bits(),
            |s: &mut $rec, v| s.$($path)+ = f32::from_bits(v),
        )
    };
}

macro_rules! int_field {
    ($rec:ty, $name:literal, $kind:expr, $($path:tt)+) => {
        FieldDescriptor::<$rec>::new(
            $name,
            $kind,
            |s: &$rec| s.$($path)+ as u32,
            |s: &mut $rec, v| s.$($path)+ = v as i32,
        )
    };
}

const ENTITY_NUM: FieldKind = FieldKind::uint(GENTITYNUM_BITS);

/// Legacy entity layout: `weapon_anim` (13) is absent, `generic1` (33) is 8 bits.
pub const LEGACY_ENTITY_RULES: FieldRules = FieldRules::new(&[13], &[(33, BitWidth::U8)]);

/// Legacy player layout: `weapon_anim` (15), `ammo` (34), `clips` (35) and
/// `taunt_timer` (41) move into the ammo block; `pm_flags` (20) is 16 bits
/// and `generic1` (36) is 8 bits.
pub const LEGACY_PLAYER_RULES: FieldRules = FieldRules::new(
    &[15, 34, 35, 41],
    &[(20, BitWidth::U16), (36, BitWidth::U8)],
);

/// Returns the entity rules for `variant`.
#[must_use]
pub const fn entity_rules(variant: ProtocolVariant) -> FieldRules {
    match variant {
        ProtocolVariant::Current => FieldRules::NONE,
        ProtocolVariant::Legacy => LEGACY_ENTITY_RULES,
    }
}

/// Returns the player rules for `variant`.
#[must_use]
pub const fn player_rules(variant: ProtocolVariant) -> FieldRules {
    match variant {
        ProtocolVariant::Current => FieldRules::NONE,
        ProtocolVariant::Legacy => LEGACY_PLAYER_RULES,
    }
}

/// Returns the entity field table.
pub fn entity_fields() -> &'static FieldTable<EntityState> {
    static TABLE: OnceLock<FieldTable<EntityState>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FieldTable::new(entity_descriptors(), ENTITY_FIELD_COUNT)
            .unwrap_or_else(|err| panic!("entity field table is malformed: {err}"))
    })
}

/// Returns the player field table.
pub fn player_fields() -> &'static FieldTable<PlayerState> {
    static TABLE: OnceLock<FieldTable<PlayerState>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FieldTable::new(player_descriptors(), PLAYER_FIELD_COUNT)
            .unwrap_or_else(|err| panic!("player field table is malformed: {err}"))
    })
}

fn entity_descriptors() -> Vec<FieldDescriptor<EntityState>> {
    type E = EntityState;
    vec![
        int_field!(E, "pos.tr_time", FieldKind::uint(32), pos.tr_time),
        float_field!(E, "pos.tr_base[0]", pos.tr_base[0]),
        float_field!(E, "pos.tr_base[1]", pos.tr_base[1]),
        float_field!(E, "pos.tr_delta[0]", pos.tr_delta[0]),
        float_field!(E, "pos.tr_delta[1]", pos.tr_delta[1]),
        float_field!(E, "pos.tr_base[2]", pos.tr_base[2]),
        float_field!(E, "apos.tr_base[1]", apos.tr_base[1]),
        float_field!(E, "pos.tr_delta[2]", pos.tr_delta[2]),
        float_field!(E, "apos.tr_base[0]", apos.tr_base[0]),
        int_field!(E, "event", FieldKind::uint(10), event),
        float_field!(E, "angles2[1]", angles2[1]),
        int_field!(E, "e_type", FieldKind::uint(8), e_type),
        int_field!(E, "torso_anim", FieldKind::uint(8), torso_anim),
        int_field!(E, "weapon_anim", FieldKind::uint(8), weapon_anim),
        int_field!(E, "event_parm", FieldKind::uint(8), event_parm),
        int_field!(E, "legs_anim", FieldKind::uint(8), legs_anim),
        int_field!(E, "ground_entity_num", ENTITY_NUM, ground_entity_num),
        int_field!(E, "pos.tr_type", FieldKind::uint(8), pos.tr_type),
        int_field!(E, "e_flags", FieldKind::uint(19), e_flags),
        int_field!(E, "other_entity_num", ENTITY_NUM, other_entity_num),
        int_field!(E, "weapon", FieldKind::uint(8), weapon),
        int_field!(E, "client_num", FieldKind::uint(8), client_num),
        float_field!(E, "angles[1]", angles[1]),
        int_field!(E, "pos.tr_duration", FieldKind::uint(32), pos.tr_duration),
        int_field!(E, "apos.tr_type", FieldKind::uint(8), apos.tr_type),
        float_field!(E, "origin[0]", origin[0]),
        float_field!(E, "origin[1]", origin[1]),
        float_field!(E, "origin[2]", origin[2]),
        int_field!(E, "solid", FieldKind::uint(24), solid),
        int_field!(E, "misc", FieldKind::uint(16), misc),
        int_field!(E, "modelindex", FieldKind::uint(8), modelindex),
        int_field!(E, "other_entity_num2", ENTITY_NUM, other_entity_num2),
        int_field!(E, "loop_sound", FieldKind::uint(8), loop_sound),
        int_field!(E, "generic1", FieldKind::uint(10), generic1),
        float_field!(E, "origin2[2]", origin2[2]),
        float_field!(E, "origin2[0]", origin2[0]),
        float_field!(E, "origin2[1]", origin2[1]),
        int_field!(E, "modelindex2", FieldKind::uint(8), modelindex2),
        float_field!(E, "angles[0]", angles[0]),
        int_field!(E, "time", FieldKind::uint(32), time),
        int_field!(E, "apos.tr_time", FieldKind::uint(32), apos.tr_time),
        int_field!(E, "apos.tr_duration", FieldKind::uint(32), apos.tr_duration),
        float_field!(E, "apos.tr_base[2]", apos.tr_base[2]),
        float_field!(E, "apos.tr_delta[0]", apos.tr_delta[0]),
        float_field!(E, "apos.tr_delta[1]", apos.tr_delta[1]),
        float_field!(E, "apos.tr_delta[2]", apos.tr_delta[2]),
        int_field!(E, "time2", FieldKind::uint(32), time2),
        float_field!(E, "angles[2]", angles[2]),
        float_field!(E, "angles2[0]", angles2[0]),
        float_field!(E, "angles2[2]", angles2[2]),
        int_field!(E, "constant_light", FieldKind::uint(32), constant_light),
        int_field!(E, "frame", FieldKind::uint(16), frame),
    ]
}

fn player_descriptors() -> Vec<FieldDescriptor<PlayerState>> {
    type P = PlayerState;
    vec![
        int_field!(P, "command_time", FieldKind::uint(32), command_time),
        float_field!(P, "origin[0]", origin[0]),
        float_field!(P, "origin[1]", origin[1]),
        int_field!(P, "bob_cycle", FieldKind::uint(8), bob_cycle),
        float_field!(P, "velocity[0]", velocity[0]),
        float_field!(P, "velocity[1]", velocity[1]),
        float_field!(P, "viewangles[1]", viewangles[1]),
        float_field!(P, "viewangles[0]", viewangles[0]),
        int_field!(P, "weapon_time", FieldKind::sint(16), weapon_time),
        float_field!(P, "origin[2]", origin[2]),
        float_field!(P, "velocity[2]", velocity[2]),
        int_field!(P, "legs_timer", FieldKind::uint(8), legs_timer),
        int_field!(P, "pm_time", FieldKind::sint(16), pm_time),
        int_field!(P, "event_sequence", FieldKind::uint(16), event_sequence),
        int_field!(P, "torso_anim", FieldKind::uint(8), torso_anim),
        int_field!(P, "weapon_anim", FieldKind::uint(8), weapon_anim),
        int_field!(P, "movement_dir", FieldKind::uint(4), movement_dir),
        int_field!(P, "events[0]", FieldKind::uint(8), events[0]),
        int_field!(P, "legs_anim", FieldKind::uint(8), legs_anim),
        int_field!(P, "events[1]", FieldKind::uint(8), events[1]),
        int_field!(P, "pm_flags", FieldKind::uint(24), pm_flags),
        int_field!(P, "ground_entity_num", ENTITY_NUM, ground_entity_num),
        int_field!(P, "weaponstate", FieldKind::uint(4), weaponstate),
        int_field!(P, "e_flags", FieldKind::uint(16), e_flags),
        int_field!(P, "external_event", FieldKind::uint(10), external_event),
        int_field!(P, "gravity", FieldKind::sint(16), gravity),
        int_field!(P, "speed", FieldKind::sint(16), speed),
        int_field!(P, "delta_angles[1]", FieldKind::uint(16), delta_angles[1]),
        int_field!(P, "external_event_parm", FieldKind::uint(8), external_event_parm),
        int_field!(P, "viewheight", FieldKind::sint(8), viewheight),
        int_field!(P, "damage_event", FieldKind::uint(8), damage_event),
        int_field!(P, "damage_yaw", FieldKind::uint(8), damage_yaw),
        int_field!(P, "damage_pitch", FieldKind::uint(8), damage_pitch),
        int_field!(P, "damage_count", FieldKind::uint(8), damage_count),
        int_field!(P, "ammo", FieldKind::uint(12), ammo),
        int_field!(P, "clips", FieldKind::uint(4), clips),
        int_field!(P, "generic1", FieldKind::uint(10), generic1),
        int_field!(P, "pm_type", FieldKind::uint(8), pm_type),
        int_field!(P, "delta_angles[0]", FieldKind::uint(16), delta_angles[0]),
        int_field!(P, "delta_angles[2]", FieldKind::uint(16), delta_angles[2]),
        int_field!(P, "torso_timer", FieldKind::uint(12), torso_timer),
        int_field!(P, "taunt_timer", FieldKind::uint(12), taunt_timer),
        int_field!(P, "event_parms[0]", FieldKind::uint(8), event_parms[0]),
        int_field!(P, "event_parms[1]", FieldKind::uint(8), event_parms[1]),
        int_field!(P, "client_num", FieldKind::uint(8), client_num),
        int_field!(P, "weapon", FieldKind::uint(5), weapon),
        float_field!(P, "viewangles[2]", viewangles[2]),
        float_field!(P, "grapple_point[0]", grapple_point[0]),
        float_field!(P, "grapple_point[1]", grapple_point[1]),
        float_field!(P, "grapple_point[2]", grapple_point[2]),
        int_field!(P, "other_entity_num", ENTITY_NUM, other_entity_num),
        int_field!(P, "loop_sound", FieldKind::uint(16), loop_sound),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_declared_lengths() {
        assert_eq!(entity_fields().len(), ENTITY_FIELD_COUNT);
        assert_eq!(player_fields().len(), PLAYER_FIELD_COUNT);
    }

    #[test]
    fn legacy_rules_point_at_expected_fields() {
        let entity = entity_fields();
        assert_eq!(entity.position("weapon_anim"), Some(13));
        assert_eq!(entity.position("generic1"), Some(33));
        assert_eq!(entity.position("origin[2]"), Some(27));

        let player = player_fields();
        for (name, index) in [
            ("weapon_anim", 15),
            ("pm_flags", 20),
            ("ammo", 34),
            ("clips", 35),
            ("generic1", 36),
            ("taunt_timer", 41),
        ] {
            assert_eq!(player.position(name), Some(index), "{name}");
        }
    }

    #[test]
    fn rules_are_valid_for_tables() {
        for variant in [ProtocolVariant::Current, ProtocolVariant::Legacy] {
            entity_fields()
                .validate_rules(&entity_rules(variant))
                .unwrap();
            player_fields()
                .validate_rules(&player_rules(variant))
                .unwrap();
        }
    }

    #[test]
    fn accessors_touch_their_own_field() {
        let table = entity_fields();
        for (index, field) in table.fields().iter().enumerate() {
            let mut state = EntityState::default();
            field.write(&mut state, 0x3F80_0000);
            let changed = table
                .fields()
                .iter()
                .filter(|other| other.read(&state) != 0)
                .count();
            assert_eq!(changed, 1, "field {index} ({}) aliases another", field.name);
        }

        let table = player_fields();
        for field in table.fields() {
            let mut state = PlayerState::default();
            field.write(&mut state, 7);
            assert_eq!(field.read(&state), 7, "{}", field.name);
            let changed = table
                .fields()
                .iter()
                .filter(|other| other.read(&state) != 0)
                .count();
            assert_eq!(changed, 1, "{} aliases another field", field.name);
        }
    }
}
