//! Records the codecs transfer.
//!
//! Every integer field is an `i32` and every float an `f32` so that each wire
//! field maps onto exactly one 32-bit pattern.

/// Bits used to send an entity number.
pub const GENTITYNUM_BITS: u8 = 10;

/// Number of addressable entities.
pub const MAX_GENTITIES: i32 = 1 << GENTITYNUM_BITS;

/// Entity number meaning "no entity".
pub const ENTITYNUM_NONE: i32 = MAX_GENTITIES - 1;

/// Slots in [`PlayerState::stats`].
pub const MAX_STATS: usize = 16;

/// Slots in [`PlayerState::persistant`].
pub const MAX_PERSISTANT: usize = 16;

/// Slots in [`PlayerState::misc`].
pub const MAX_MISC: usize = 16;

/// Width of the legacy ammo block mask.
pub const MAX_WEAPONS: usize = 16;

/// Wire fields of [`EntityState`], not counting `number`.
pub const ENTITY_FIELD_COUNT: usize = 52;

/// Wire fields of [`PlayerState`], not counting the arrays.
pub const PLAYER_FIELD_COUNT: usize = 52;

/// Parametric motion of a position or angle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Trajectory {
    pub tr_type: i32,
    pub tr_time: i32,
    pub tr_duration: i32,
    pub tr_base: [f32; 3],
    pub tr_delta: [f32; 3],
}

/// Network-visible state of one entity.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityState {
    /// Entity slot, sent ahead of every delta rather than as a field.
    pub number: i32,
    pub e_type: i32,
    pub e_flags: i32,
    pub pos: Trajectory,
    pub apos: Trajectory,
    pub time: i32,
    pub time2: i32,
    pub origin: [f32; 3],
    pub origin2: [f32; 3],
    pub angles: [f32; 3],
    pub angles2: [f32; 3],
    pub other_entity_num: i32,
    pub other_entity_num2: i32,
    pub ground_entity_num: i32,
    pub constant_light: i32,
    pub loop_sound: i32,
    pub modelindex: i32,
    pub modelindex2: i32,
    pub client_num: i32,
    pub frame: i32,
    pub solid: i32,
    pub event: i32,
    pub event_parm: i32,
    pub misc: i32,
    pub weapon: i32,
    pub legs_anim: i32,
    pub torso_anim: i32,
    pub weapon_anim: i32,
    pub generic1: i32,
}

/// State of the player a snapshot is built for.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerState {
    pub command_time: i32,
    pub pm_type: i32,
    pub bob_cycle: i32,
    pub pm_flags: i32,
    pub pm_time: i32,
    pub origin: [f32; 3],
    pub velocity: [f32; 3],
    pub weapon_time: i32,
    pub gravity: i32,
    pub speed: i32,
    pub delta_angles: [i32; 3],
    pub ground_entity_num: i32,
    pub legs_timer: i32,
    pub legs_anim: i32,
    pub torso_timer: i32,
    pub torso_anim: i32,
    pub movement_dir: i32,
    pub grapple_point: [f32; 3],
    pub e_flags: i32,
    pub event_sequence: i32,
    pub events: [i32; 2],
    pub event_parms: [i32; 2],
    pub external_event: i32,
    pub external_event_parm: i32,
    pub client_num: i32,
    pub weapon: i32,
    pub weaponstate: i32,
    pub viewangles: [f32; 3],
    pub viewheight: i32,
    pub damage_event: i32,
    pub damage_yaw: i32,
    pub damage_pitch: i32,
    pub damage_count: i32,
    pub stats: [i32; MAX_STATS],
    pub persistant: [i32; MAX_PERSISTANT],
    pub misc: [i32; MAX_MISC],
    pub ammo: i32,
    pub clips: i32,
    pub generic1: i32,
    pub loop_sound: i32,
    pub other_entity_num: i32,
    pub weapon_anim: i32,
    pub taunt_timer: i32,
    /// Not transmitted; decoders carry it over from the baseline.
    pub ping: i32,
    /// Not transmitted.
    pub pmove_framecount: i32,
    /// Not transmitted.
    pub jumppad_frame: i32,
    /// Not transmitted.
    pub entity_event_sequence: i32,
}

/// One client movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserCmd {
    pub server_time: i32,
    /// View angles as 16-bit shorts.
    pub angles: [i32; 3],
    /// Button bits; 16 are transmitted.
    pub buttons: i32,
    pub weapon: u8,
    pub forwardmove: i8,
    pub rightmove: i8,
    pub upmove: i8,
}

impl UserCmd {
    /// Returns `true` if everything but the time matches `other`.
    #[must_use]
    pub fn same_input(&self, other: &Self) -> bool {
        self.angles == other.angles
            && self.forwardmove == other.forwardmove
            && self.rightmove == other.rightmove
            && self.upmove == other.upmove
            && self.buttons == other.buttons
            && self.weapon == other.weapon
    }
}
