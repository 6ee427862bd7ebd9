//! Delta codecs for tremnet entity states, player states and movement commands.
//!
//! This crate ties the bitstream channels and the schema field tables
//! together:
//! - [`EntityDeltaCodec`]: entity states against a baseline, with removal
//!   and forced "no change" records
//! - [`PlayerDeltaCodec`]: player states plus the stats, persistant, ammo and
//!   misc arrays
//! - [`write_delta_usercmd`] / [`read_delta_usercmd`]: keyed movement commands
//! - gate-bit primitives ([`write_delta`], [`write_delta_keyed`], ...)
//! - [`CodecConfig`]: variant, encoding and limits for a connection
//!
//! # Example
//!
//! ```
//! use codec::{CodecConfig, EntityState, EntityUpdate};
//!
//! let config = CodecConfig::default();
//! let entities = config.entity_codec();
//! let from = EntityState { number: 7, ..EntityState::default() };
//! let mut to = from.clone();
//! to.origin[2] = 128.0;
//!
//! let mut buf = config.message_buffer();
//! let mut w = config.writer(&mut buf);
//! entities.write_delta(&mut w, Some(&from), Some(&to), false)?;
//! let len = w.finish()?;
//!
//! let mut r = config.reader(&buf[..len]);
//! let number = codec::read_entity_number(&mut r)?;
//! let update = entities.read_delta(&mut r, Some(&from), number)?;
//! assert_eq!(update, EntityUpdate::Present(to));
//! # Ok::<(), codec::CodecError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Bit-exact** - Output matches the established wire format for both
//!   protocol variants.
//! - **Hostile input is data** - Corrupt messages produce errors, never panics.
//! - **No steady-state allocations** - Encoding writes into caller buffers.

mod config;
mod delta;
mod entity;
mod error;
mod fields;
mod player;
mod types;
mod usercmd;
mod walk;

pub use config::{CodecConfig, EncodingKind};
pub use delta::{
    hash_key, read_delta, read_delta_float, read_delta_keyed, read_delta_keyed_float,
    write_delta, write_delta_float, write_delta_keyed, write_delta_keyed_float,
};
pub use entity::{read_entity_number, EntityDeltaCodec, EntityUpdate};
pub use error::{CodecError, CodecResult};
pub use fields::{
    entity_fields, entity_rules, player_fields, player_rules, LEGACY_ENTITY_RULES,
    LEGACY_PLAYER_RULES,
};
pub use player::{PlayerDeltaCodec, PlayerLayout};
pub use schema::ProtocolVariant;
pub use types::{
    EntityState, PlayerState, Trajectory, UserCmd, ENTITYNUM_NONE, ENTITY_FIELD_COUNT,
    GENTITYNUM_BITS, MAX_GENTITIES, MAX_MISC, MAX_PERSISTANT, MAX_STATS, MAX_WEAPONS,
    PLAYER_FIELD_COUNT,
};
pub use usercmd::{read_delta_usercmd, write_delta_usercmd};
pub use walk::FLOAT_INT_BITS;
