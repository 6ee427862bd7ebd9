//! Player state deltas.

use bitstream::{BitWidth, MessageReader, MessageWriter};
use schema::{FieldRules, ProtocolVariant};

use crate::error::{CodecError, CodecResult};
use crate::fields::{player_fields, player_rules};
use crate::types::{PlayerState, MAX_MISC, MAX_PERSISTANT, MAX_STATS, MAX_WEAPONS};
use crate::walk::{ValueStyle, Walk};

/// Widths of one array block: a change mask with a bit per slot, then values.
#[derive(Debug, Clone, Copy)]
struct Block {
    mask: BitWidth,
    value: BitWidth,
}

impl Block {
    const fn new(slots: usize, value: BitWidth) -> Self {
        Self {
            mask: BitWidth::unsigned(slots as u8),
            value,
        }
    }
}

const STATS: Block = Block::new(MAX_STATS, BitWidth::S16);
const PERSISTANT: Block = Block::new(MAX_PERSISTANT, BitWidth::S16);
const AMMO: Block = Block::new(MAX_WEAPONS, BitWidth::U16);
const MISC: Block = Block::new(MAX_MISC, BitWidth::U32);

/// Wire layout of the player record for one protocol variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerLayout {
    /// Field exceptions.
    pub rules: FieldRules,
    /// Whether the packed ammo block follows the persistant block.
    pub ammo_block: bool,
}

impl PlayerLayout {
    /// Returns the layout spoken by `variant`.
    #[must_use]
    pub const fn for_variant(variant: ProtocolVariant) -> Self {
        Self {
            rules: player_rules(variant),
            ammo_block: variant.is_legacy(),
        }
    }
}

/// Encodes and decodes player states against a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerDeltaCodec {
    variant: ProtocolVariant,
    layout: PlayerLayout,
}

impl PlayerDeltaCodec {
    /// Creates a codec for `variant`.
    #[must_use]
    pub const fn new(variant: ProtocolVariant) -> Self {
        Self {
            variant,
            layout: PlayerLayout::for_variant(variant),
        }
    }

    /// Returns the protocol variant.
    #[must_use]
    pub const fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Returns the wire layout.
    #[must_use]
    pub const fn layout(&self) -> PlayerLayout {
        self.layout
    }

    fn walk(&self) -> Walk<'static, PlayerState> {
        Walk::new(player_fields(), self.layout.rules, ValueStyle::Plain)
    }

    /// Writes `to` as a delta from `from`; a missing `from` is an all-zero state.
    pub fn write_delta(
        &self,
        w: &mut MessageWriter<'_>,
        from: Option<&PlayerState>,
        to: &PlayerState,
    ) {
        let zero = PlayerState::default();
        let from = from.unwrap_or(&zero);
        let walk = self.walk();
        let end = walk.last_changed(from, to);
        walk.write_changes(w, from, to, end);

        let stats = changed_mask(&from.stats, &to.stats);
        let persistant = changed_mask(&from.persistant, &to.persistant);
        let (old_words, new_words) = (ammo_words(from), ammo_words(to));
        let ammo = if self.layout.ammo_block {
            changed_mask(&old_words, &new_words)
        } else {
            0
        };
        let misc = changed_mask(&from.misc, &to.misc);

        if stats == 0 && persistant == 0 && ammo == 0 && misc == 0 {
            w.write_flag(false);
            return;
        }
        w.write_flag(true);
        write_block(w, STATS, stats, &to.stats);
        write_block(w, PERSISTANT, persistant, &to.persistant);
        if self.layout.ammo_block {
            write_block(w, AMMO, ammo, &new_words);
        }
        write_block(w, MISC, misc, &to.misc);
    }

    /// Reads a delta written by [`write_delta`](Self::write_delta).
    ///
    /// Fields the delta does not carry, including those that never go on the
    /// wire, keep their value from `from`.
    pub fn read_delta(
        &self,
        r: &mut MessageReader<'_>,
        from: Option<&PlayerState>,
    ) -> CodecResult<PlayerState> {
        let zero = PlayerState::default();
        let from = from.unwrap_or(&zero);
        let mut to = self.walk().read_changes(r, from)?;

        if r.read_flag() {
            read_block(r, STATS, &mut to.stats);
            read_block(r, PERSISTANT, &mut to.persistant);
            if self.layout.ammo_block {
                let mut words = [0i32; MAX_WEAPONS];
                let mask = read_block(r, AMMO, &mut words);
                apply_ammo_words(&mut to, mask, &words);
            }
            read_block(r, MISC, &mut to.misc);
        }

        if r.is_exhausted() {
            return Err(CodecError::Truncated);
        }
        Ok(to)
    }
}

fn changed_mask(old: &[i32], new: &[i32]) -> u32 {
    old.iter()
        .zip(new)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .fold(0, |mask, (i, _)| mask | 1 << i)
}

fn write_block(w: &mut MessageWriter<'_>, block: Block, mask: u32, values: &[i32]) {
    if mask == 0 {
        w.write_flag(false);
        return;
    }
    w.write_flag(true);
    w.write_bits(mask as i32, block.mask);
    for (i, &value) in values.iter().enumerate() {
        if mask & 1 << i != 0 {
            w.write_bits(value, block.value);
        }
    }
}

/// Reads one block into `values` and returns its mask.
fn read_block(r: &mut MessageReader<'_>, block: Block, values: &mut [i32]) -> u32 {
    if !r.read_flag() {
        return 0;
    }
    let mask = r.read_bits(block.mask) as u32;
    for (i, value) in values.iter_mut().enumerate() {
        if mask & 1 << i != 0 {
            *value = r.read_bits(block.value);
        }
    }
    mask
}

/// Packs the fields the legacy layout moves out of the field walk.
fn ammo_words(ps: &PlayerState) -> [i32; 3] {
    [
        ps.weapon_anim & 0xFF | (ps.pm_flags >> 8) & 0xFF00,
        ps.ammo & 0xFFF | (ps.clips << 12) & 0xF000,
        ps.taunt_timer & 0xFFF | (ps.generic1 << 4) & 0x3000,
    ]
}

fn apply_ammo_words(ps: &mut PlayerState, mask: u32, words: &[i32]) {
    if mask & 1 != 0 {
        let word = words[0];
        ps.weapon_anim = word & 0xFF;
        ps.pm_flags = (ps.pm_flags & !0xFF_0000) | ((word & 0xFF00) << 8);
    }
    if mask & 2 != 0 {
        let word = words[1];
        ps.ammo = word & 0xFFF;
        ps.clips = (word >> 12) & 0xF;
    }
    if mask & 4 != 0 {
        let word = words[2];
        ps.taunt_timer = word & 0xFFF;
        ps.generic1 = (ps.generic1 & !0x300) | ((word & 0x3000) >> 4);
    }
}
