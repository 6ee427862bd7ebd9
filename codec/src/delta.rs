//! Gate-bit delta primitives.
//!
//! Each value is preceded by one bit: `0` means "same as the old value" and
//! nothing follows, `1` means the new value follows. The keyed forms XOR the
//! value with a per-connection key before it reaches the wire.

use bitstream::{BitWidth, MessageReader, MessageWriter};
use schema::ProtocolVariant;

/// Writes `new` if it differs from `old`.
pub fn write_delta(w: &mut MessageWriter<'_>, old: i32, new: i32, width: BitWidth) {
    if old == new {
        w.write_flag(false);
        return;
    }
    w.write_flag(true);
    w.write_bits(new, width);
}

/// Reads a value written by [`write_delta`].
pub fn read_delta(r: &mut MessageReader<'_>, old: i32, width: BitWidth) -> i32 {
    if r.read_flag() {
        return r.read_bits(width);
    }
    old
}

/// Writes the full bit pattern of `new` if it differs from `old`.
pub fn write_delta_float(w: &mut MessageWriter<'_>, old: f32, new: f32) {
    if old.to_bits() == new.to_bits() {
        w.write_flag(false);
        return;
    }
    w.write_flag(true);
    w.write_f32(new);
}

/// Reads a value written by [`write_delta_float`].
pub fn read_delta_float(r: &mut MessageReader<'_>, old: f32) -> f32 {
    if r.read_flag() {
        return f32::from_bits(r.read_bits(BitWidth::U32) as u32);
    }
    old
}

/// Writes `new ^ key` if `new` differs from `old`.
pub fn write_delta_keyed(
    w: &mut MessageWriter<'_>,
    key: i32,
    old: i32,
    new: i32,
    width: BitWidth,
) {
    if old == new {
        w.write_flag(false);
        return;
    }
    w.write_flag(true);
    w.write_bits(((new ^ key) as u32 & width.mask()) as i32, width);
}

/// Reads a value written by [`write_delta_keyed`] with the same key.
///
/// A wrong key yields a wrong value, never a failure.
pub fn read_delta_keyed(r: &mut MessageReader<'_>, key: i32, old: i32, width: BitWidth) -> i32 {
    if r.read_flag() {
        let raw = r.read_bits(width) as u32;
        return width.extend(raw ^ (key as u32 & width.mask()));
    }
    old
}

/// Writes the bit pattern of `new` XOR `key` if it differs from `old`.
pub fn write_delta_keyed_float(w: &mut MessageWriter<'_>, key: i32, old: f32, new: f32) {
    if old.to_bits() == new.to_bits() {
        w.write_flag(false);
        return;
    }
    w.write_flag(true);
    w.write_bits((new.to_bits() ^ key as u32) as i32, BitWidth::U32);
}

/// Reads a value written by [`write_delta_keyed_float`] with the same key.
pub fn read_delta_keyed_float(r: &mut MessageReader<'_>, key: i32, old: f32) -> f32 {
    if r.read_flag() {
        return f32::from_bits(r.read_bits(BitWidth::U32) as u32 ^ key as u32);
    }
    old
}

/// Hashes at most `max_len` bytes of `text` into an obfuscation key.
///
/// Hashing stops at the first NUL. Bytes with the high bit set hash as `.`,
/// and so does `%` under the legacy protocol, so the key survives the
/// sanitizing older peers apply to strings.
pub fn hash_key(variant: ProtocolVariant, text: &[u8], max_len: usize) -> i32 {
    let mut hash = 0i32;
    for (i, &byte) in text
        .iter()
        .take(max_len)
        .take_while(|&&byte| byte != 0)
        .enumerate()
    {
        let byte = if byte & 0x80 != 0 || (variant.is_legacy() && byte == b'%') {
            b'.'
        } else {
            byte
        };
        hash = hash.wrapping_add(i32::from(byte).wrapping_mul(119 + i as i32));
    }
    hash ^ (hash >> 10) ^ (hash >> 20)
}
