//! Movement command deltas.

use bitstream::{BitWidth, MessageReader, MessageWriter};

use crate::delta::{read_delta_keyed, write_delta_keyed};
use crate::error::{CodecError, CodecResult};
use crate::types::UserCmd;

const ANGLE: BitWidth = BitWidth::U16;
const AXIS: BitWidth = BitWidth::U8;
const BUTTONS: BitWidth = BitWidth::U16;
const WEAPON: BitWidth = BitWidth::U8;

/// Writes `to` as a delta from `from`, obfuscated with `key`.
///
/// The time goes first: a forward step below 256 ms as an 8-bit delta,
/// anything else as the absolute 32-bit time. If no input changed a single
/// `0` follows; otherwise `1` and the eight input fields, keyed with
/// `key ^ to.server_time`.
pub fn write_delta_usercmd(w: &mut MessageWriter<'_>, key: i32, from: &UserCmd, to: &UserCmd) {
    let step = to.server_time.wrapping_sub(from.server_time);
    if (0..256).contains(&step) {
        w.write_flag(true);
        w.write_bits(step, BitWidth::U8);
    } else {
        w.write_flag(false);
        w.write_bits(to.server_time, BitWidth::U32);
    }

    if from.same_input(to) {
        w.write_flag(false);
        return;
    }
    let key = key ^ to.server_time;
    w.write_flag(true);
    for axis in 0..3 {
        write_delta_keyed(w, key, from.angles[axis], to.angles[axis], ANGLE);
    }
    write_delta_keyed(w, key, from.forwardmove.into(), to.forwardmove.into(), AXIS);
    write_delta_keyed(w, key, from.rightmove.into(), to.rightmove.into(), AXIS);
    write_delta_keyed(w, key, from.upmove.into(), to.upmove.into(), AXIS);
    write_delta_keyed(w, key, from.buttons, to.buttons, BUTTONS);
    write_delta_keyed(w, key, from.weapon.into(), to.weapon.into(), WEAPON);
}

/// Reads a command written by [`write_delta_usercmd`].
///
/// Movement axes that decode to `-128` are clamped to `-127`.
pub fn read_delta_usercmd(
    r: &mut MessageReader<'_>,
    key: i32,
    from: &UserCmd,
) -> CodecResult<UserCmd> {
    let mut to = *from;
    to.server_time = if r.read_flag() {
        from.server_time.wrapping_add(r.read_bits(BitWidth::U8))
    } else {
        r.read_bits(BitWidth::U32)
    };

    if r.read_flag() {
        let key = key ^ to.server_time;
        for axis in 0..3 {
            to.angles[axis] = read_delta_keyed(r, key, from.angles[axis], ANGLE);
        }
        to.forwardmove = read_axis(r, key, from.forwardmove);
        to.rightmove = read_axis(r, key, from.rightmove);
        to.upmove = read_axis(r, key, from.upmove);
        to.buttons = read_delta_keyed(r, key, from.buttons, BUTTONS);
        to.weapon = read_delta_keyed(r, key, from.weapon.into(), WEAPON) as u8;
    }

    if r.is_exhausted() {
        return Err(CodecError::Truncated);
    }
    Ok(to)
}

fn read_axis(r: &mut MessageReader<'_>, key: i32, old: i8) -> i8 {
    let value = read_delta_keyed(r, key, old.into(), AXIS) as u8 as i8;
    value.max(-127)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(key: i32, from: &UserCmd, to: &UserCmd) -> (Vec<u8>, usize) {
        let mut buf = vec![0u8; 64];
        let mut w = MessageWriter::compressed(&mut buf);
        write_delta_usercmd(&mut w, key, from, to);
        let bits = w.bits_written();
        let len = w.finish().unwrap();
        buf.truncate(len);
        (buf, bits)
    }

    fn expected(f: impl FnOnce(&mut MessageWriter<'_>)) -> (Vec<u8>, usize) {
        let mut buf = vec![0u8; 64];
        let mut w = MessageWriter::compressed(&mut buf);
        f(&mut w);
        let bits = w.bits_written();
        let len = w.finish().unwrap();
        buf.truncate(len);
        (buf, bits)
    }

    fn decode(key: i32, from: &UserCmd, data: &[u8]) -> CodecResult<UserCmd> {
        let mut r = MessageReader::compressed(data);
        read_delta_usercmd(&mut r, key, from)
    }

    fn moving() -> UserCmd {
        UserCmd {
            server_time: 1000,
            angles: [100, 65000, 0],
            buttons: 0x41,
            weapon: 7,
            forwardmove: 127,
            rightmove: -127,
            upmove: 0,
        }
    }

    #[test]
    fn idle_command_is_compact() {
        let from = moving();
        let to = UserCmd {
            server_time: 1016,
            ..from
        };
        let encoded = encode(42, &from, &to);
        let idle = expected(|w| {
            w.write_flag(true);
            w.write_bits(16, BitWidth::U8);
            w.write_flag(false);
        });
        assert_eq!(encoded, idle);
        assert_eq!(decode(42, &from, &encoded.0).unwrap(), to);
    }

    #[test]
    fn changed_command_roundtrips() {
        let from = UserCmd::default();
        let to = moving();
        let (data, _) = encode(0x7A3F_0011, &from, &to);
        assert_eq!(decode(0x7A3F_0011, &from, &data).unwrap(), to);
    }

    #[test]
    fn backwards_time_uses_absolute_form() {
        let from = moving();
        let to = UserCmd {
            server_time: 900,
            ..from
        };
        let encoded = encode(1, &from, &to);
        let absolute = expected(|w| {
            w.write_flag(false);
            w.write_bits(900, BitWidth::U32);
            w.write_flag(false);
        });
        assert_eq!(encoded, absolute);
        assert_eq!(decode(1, &from, &encoded.0).unwrap().server_time, 900);
    }

    #[test]
    fn long_step_uses_absolute_form() {
        let from = moving();
        let to = UserCmd {
            server_time: from.server_time + 256,
            ..from
        };
        let absolute = expected(|w| {
            w.write_flag(false);
            w.write_bits(1256, BitWidth::U32);
            w.write_flag(false);
        });
        assert_eq!(encode(1, &from, &to), absolute);
    }

    #[test]
    fn minus_128_axis_is_clamped() {
        let from = UserCmd::default();
        let to = UserCmd {
            server_time: 5,
            forwardmove: -128,
            ..from
        };
        let (data, _) = encode(9, &from, &to);
        assert_eq!(decode(9, &from, &data).unwrap().forwardmove, -127);
    }

    #[test]
    fn truncated_command_is_an_error() {
        let from = UserCmd::default();
        let (data, _) = encode(3, &from, &moving());
        assert_eq!(decode(3, &from, &data[..1]), Err(CodecError::Truncated));
    }
}
