#![no_main]

use bitstream::{BitWidth, MessageReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    // The first byte splits the input into an op script and a message.
    let split = usize::from(split).min(rest.len());
    let (ops, message) = rest.split_at(split);
    let mut reader = MessageReader::compressed(message);

    for &op in ops {
        match op % 8 {
            0 => {
                let _ = reader.read_flag();
            }
            1 => {
                let width = BitWidth::unsigned(op % 32 + 1);
                let _ = reader.read_bits(width);
            }
            2 => {
                let width = BitWidth::signed(op % 31 + 1);
                let _ = reader.read_bits(width);
            }
            3 => {
                let _ = reader.read_i32();
            }
            4 => {
                let _ = reader.read_string();
            }
            5 => {
                let _ = reader.read_string_line();
            }
            6 => {
                let _ = reader.peek_u8();
            }
            _ => {
                let _ = reader.read_angle16();
            }
        }
    }
});
