use huffman::{BitSink, BitSource, HuffmanCodec, HuffmanError, SYMBOL_COUNT};
use proptest::prelude::*;

#[derive(Default)]
struct Bits {
    bits: Vec<bool>,
    pos: usize,
}

impl BitSink for Bits {
    fn put_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }
}

impl BitSource for Bits {
    fn next_bit(&mut self) -> Option<bool> {
        let bit = self.bits.get(self.pos).copied();
        self.pos += 1;
        bit
    }
}

fn table() -> impl Strategy<Value = [u32; SYMBOL_COUNT]> {
    prop::collection::vec(1u32..100_000, SYMBOL_COUNT).prop_map(|weights| {
        let mut table = [0u32; SYMBOL_COUNT];
        table.copy_from_slice(&weights);
        table
    })
}

proptest! {
    #[test]
    fn prop_any_table_roundtrips(
        frequencies in table(),
        message in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let codec = match HuffmanCodec::from_frequencies(&frequencies) {
            Ok(codec) => codec,
            Err(HuffmanError::CodeTooLong { .. }) => return Ok(()),
            Err(err) => return Err(TestCaseError::fail(err.to_string())),
        };

        let mut bits = Bits::default();
        for &byte in &message {
            codec.encode_byte(byte, &mut bits);
        }
        let expected: usize = message
            .iter()
            .map(|&byte| usize::from(codec.code(byte).length()))
            .sum();
        prop_assert_eq!(bits.bits.len(), expected);

        for &byte in &message {
            prop_assert_eq!(codec.decode_byte(&mut bits), Some(byte));
        }
        prop_assert_eq!(codec.decode_byte(&mut bits), None);
    }

    #[test]
    fn prop_heavier_symbols_never_get_longer_codes(frequencies in table()) {
        let Ok(codec) = HuffmanCodec::from_frequencies(&frequencies) else {
            return Ok(());
        };
        for a in 0..SYMBOL_COUNT {
            for b in 0..SYMBOL_COUNT {
                if frequencies[a] > frequencies[b] {
                    prop_assert!(
                        codec.code(a as u8).length() <= codec.code(b as u8).length(),
                        "byte {} outweighs byte {}", a, b
                    );
                }
            }
        }
    }
}
