//! Canonical prefix code construction and byte-at-a-time coding.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::OnceLock;

use crate::error::{HuffmanError, HuffmanResult};
use crate::frequencies::MESSAGE_FREQUENCIES;

/// Number of symbols in the alphabet (one per byte value).
pub const SYMBOL_COUNT: usize = 256;

/// Longest code the codec accepts.
pub const MAX_CODE_LEN: u8 = 32;

const NO_PARENT: usize = usize::MAX;

/// Destination for encoded bits.
pub trait BitSink {
    /// Appends one bit.
    fn put_bit(&mut self, bit: bool);
}

/// Source of bits for decoding.
pub trait BitSource {
    /// Returns the next bit, or `None` once the input is exhausted.
    fn next_bit(&mut self) -> Option<bool>;
}

/// A single prefix code: `length` bits, emitted most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Code {
    bits: u32,
    length: u8,
}

impl Code {
    /// Returns the code bits, right-aligned.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns the code length in bits.
    #[must_use]
    pub const fn length(self) -> u8 {
        self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// Child indices; 0 marks a missing child since the root is never a child.
    Internal { zero: u16, one: u16 },
    Leaf { symbol: u8 },
}

/// A static Huffman code over the 256 byte values.
///
/// The code is fully determined by the frequency table it was built from, so
/// two codecs built from the same table agree bit for bit without exchanging
/// anything on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCodec {
    codes: [Code; SYMBOL_COUNT],
    tree: Vec<Node>,
}

impl HuffmanCodec {
    /// Builds a canonical code from per-byte weights.
    ///
    /// Ties are broken by weight, then by creation order (byte value for
    /// leaves), so the result is deterministic.
    pub fn from_frequencies(frequencies: &[u32; SYMBOL_COUNT]) -> HuffmanResult<Self> {
        let lengths = code_lengths(frequencies)?;
        let codes = canonical_codes(&lengths);
        let tree = build_decode_tree(&codes);
        Ok(Self { codes, tree })
    }

    /// Returns the process-wide codec for message traffic.
    ///
    /// The codec is built from [`MESSAGE_FREQUENCIES`] on first use and is
    /// immutable afterwards, so it can be shared freely between threads.
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<HuffmanCodec> = OnceLock::new();
        SHARED.get_or_init(|| {
            let codec = Self::from_frequencies(&MESSAGE_FREQUENCIES)
                .unwrap_or_else(|err| panic!("built-in message frequency table is invalid: {err}"));
            tracing::debug!(
                max_code_length = codec.max_code_length(),
                "message huffman code built"
            );
            codec
        })
    }

    /// Returns the code assigned to a byte value.
    #[must_use]
    pub const fn code(&self, value: u8) -> Code {
        self.codes[value as usize]
    }

    /// Returns the longest code length in the table.
    #[must_use]
    pub fn max_code_length(&self) -> u8 {
        self.codes.iter().map(|code| code.length).max().unwrap_or(0)
    }

    /// Average code length in bits when symbols occur with the given weights.
    #[must_use]
    pub fn expected_bits_per_symbol(&self, frequencies: &[u32; SYMBOL_COUNT]) -> f64 {
        let total: u64 = frequencies.iter().map(|&weight| u64::from(weight)).sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = frequencies
            .iter()
            .zip(self.codes.iter())
            .map(|(&weight, code)| u64::from(weight) * u64::from(code.length))
            .sum();
        weighted as f64 / total as f64
    }

    /// Writes the code for `value` into `sink`.
    pub fn encode_byte<S: BitSink + ?Sized>(&self, value: u8, sink: &mut S) {
        let code = self.code(value);
        for shift in (0..code.length).rev() {
            sink.put_bit((code.bits >> shift) & 1 == 1);
        }
    }

    /// Reads one code from `source` and returns its byte value.
    ///
    /// Returns `None` if the source runs dry before a full code was read.
    pub fn decode_byte<S: BitSource + ?Sized>(&self, source: &mut S) -> Option<u8> {
        let mut idx = 0usize;
        loop {
            let bit = source.next_bit()?;
            let Node::Internal { zero, one } = self.tree[idx] else {
                return None;
            };
            idx = usize::from(if bit { one } else { zero });
            if idx == 0 {
                return None;
            }
            if let Node::Leaf { symbol } = self.tree[idx] {
                return Some(symbol);
            }
        }
    }
}

fn code_lengths(frequencies: &[u32; SYMBOL_COUNT]) -> HuffmanResult<[u8; SYMBOL_COUNT]> {
    let mut parent = vec![NO_PARENT; 2 * SYMBOL_COUNT - 1];
    let mut heap = BinaryHeap::with_capacity(SYMBOL_COUNT);
    for (symbol, &weight) in frequencies.iter().enumerate() {
        if weight == 0 {
            return Err(HuffmanError::ZeroFrequency {
                symbol: symbol as u8,
            });
        }
        heap.push(Reverse((u64::from(weight), symbol)));
    }

    let mut next = SYMBOL_COUNT;
    while heap.len() > 1 {
        let (Some(Reverse((w0, a))), Some(Reverse((w1, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((w0 + w1, next)));
        next += 1;
    }

    let mut lengths = [0u8; SYMBOL_COUNT];
    for (symbol, length) in lengths.iter_mut().enumerate() {
        let mut depth = 0usize;
        let mut node = symbol;
        while parent[node] != NO_PARENT {
            node = parent[node];
            depth += 1;
        }
        if depth > usize::from(MAX_CODE_LEN) {
            return Err(HuffmanError::CodeTooLong {
                symbol: symbol as u8,
                length: depth,
                max: MAX_CODE_LEN,
            });
        }
        *length = depth as u8;
    }
    Ok(lengths)
}

fn canonical_codes(lengths: &[u8; SYMBOL_COUNT]) -> [Code; SYMBOL_COUNT] {
    let mut order: Vec<usize> = (0..SYMBOL_COUNT).collect();
    order.sort_by_key(|&symbol| (lengths[symbol], symbol));

    let mut codes = [Code::default(); SYMBOL_COUNT];
    let mut next_code = 0u64;
    let mut prev_length = lengths[order[0]];
    for (rank, &symbol) in order.iter().enumerate() {
        let length = lengths[symbol];
        if rank > 0 {
            next_code = (next_code + 1) << (length - prev_length);
        }
        codes[symbol] = Code {
            bits: next_code as u32,
            length,
        };
        prev_length = length;
    }
    codes
}

fn build_decode_tree(codes: &[Code; SYMBOL_COUNT]) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(2 * SYMBOL_COUNT);
    nodes.push(Node::Internal { zero: 0, one: 0 });

    for (symbol, code) in codes.iter().enumerate() {
        let mut idx = 0usize;
        for shift in (0..code.length).rev() {
            let bit = (code.bits >> shift) & 1 == 1;
            let Node::Internal { zero, one } = nodes[idx] else {
                unreachable!("canonical code is prefix-free");
            };
            let child = if bit { one } else { zero };
            if child != 0 {
                idx = usize::from(child);
                continue;
            }

            let new_idx = nodes.len() as u16;
            nodes.push(if shift == 0 {
                Node::Leaf {
                    symbol: symbol as u8,
                }
            } else {
                Node::Internal { zero: 0, one: 0 }
            });
            nodes[idx] = if bit {
                Node::Internal { zero, one: new_idx }
            } else {
                Node::Internal { zero: new_idx, one }
            };
            idx = usize::from(new_idx);
        }
    }
    nodes
}
