//! Inspection and debugging tools for the tremnet codec.
//!
//! This crate provides the reports behind the `tremnet-tools` binary:
//!
//! - Huffman code statistics for the built-in message table
//! - Entity and player field layouts with their fingerprints
//! - Encoding and decoding single deltas for inspection
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use anyhow::{bail, Context, Result};
use codec::{
    entity_fields, entity_rules, player_fields, player_rules, read_entity_number, CodecConfig,
    EntityState, EntityUpdate, PlayerState, ProtocolVariant,
};
use huffman::{HuffmanCodec, MESSAGE_FREQUENCIES, SYMBOL_COUNT};
use schema::{table_hash, FieldRules, FieldTable};
use serde::Serialize;

/// Code length statistics of a Huffman code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HuffmanReport {
    /// Shortest code in bits.
    pub min_code_length: u8,
    /// Longest code in bits.
    pub max_code_length: u8,
    /// Average bits per byte under the message frequencies.
    pub expected_bits_per_byte: f64,
    /// `(length, count)` pairs in ascending length order.
    pub length_histogram: Vec<(u8, usize)>,
}

/// Builds a [`HuffmanReport`] for `codec` weighted by the message frequencies.
pub fn huffman_report(codec: &HuffmanCodec) -> HuffmanReport {
    let mut histogram = [0usize; 33];
    for value in 0..SYMBOL_COUNT {
        histogram[usize::from(codec.code(value as u8).length())] += 1;
    }
    let length_histogram: Vec<(u8, usize)> = histogram
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(length, &count)| (length as u8, count))
        .collect();
    HuffmanReport {
        min_code_length: length_histogram.first().map_or(0, |&(length, _)| length),
        max_code_length: codec.max_code_length(),
        expected_bits_per_byte: codec.expected_bits_per_symbol(&MESSAGE_FREQUENCIES),
        length_histogram,
    }
}

/// One row of a layout listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub index: usize,
    pub name: &'static str,
    /// Kind actually sent, e.g. `float` or `u8`.
    pub kind: String,
    pub sent: bool,
}

/// A record layout under one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub fields: Vec<FieldRow>,
    pub fingerprint: u64,
}

/// Entity and player layouts of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablesReport {
    pub variant: ProtocolVariant,
    pub entity: LayoutReport,
    pub player: LayoutReport,
}

fn layout_report<R>(table: &FieldTable<R>, rules: &FieldRules) -> LayoutReport {
    let fields = table
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| FieldRow {
            index,
            name: field.name,
            kind: rules.effective_kind(index, field.kind).to_string(),
            sent: !rules.is_skipped(index),
        })
        .collect();
    LayoutReport {
        fields,
        fingerprint: table_hash(table, rules),
    }
}

/// Lists both field tables as `variant` sends them.
pub fn tables_report(variant: ProtocolVariant) -> TablesReport {
    TablesReport {
        variant,
        entity: layout_report(entity_fields(), &entity_rules(variant)),
        player: layout_report(player_fields(), &player_rules(variant)),
    }
}

/// An encoded delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedDelta {
    pub bits: usize,
    pub bytes: Vec<u8>,
}

impl EncodedDelta {
    /// Returns the bytes as lowercase hex.
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Encodes one entity delta under `config`.
pub fn encode_entity_delta(
    config: &CodecConfig,
    from: Option<&EntityState>,
    to: Option<&EntityState>,
    force: bool,
) -> Result<EncodedDelta> {
    require_compressed(config)?;
    let mut buf = config.message_buffer();
    let mut w = config.writer(&mut buf);
    config
        .entity_codec()
        .write_delta(&mut w, from, to, force)
        .context("encode entity delta")?;
    let bits = w.bits_written();
    let len = w.finish().context("finish message")?;
    buf.truncate(len);
    Ok(EncodedDelta { bits, bytes: buf })
}

/// Encodes one player delta under `config`.
pub fn encode_player_delta(
    config: &CodecConfig,
    from: Option<&PlayerState>,
    to: &PlayerState,
) -> Result<EncodedDelta> {
    require_compressed(config)?;
    let mut buf = config.message_buffer();
    let mut w = config.writer(&mut buf);
    config.player_codec().write_delta(&mut w, from, to);
    let bits = w.bits_written();
    let len = w.finish().context("finish message")?;
    buf.truncate(len);
    Ok(EncodedDelta { bits, bytes: buf })
}

/// Decodes one entity delta, entity number included.
pub fn decode_entity_delta(
    config: &CodecConfig,
    from: Option<&EntityState>,
    bytes: &[u8],
) -> Result<(i32, EntityUpdate)> {
    require_compressed(config)?;
    let mut r = config.reader(bytes);
    let number = read_entity_number(&mut r).context("read entity number")?;
    let update = config
        .entity_codec()
        .read_delta(&mut r, from, number)
        .with_context(|| format!("decode entity {number}"))?;
    Ok((number, update))
}

fn require_compressed(config: &CodecConfig) -> Result<()> {
    if config.encoding.encoding().is_raw() {
        bail!("deltas need a compressed channel, config selects raw encoding");
    }
    config.validate().context("validate config")?;
    Ok(())
}

/// Parses hex, ignoring whitespace.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(digits).context("parse hex")
}
