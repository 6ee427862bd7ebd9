//! Prefix walk over a field table shared by the entity and player codecs.
//!
//! A delta carries an 8-bit count of sent fields, then one change bit per
//! sent field inside that prefix, each changed bit followed by the value.

use bitstream::{BitWidth, MessageReader, MessageWriter};
use schema::{FieldKind, FieldRules, FieldTable};

use crate::error::{CodecError, CodecResult};

/// Bits of the biased small-integer float form.
pub const FLOAT_INT_BITS: u8 = 13;

const FLOAT_INT: BitWidth = BitWidth::unsigned(FLOAT_INT_BITS);
const FLOAT_INT_BIAS: i32 = 1 << (FLOAT_INT_BITS - 1);
const COUNT: BitWidth = BitWidth::U8;

/// How a changed value is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueStyle {
    /// A leading bit separates zero from everything else.
    ZeroFlagged,
    /// The value follows the change bit directly.
    Plain,
}

pub(crate) struct Walk<'t, R> {
    table: &'t FieldTable<R>,
    rules: FieldRules,
    style: ValueStyle,
}

impl<'t, R: Clone> Walk<'t, R> {
    pub(crate) const fn new(table: &'t FieldTable<R>, rules: FieldRules, style: ValueStyle) -> Self {
        Self { table, rules, style }
    }

    /// One past the highest sent field that differs, or 0.
    pub(crate) fn last_changed(&self, from: &R, to: &R) -> usize {
        self.table.last_changed(&self.rules, from, to)
    }

    /// Number of fields this layout puts on the wire.
    pub(crate) fn sent_len(&self) -> usize {
        self.table.sent(&self.rules).count()
    }

    /// Writes the count and every sent field below `end`.
    pub(crate) fn write_changes(&self, w: &mut MessageWriter<'_>, from: &R, to: &R, end: usize) {
        let count = self.table.sent_before(&self.rules, end);
        w.write_bits(count as i32, COUNT);
        for (index, field) in self.table.sent(&self.rules).take(count) {
            if !field.differs(from, to) {
                w.write_flag(false);
                continue;
            }
            w.write_flag(true);
            let kind = self.rules.effective_kind(index, field.kind);
            let bits = field.read(to);
            tracing::trace!(field = field.name, index, bits, "field changed");
            match kind {
                FieldKind::Float => self.write_float(w, bits),
                FieldKind::Int(width) => {
                    let value = if self.rules.width_override(index).is_some() {
                        width.extend(bits & width.mask())
                    } else {
                        bits as i32
                    };
                    self.write_int(w, value, width);
                }
            }
        }
    }

    /// Reads a count and its fields on top of a copy of `from`.
    ///
    /// Fields outside the count or skipped by the rules keep the value from
    /// `from`. Fields sent narrower than declared take the sent low bits and
    /// keep the high bits of `from`, so a baseline that does not fit the
    /// narrow width leaks its high bits into the result (`0x100` with `0xFF`
    /// sent in 8 bits decodes as `0x1FF`).
    pub(crate) fn read_changes(&self, r: &mut MessageReader<'_>, from: &R) -> CodecResult<R> {
        let count = r.read_bits(COUNT) as usize;
        let max = self.sent_len();
        if count > max {
            tracing::warn!(count, max, "field count exceeds layout");
            return Err(CodecError::InvalidFieldCount { count, max });
        }

        let mut to = from.clone();
        for (index, field) in self.table.sent(&self.rules).take(count) {
            if !r.read_flag() {
                continue;
            }
            let bits = match self.rules.effective_kind(index, field.kind) {
                FieldKind::Float => self.read_float(r),
                FieldKind::Int(width) => {
                    let value = self.read_int(r, width);
                    if self.rules.width_override(index).is_some() {
                        (field.read(from) & !width.mask()) | (value & width.mask())
                    } else {
                        value
                    }
                }
            };
            tracing::trace!(field = field.name, index, bits, "field decoded");
            field.write(&mut to, bits);
        }

        if r.is_exhausted() {
            return Err(CodecError::Truncated);
        }
        Ok(to)
    }

    fn write_float(&self, w: &mut MessageWriter<'_>, bits: u32) {
        if self.style == ValueStyle::ZeroFlagged {
            if bits == 0 {
                w.write_flag(false);
                return;
            }
            w.write_flag(true);
        }
        match small_float(bits) {
            Some(value) => {
                w.write_flag(false);
                w.write_bits(value + FLOAT_INT_BIAS, FLOAT_INT);
            }
            None => {
                w.write_flag(true);
                w.write_bits(bits as i32, BitWidth::U32);
            }
        }
    }

    fn read_float(&self, r: &mut MessageReader<'_>) -> u32 {
        if self.style == ValueStyle::ZeroFlagged && !r.read_flag() {
            return 0;
        }
        if r.read_flag() {
            r.read_bits(BitWidth::U32) as u32
        } else {
            ((r.read_bits(FLOAT_INT) - FLOAT_INT_BIAS) as f32).to_bits()
        }
    }

    fn write_int(&self, w: &mut MessageWriter<'_>, value: i32, width: BitWidth) {
        if self.style == ValueStyle::ZeroFlagged {
            if value == 0 {
                w.write_flag(false);
                return;
            }
            w.write_flag(true);
        }
        w.write_bits(value, width);
    }

    fn read_int(&self, r: &mut MessageReader<'_>, width: BitWidth) -> u32 {
        if self.style == ValueStyle::ZeroFlagged && !r.read_flag() {
            return 0;
        }
        r.read_bits(width) as u32
    }
}

/// Returns the integer a float holds if it survives the 13-bit form exactly.
fn small_float(bits: u32) -> Option<i32> {
    let value = f32::from_bits(bits);
    let trunc = value as i32;
    ((trunc as f32).to_bits() == bits && (-FLOAT_INT_BIAS..FLOAT_INT_BIAS).contains(&trunc))
        .then_some(trunc)
}
