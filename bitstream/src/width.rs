//! Field widths with explicit signedness.

use std::fmt;

use crate::error::BitError;

/// Number of bits a value occupies on the wire, and whether it is signed.
///
/// Unsigned widths cover `1..=32` bits, signed widths `1..=31`. Signed values
/// are sign-extended on read; a full 32-bit value is transferred as-is either
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitWidth {
    bits: u8,
    signed: bool,
}

impl BitWidth {
    /// Unsigned byte.
    pub const U8: Self = Self::unsigned(8);
    /// Unsigned 16-bit word.
    pub const U16: Self = Self::unsigned(16);
    /// Full 32-bit value.
    pub const U32: Self = Self::unsigned(32);
    /// Signed byte.
    pub const S8: Self = Self::signed(8);
    /// Signed 16-bit word.
    pub const S16: Self = Self::signed(16);
    /// A single flag bit.
    pub const BIT: Self = Self::unsigned(1);

    /// Creates an unsigned width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=32`.
    #[must_use]
    pub const fn unsigned(bits: u8) -> Self {
        assert!(bits >= 1 && bits <= 32, "unsigned width must be 1..=32 bits");
        Self {
            bits,
            signed: false,
        }
    }

    /// Creates a signed width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not in `1..=31`.
    #[must_use]
    pub const fn signed(bits: u8) -> Self {
        assert!(bits >= 1 && bits <= 31, "signed width must be 1..=31 bits");
        Self { bits, signed: true }
    }

    /// Returns the number of bits on the wire.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Returns `true` for sign-extended widths.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.signed
    }

    /// Returns a mask selecting the low `bits` bits.
    #[must_use]
    pub const fn mask(self) -> u32 {
        if self.bits == 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    /// Returns `true` if `value` is representable without loss.
    #[must_use]
    pub const fn fits(self, value: i32) -> bool {
        if self.bits == 32 {
            return true;
        }
        let value = value as i64;
        if self.signed {
            let half = 1i64 << (self.bits - 1);
            value >= -half && value < half
        } else {
            value >= 0 && value < (1i64 << self.bits)
        }
    }

    /// Converts the low `bits` bits of `raw` into a value of this width.
    #[must_use]
    pub const fn extend(self, raw: u32) -> i32 {
        let raw = raw & self.mask();
        if self.signed && raw & (1u32 << (self.bits - 1)) != 0 {
            (raw | !self.mask()) as i32
        } else {
            raw as i32
        }
    }

    /// Returns the legacy integer form: negative for signed widths.
    #[must_use]
    pub const fn to_legacy(self) -> i32 {
        if self.signed {
            -(self.bits as i32)
        } else {
            self.bits as i32
        }
    }
}

impl TryFrom<i32> for BitWidth {
    type Error = BitError;

    /// Accepts the legacy convention where a negative width means signed.
    fn try_from(width: i32) -> Result<Self, Self::Error> {
        match width {
            1..=32 => Ok(Self::unsigned(width as u8)),
            -31..=-1 => Ok(Self::signed(width.unsigned_abs() as u8)),
            _ => Err(BitError::InvalidWidth { width }),
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.signed { 'i' } else { 'u' };
        write!(f, "{sign}{}", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_widths_convert() {
        assert_eq!(BitWidth::try_from(8).unwrap(), BitWidth::U8);
        assert_eq!(BitWidth::try_from(-16).unwrap(), BitWidth::S16);
        assert_eq!(BitWidth::try_from(32).unwrap(), BitWidth::U32);
        for width in [-31, -1, 1, 32] {
            assert_eq!(BitWidth::try_from(width).unwrap().to_legacy(), width);
        }
    }

    #[test]
    fn legacy_widths_reject_out_of_range() {
        for width in [0, 33, -32, i32::MIN, i32::MAX] {
            assert_eq!(
                BitWidth::try_from(width),
                Err(BitError::InvalidWidth { width })
            );
        }
    }

    #[test]
    #[should_panic(expected = "unsigned width")]
    fn zero_width_panics() {
        let _ = BitWidth::unsigned(0);
    }

    #[test]
    #[should_panic(expected = "signed width")]
    fn signed_32_panics() {
        let _ = BitWidth::signed(32);
    }

    #[test]
    fn fits_checks_range() {
        let s8 = BitWidth::S8;
        assert!(s8.fits(-128));
        assert!(s8.fits(127));
        assert!(!s8.fits(128));
        assert!(!s8.fits(-129));

        let u4 = BitWidth::unsigned(4);
        assert!(u4.fits(15));
        assert!(!u4.fits(16));
        assert!(!u4.fits(-1));

        assert!(BitWidth::U32.fits(i32::MIN));
    }

    #[test]
    fn extend_sign_extends_signed_only() {
        assert_eq!(BitWidth::S8.extend(0xFF), -1);
        assert_eq!(BitWidth::U8.extend(0xFF), 255);
        assert_eq!(BitWidth::signed(13).extend(0x1000), -4096);
        assert_eq!(BitWidth::U32.extend(u32::MAX), -1);
    }

    #[test]
    fn display_shows_sign_and_bits() {
        assert_eq!(BitWidth::S16.to_string(), "i16");
        assert_eq!(BitWidth::unsigned(10).to_string(), "u10");
    }
}
