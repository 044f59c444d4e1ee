//! fixed-point numerical types

/// 32-bit signed fixed point number with 16 bits of fraction.
///
/// Conversions from floating point round to the nearest representable
/// value, with ties rounding up (towards positive infinity).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fixed(i32);

impl Fixed {
    /// Minimum value.
    pub const MIN: Self = Self(i32::MIN);

    /// Maximum value.
    pub const MAX: Self = Self(i32::MAX);

    /// This type's smallest representable value
    pub const EPSILON: Self = Self(1);

    /// Representation of 0.0.
    pub const ZERO: Self = Self(0);

    /// Representation of 1.0.
    pub const ONE: Self = Self(1 << 16);

    const FRACT_BITS: u32 = 16;
    const INT_MASK: i32 = !0 << Self::FRACT_BITS;

    /// Creates a new fixed point value from the underlying bit representation.
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Returns the underlying bit representation of the value.
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Creates a fixed point value from an integer.
    pub const fn from_i32(int: i32) -> Self {
        Self(int << Self::FRACT_BITS)
    }

    /// Creates a fixed point value from a 64-bit float.
    ///
    /// This operation is lossy; values outside the representable range
    /// saturate.
    pub fn from_f64(x: f64) -> Self {
        Self((x * Self::ONE.0 as f64 + 0.5).floor() as i32)
    }

    /// Returns the value as a 64-bit float.
    ///
    /// This operation is lossless: all representable values can be
    /// round-tripped.
    pub fn to_f64(self) -> f64 {
        let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as f64;
        let fract = (self.0 & !Self::INT_MASK) as f64 / Self::ONE.0 as f64;
        int + fract
    }
}

impl std::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

crate::newtype_scalar!(Fixed, [u8; 4]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_smoke_test() {
        assert_eq!(Fixed::from_f64(1.0).to_bits(), 0x0001_0000);
        assert_eq!(Fixed::from_f64(-1.0).to_bits(), -0x0001_0000);
        assert_eq!(Fixed::from_f64(0.5).to_bits(), 0x8000);
        assert_eq!(Fixed::from_i32(-12).to_f64(), -12.0);
        assert_eq!(Fixed::from_f64(-12.25).to_f64(), -12.25);
    }

    #[test]
    fn rounds_ties_up() {
        // half an epsilon rounds to the next representable value
        let half_eps = 0.5 / 65536.0;
        assert_eq!(Fixed::from_f64(half_eps), Fixed::EPSILON);
        assert_eq!(Fixed::from_f64(-half_eps), Fixed::ZERO);
    }

    #[test]
    fn saturates() {
        assert_eq!(Fixed::from_f64(1e9), Fixed::MAX);
        assert_eq!(Fixed::from_f64(-1e9), Fixed::MIN);
    }

    #[test]
    fn raw_bytes() {
        use crate::Scalar;
        assert_eq!(Fixed::ONE.to_raw(), [0, 1, 0, 0]);
        assert_eq!(Fixed::from_raw([0xff, 0xff, 0, 0]), Fixed::from_i32(-1));
    }
}
