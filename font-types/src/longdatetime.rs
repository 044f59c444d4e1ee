//! a datetime type

/// A simple datetime type.
///
/// This represented as a number of seconds since 12:00 midnight, January 1, 1904, UTC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongDateTime(i64);

impl LongDateTime {
    /// Seconds between the Mac epoch (1904-01-01) and the Unix epoch (1970-01-01).
    pub const UNIX_EPOCH_OFFSET: i64 = 2_082_844_800;

    /// Create with a number of seconds relative to 1904-01-01 00:00.
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Convert a Unix timestamp in milliseconds.
    ///
    /// Fractional seconds are floored, so negative timestamps round
    /// towards the past.
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis.div_euclid(1000) + Self::UNIX_EPOCH_OFFSET)
    }

    /// The number of seconds since 00:00 1904-01-01, UTC.
    ///
    /// This can be a negative number, which presumably represents a date prior
    /// to the reference date.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }
}

crate::newtype_scalar!(LongDateTime, [u8; 8]);
