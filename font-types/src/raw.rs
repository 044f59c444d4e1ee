//! types for working with raw big-endian bytes

/// A trait for font scalars.
///
/// This is the bridge between a typed value and the big-endian bytes that
/// represent it in a font file.
pub trait Scalar: Sized {
    /// The raw byte representation of this type.
    type Raw: BeByteArray;

    /// The size of the raw type in bytes.
    const RAW_BYTE_LEN: usize = std::mem::size_of::<Self::Raw>();

    /// Create an instance of this type from raw big-endian bytes
    fn from_raw(raw: Self::Raw) -> Self;

    /// Encode this type as raw big-endian bytes
    fn to_raw(self) -> Self::Raw;

    /// Attempt to read a value from the front of a slice.
    ///
    /// Returns `None` if the slice is too short.
    fn read(slice: &[u8]) -> Option<Self> {
        Self::Raw::from_slice(slice.get(..Self::RAW_BYTE_LEN)?).map(Self::from_raw)
    }
}

/// A fixed-size byte array holding a big-endian value.
pub trait BeByteArray: Copy + AsRef<[u8]> {
    /// Copy the array from a slice of exactly the right length.
    fn from_slice(slice: &[u8]) -> Option<Self>;
}

impl<const N: usize> BeByteArray for [u8; N] {
    fn from_slice(slice: &[u8]) -> Option<Self> {
        slice.try_into().ok()
    }
}

/// An internal macro for implementing the [`Scalar`] trait for newtypes.
#[macro_export]
macro_rules! newtype_scalar {
    ($name:ident, $raw:ty) => {
        impl $crate::Scalar for $name {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                $crate::Scalar::to_raw(self.0)
            }

            fn from_raw(raw: $raw) -> Self {
                Self($crate::Scalar::from_raw(raw))
            }
        }
    };
}

macro_rules! int_scalar {
    ($ty:ty, $raw:ty) => {
        impl Scalar for $ty {
            type Raw = $raw;
            fn to_raw(self) -> $raw {
                self.to_be_bytes()
            }

            fn from_raw(raw: $raw) -> $ty {
                Self::from_be_bytes(raw)
            }
        }
    };
}

int_scalar!(u8, [u8; 1]);
int_scalar!(i8, [u8; 1]);
int_scalar!(u16, [u8; 2]);
int_scalar!(i16, [u8; 2]);
int_scalar!(u32, [u8; 4]);
int_scalar!(i32, [u8; 4]);
int_scalar!(i64, [u8; 8]);
int_scalar!(crate::Uint24, [u8; 3]);
