//! Traits for interpreting font data

use font_types::Tag;

use crate::font_data::FontData;

/// A type that can be read from raw table data.
///
/// This trait is implemented for all font tables that are self-describing: that
/// is, tables that do not require any external state in order to interpret their
/// underlying bytes. (Tables that require external state implement
/// [`FontReadWithArgs`] instead)
pub trait FontRead: Sized {
    /// Read an instance of `Self` from the provided data, performing validation.
    ///
    /// Implementations check magic numbers and versions and ensure array
    /// lengths are in bounds. A failure never yields a partially
    /// populated value.
    fn read(data: FontData) -> Result<Self, ReadError>;
}

/// A trait for types that require external data in order to be constructed.
///
/// `hmtx` is the canonical example: it cannot be decoded without the
/// metric count from `hhea` and the glyph count from `maxp`.
pub trait FontReadWithArgs: Sized {
    /// The arguments needed to read this type.
    type Args;

    /// Read an item, using the provided args.
    fn read_with_args(data: FontData, args: &Self::Args) -> Result<Self, ReadError>;
}

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    OutOfBounds,
    // i64 is flexible enough to store any value we might encounter
    InvalidFormat(i64),
    InvalidSfnt(u32),
    BadMagicNumber(u32),
    TableIsMissing(Tag),
    DuplicateTable(Tag),
    MalformedData(&'static str),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::OutOfBounds => write!(f, "An offset was out of bounds"),
            ReadError::InvalidFormat(x) => write!(f, "Invalid format '{x}'"),
            ReadError::InvalidSfnt(ver) => write!(f, "Invalid sfnt version 0x{ver:08X}"),
            ReadError::BadMagicNumber(magic) => {
                write!(f, "Invalid head magic number 0x{magic:08X}")
            }
            ReadError::TableIsMissing(tag) => write!(f, "the {tag} table is missing"),
            ReadError::DuplicateTable(tag) => write!(f, "the {tag} table appears twice"),
            ReadError::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
        }
    }
}

impl std::error::Error for ReadError {}
