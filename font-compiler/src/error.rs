//! Errors that occur while compiling or parsing a font

use crate::{read::ReadError, validate::ValidationReport};

/// An error that aborts compilation or parsing of a font.
///
/// No partially written font is ever returned alongside an error.
#[derive(Debug)]
pub enum Error {
    /// One or more fields were outside their legal range.
    ValidationFailed(ValidationReport),
    /// The input bytes were not a well-formed font.
    Format(ReadError),
    /// A character's codepoint cannot be encoded in a format 4 cmap.
    UnsupportedCodepoint { codepoint: u32, glyph: String },
    /// A structure grew past the size its encoding can address.
    LayoutOverflow(LayoutOverflow),
}

/// A value that does not fit the field or offset width that stores it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutOverflow {
    /// What overflowed, e.g. `"CFF CharStrings INDEX"`
    pub what: &'static str,
    /// The size or count that was required.
    pub value: u64,
    /// The largest size or count that can be encoded.
    pub limit: u64,
}

impl LayoutOverflow {
    pub(crate) fn check(what: &'static str, value: usize, limit: u64) -> Result<(), Error> {
        if value as u64 > limit {
            Err(Error::LayoutOverflow(LayoutOverflow {
                what,
                value: value as u64,
                limit,
            }))
        } else {
            Ok(())
        }
    }
}

impl From<ValidationReport> for Error {
    fn from(src: ValidationReport) -> Error {
        Error::ValidationFailed(src)
    }
}

impl From<ReadError> for Error {
    fn from(src: ReadError) -> Error {
        Error::Format(src)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ValidationFailed(report) => report.fmt(f),
            Error::Format(error) => write!(f, "malformed font: {error}"),
            Error::UnsupportedCodepoint { codepoint, glyph } => write!(
                f,
                "glyph '{glyph}' has codepoint U+{codepoint:04X}, which is outside the BMP"
            ),
            Error::LayoutOverflow(overflow) => overflow.fmt(f),
        }
    }
}

impl std::fmt::Display for LayoutOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} overflowed: {} exceeds the limit of {}",
            self.what, self.value, self.limit
        )
    }
}

impl std::error::Error for LayoutOverflow {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ValidationFailed(report) => Some(report),
            Error::Format(error) => Some(error),
            Error::LayoutOverflow(overflow) => Some(overflow),
            Error::UnsupportedCodepoint { .. } => None,
        }
    }
}
