//! Name identifiers

use std::fmt;

/// Identifier for an informational string in the `name` table.
///
/// The predefined ids written by the compiler are provided as associated
/// constants. See <https://learn.microsoft.com/en-us/typography/opentype/spec/name#name-ids>
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameId(u16);

impl NameId {
    /// Copyright notice.
    pub const COPYRIGHT_NOTICE: Self = Self(0);
    /// Font family name.
    pub const FAMILY_NAME: Self = Self(1);
    /// Font subfamily name, such as "Regular" or "Bold".
    pub const SUBFAMILY_NAME: Self = Self(2);
    /// Unique font identifier.
    pub const UNIQUE_ID: Self = Self(3);
    /// Full font name; family and subfamily joined by a space.
    pub const FULL_NAME: Self = Self(4);
    /// Version string, "Version <number>.<number>".
    pub const VERSION_STRING: Self = Self(5);
    /// PostScript name: printable ASCII, no spaces, at most 63 characters.
    pub const POSTSCRIPT_NAME: Self = Self(6);
    /// Trademark notice.
    pub const TRADEMARK: Self = Self(7);
    /// Manufacturer name.
    pub const MANUFACTURER: Self = Self(8);
    /// Name of the designer of the typeface.
    pub const DESIGNER: Self = Self(9);
    /// Description of the typeface.
    pub const DESCRIPTION: Self = Self(10);
    /// URL of the font vendor.
    pub const VENDOR_URL: Self = Self(11);
    /// URL of the typeface designer.
    pub const DESIGNER_URL: Self = Self(12);
    /// License description.
    pub const LICENSE_DESCRIPTION: Self = Self(13);
    /// URL where the license terms can be found.
    pub const LICENSE_URL: Self = Self(14);
    /// Typographic family name.
    pub const TYPOGRAPHIC_FAMILY_NAME: Self = Self(16);
    /// Typographic subfamily name.
    pub const TYPOGRAPHIC_SUBFAMILY_NAME: Self = Self(17);

    /// Create a new identifier from a raw u16 value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Return the identifier as a u16.
    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameId({})", self.0)
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

crate::newtype_scalar!(NameId, [u8; 2]);
