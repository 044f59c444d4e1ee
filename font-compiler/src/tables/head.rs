//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use font_types::{Fixed, LongDateTime, MajorMinor, Tag};

use crate::{
    font_data::FontData,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The value of the `magic_number` field; anything else is not a font.
pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// The encoded length of the table.
pub const HEAD_LEN: usize = 54;

/// The offset of `checksum_adjustment` from the start of the table.
pub(crate) const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

bitflags::bitflags! {
    /// The `flags` field of the `head` table.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HeadFlags: u16 {
        /// Baseline for font at y=0.
        const BASELINE_AT_Y_0 = 0x0001;
        /// Left sidebearing point at x=0 (relevant only for TrueType rasterizers).
        const LSB_AT_X_0 = 0x0002;
        /// Instructions may depend on point size.
        const INSTRUCTIONS_DEPEND_ON_PPEM = 0x0004;
        /// Force ppem to integer values for all internal scaler math.
        const FORCE_INTEGER_PPEM = 0x0008;
        /// Instructions may alter advance width.
        const INSTRUCTIONS_ALTER_ADVANCE = 0x0010;
        /// Font data is "lossless" as a result of having been subjected to
        /// optimizing transformation and/or compression.
        const LOSSLESS_TRANSFORMED = 0x0800;
        /// Font converted (produce compatible metrics).
        const CONVERTED = 0x1000;
        /// Font optimized for ClearType.
        const CLEARTYPE_OPTIMIZED = 0x2000;
        /// Last Resort font.
        const LAST_RESORT = 0x4000;
    }
}

bitflags::bitflags! {
    /// The `macStyle` field of the `head` table.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MacStyle: u16 {
        const BOLD = 0x0001;
        const ITALIC = 0x0002;
        const UNDERLINE = 0x0004;
        const OUTLINE = 0x0008;
        const SHADOW = 0x0010;
        const CONDENSED = 0x0020;
        const EXTENDED = 0x0040;
    }
}

/// The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head)
/// (font header) table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Head {
    /// Set by font manufacturer.
    pub font_revision: Fixed,
    /// To compute: set it to 0, sum the entire font as uint32, then store
    /// 0xB1B0AFBA - sum.
    ///
    /// This is written as-is; the assembler is responsible for patching it.
    pub checksum_adjustment: u32,
    pub flags: HeadFlags,
    /// Set to a value from 16 to 16384.
    pub units_per_em: u16,
    /// Number of seconds since 12:00 midnight that started January 1st
    /// 1904 in GMT/UTC time zone.
    pub created: LongDateTime,
    pub modified: LongDateTime,
    /// Minimum x coordinate across all glyph bounding boxes.
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: MacStyle,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated (Set to 2).
    pub font_direction_hint: i16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub index_to_loc_format: i16,
    /// 0 for current format.
    pub glyph_data_format: i16,
}

impl Head {
    /// Build the table for a glyph set.
    ///
    /// `checksum_adjustment` is left at zero.
    pub fn create_table(glyphs: &GlyphSet, settings: &FontSettings) -> Self {
        let bounds = glyphs.font_metrics().bounds;
        let mut mac_style = MacStyle::empty();
        mac_style.set(MacStyle::BOLD, settings.is_bold());
        mac_style.set(MacStyle::ITALIC, settings.is_italic());
        Head {
            font_revision: Fixed::ONE,
            checksum_adjustment: 0,
            flags: HeadFlags::BASELINE_AT_Y_0 | HeadFlags::LSB_AT_X_0,
            units_per_em: settings.units_per_em,
            created: settings.created,
            modified: settings.modified,
            x_min: bounds.x_min,
            y_min: bounds.y_min,
            x_max: bounds.x_max,
            y_max: bounds.y_max,
            mac_style,
            lowest_rec_ppem: 3,
            font_direction_hint: 2,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        }
    }
}

impl TopLevelTable for Head {
    const TAG: Tag = Tag::new(b"head");
}

impl FontWrite for Head {
    fn write_into(&self, writer: &mut TableWriter) {
        MajorMinor::VERSION_1_0.write_into(writer);
        self.font_revision.write_into(writer);
        self.checksum_adjustment.write_into(writer);
        MAGIC_NUMBER.write_into(writer);
        self.flags.bits().write_into(writer);
        self.units_per_em.write_into(writer);
        self.created.write_into(writer);
        self.modified.write_into(writer);
        self.x_min.write_into(writer);
        self.y_min.write_into(writer);
        self.x_max.write_into(writer);
        self.y_max.write_into(writer);
        self.mac_style.bits().write_into(writer);
        self.lowest_rec_ppem.write_into(writer);
        self.font_direction_hint.write_into(writer);
        self.index_to_loc_format.write_into(writer);
        self.glyph_data_format.write_into(writer);
    }
}

impl Validate for Head {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("head", |ctx| {
            ctx.in_field("units_per_em", |ctx| {
                ctx.check_range(self.units_per_em, 16..=16384)
            });
            ctx.in_field("x_min", |ctx| {
                if self.x_min > self.x_max || self.y_min > self.y_max {
                    ctx.report("bounding box has negative extent");
                }
            });
            ctx.in_field("index_to_loc_format", |ctx| {
                ctx.check_range(self.index_to_loc_format, 0..=1)
            });
        })
    }
}

impl FontRead for Head {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        if version.major != 1 {
            return Err(ReadError::InvalidFormat(version.major as _));
        }
        let font_revision = cursor.read()?;
        let checksum_adjustment = cursor.read()?;
        let magic: u32 = cursor.read()?;
        if magic != MAGIC_NUMBER {
            return Err(ReadError::BadMagicNumber(magic));
        }
        Ok(Head {
            font_revision,
            checksum_adjustment,
            flags: HeadFlags::from_bits_retain(cursor.read()?),
            units_per_em: cursor.read()?,
            created: cursor.read()?,
            modified: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
            mac_style: MacStyle::from_bits_retain(cursor.read()?),
            lowest_rec_ppem: cursor.read()?,
            font_direction_hint: cursor.read()?,
            index_to_loc_format: cursor.read()?,
            glyph_data_format: cursor.read()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use font_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    fn reference_table() -> Head {
        Head {
            font_revision: Fixed::ONE,
            checksum_adjustment: 0,
            flags: HeadFlags::BASELINE_AT_Y_0 | HeadFlags::LSB_AT_X_0,
            units_per_em: 1000,
            created: LongDateTime::new(1696396885),
            modified: LongDateTime::new(1696396885),
            x_min: 0,
            y_min: 0,
            x_max: 1000,
            y_max: 1000,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 3,
            font_direction_hint: 2,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        }
    }

    #[test]
    fn compile_reference() {
        let bytes = dump_table(&reference_table()).unwrap();
        assert_eq!(bytes, font_test_data::tables::HEAD);
        assert_eq!(bytes.len(), HEAD_LEN);
    }

    #[test]
    fn parse_reference() {
        let head = Head::read(FontData::new(font_test_data::tables::HEAD)).unwrap();
        assert_eq!(head, reference_table());
    }

    #[test]
    fn bad_magic() {
        let buf = BeBuffer::new()
            .extend([1u16, 0])
            .push(Fixed::ONE)
            .extend([0u32, 0xDEADBEEF])
            .extend([3u16, 1000]);
        assert_eq!(
            Head::read(FontData::new(&buf)),
            Err(ReadError::BadMagicNumber(0xDEADBEEF))
        );
    }

    #[test]
    fn truncated() {
        let data = &font_test_data::tables::HEAD[..40];
        assert_eq!(Head::read(FontData::new(data)), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn style_bits() {
        let settings = FontSettings {
            style_name: "Bold Italic".into(),
            ..Default::default()
        };
        let chars = [crate::glyph::Character::new(".notdef", None, 500.0)];
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let head = Head::create_table(&glyphs, &settings);
        assert_eq!(head.mac_style, MacStyle::BOLD | MacStyle::ITALIC);
        assert_eq!(head.flags.bits(), 3);
        assert_eq!((head.x_min, head.x_max), (0, 0));
    }
}
