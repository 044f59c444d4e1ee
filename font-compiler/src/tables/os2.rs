//! The [os2](https://docs.microsoft.com/en-us/typography/opentype/spec/os2) table

use std::cmp::Ordering;

use font_types::{GlyphId, Tag};

use crate::{
    font_data::FontData,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    round::OtRound,
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The version written by this crate.
const VERSION: u16 = 3;

/// Glyphs whose height is used for `sxHeight`, in order of preference.
const X_HEIGHT_CHARS: &str = "xyvw";

/// Glyphs whose height is used for `sCapHeight`, in order of preference.
const CAP_HEIGHT_CHARS: &str = "HIKLEFJMNTZBDPRAGOQSUVWXY";

bitflags::bitflags! {
    /// Embedding permissions, the `fsType` field.
    ///
    /// The empty set means the font is installable.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FsType: u16 {
        const RESTRICTED_LICENSE = 0x0002;
        const PREVIEW_AND_PRINT = 0x0004;
        const EDITABLE = 0x0008;
        const NO_SUBSETTING = 0x0100;
        const BITMAP_ONLY = 0x0200;
    }
}

bitflags::bitflags! {
    /// The `fsSelection` field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SelectionFlags: u16 {
        const ITALIC = 0x0001;
        const UNDERSCORE = 0x0002;
        const NEGATIVE = 0x0004;
        const OUTLINED = 0x0008;
        const STRIKEOUT = 0x0010;
        const BOLD = 0x0020;
        const REGULAR = 0x0040;
        const USE_TYPO_METRICS = 0x0080;
        const WWS = 0x0100;
        const OBLIQUE = 0x0200;
    }
}

/// The [OS/2](https://docs.microsoft.com/en-us/typography/opentype/spec/os2)
/// (OS/2 and Windows Metrics) table, version 3.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Os2 {
    /// The Average Character Width parameter specifies the arithmetic
    /// average of the escapement (width) of all non-zero width glyphs in
    /// the font.
    pub x_avg_char_width: i16,
    /// Indicates the visual weight (degree of blackness or thickness of
    /// strokes) of the characters in the font. Values from 1 to 1000 are
    /// valid.
    pub us_weight_class: u16,
    /// Indicates a relative change from the normal aspect ratio
    /// (width-to-height ratio) as specified by a font designer for the
    /// glyphs in a font.
    pub us_width_class: u16,
    pub fs_type: FsType,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    /// PANOSE classification number.
    pub panose_10: [u8; 10],
    /// `ulUnicodeRange1` through `ulUnicodeRange4`.
    pub ul_unicode_range: [u32; 4],
    /// Font Vendor Identification.
    pub ach_vend_id: Tag,
    pub fs_selection: SelectionFlags,
    /// The minimum Unicode index (character code) in this font.
    pub us_first_char_index: u16,
    /// The maximum Unicode index (character code) in this font.
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// `ulCodePageRange1` and `ulCodePageRange2`.
    pub ul_code_page_range: [u32; 2],
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

impl Os2 {
    /// Build the table for a glyph set.
    pub fn create_table(glyphs: &GlyphSet, settings: &FontSettings) -> Self {
        let map = glyphs.map();
        let font_metrics = glyphs.font_metrics();

        let mut ul_unicode_range = [0u32; 4];
        let mut first_char = None;
        let mut last_char = 0;
        for (cp, _) in map.mappings().filter(|(_, gid)| *gid != GlyphId::NOTDEF) {
            if let Some(bit) = unicode_range_bit(cp) {
                ul_unicode_range[bit as usize / 32] |= 1 << (bit % 32);
            }
            if cp > 0 {
                first_char = first_char.or(Some(cp));
                last_char = cp;
            }
        }

        let height_of = |chars: &str| {
            chars
                .chars()
                .find_map(|c| map.glyph_id_for_codepoint(c as u32))
                .map(|gid| {
                    glyphs.metrics()[gid.to_usize()]
                        .bounds
                        .map(|b| b.y_max)
                        .unwrap_or_default()
                })
        };
        let has_space = map.glyph_id_for_codepoint(0x20).is_some();

        let mut fs_selection = SelectionFlags::empty();
        fs_selection.set(SelectionFlags::BOLD, settings.is_bold());
        fs_selection.set(SelectionFlags::ITALIC, settings.is_italic());
        if fs_selection.is_empty() {
            fs_selection = SelectionFlags::REGULAR;
        }

        Os2 {
            x_avg_char_width: font_metrics.avg_char_width,
            us_weight_class: settings.weight_class,
            us_width_class: settings.width_class,
            fs_type: settings.fs_type,
            y_subscript_x_size: 650,
            y_subscript_y_size: 699,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 140,
            y_superscript_x_size: 650,
            y_superscript_y_size: 699,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 479,
            y_strikeout_size: 49,
            y_strikeout_position: 258,
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range,
            ach_vend_id: settings.vendor_id,
            fs_selection,
            us_first_char_index: first_char.unwrap_or_default().min(0xFFFF) as u16,
            us_last_char_index: last_char.min(0xFFFF) as u16,
            s_typo_ascender: settings.ascender,
            s_typo_descender: settings.descender,
            s_typo_line_gap: settings.line_gap,
            us_win_ascent: settings.units_per_em,
            us_win_descent: font_metrics.bounds.y_min.unsigned_abs(),
            ul_code_page_range: settings.code_page_ranges.unwrap_or([1, 0]),
            sx_height: height_of(X_HEIGHT_CHARS)
                .unwrap_or_else(|| (settings.ascender as f64 / 2.0).ot_round()),
            s_cap_height: height_of(CAP_HEIGHT_CHARS).unwrap_or(settings.ascender),
            us_default_char: if has_space { 0x20 } else { 0 },
            us_break_char: if has_space { 0x20 } else { 0 },
            us_max_context: 0,
        }
    }
}

impl TopLevelTable for Os2 {
    const TAG: Tag = Tag::new(b"OS/2");
}

impl FontWrite for Os2 {
    fn write_into(&self, writer: &mut TableWriter) {
        VERSION.write_into(writer);
        self.x_avg_char_width.write_into(writer);
        self.us_weight_class.write_into(writer);
        self.us_width_class.write_into(writer);
        self.fs_type.bits().write_into(writer);
        self.y_subscript_x_size.write_into(writer);
        self.y_subscript_y_size.write_into(writer);
        self.y_subscript_x_offset.write_into(writer);
        self.y_subscript_y_offset.write_into(writer);
        self.y_superscript_x_size.write_into(writer);
        self.y_superscript_y_size.write_into(writer);
        self.y_superscript_x_offset.write_into(writer);
        self.y_superscript_y_offset.write_into(writer);
        self.y_strikeout_size.write_into(writer);
        self.y_strikeout_position.write_into(writer);
        self.s_family_class.write_into(writer);
        self.panose_10.write_into(writer);
        self.ul_unicode_range.write_into(writer);
        self.ach_vend_id.write_into(writer);
        self.fs_selection.bits().write_into(writer);
        self.us_first_char_index.write_into(writer);
        self.us_last_char_index.write_into(writer);
        self.s_typo_ascender.write_into(writer);
        self.s_typo_descender.write_into(writer);
        self.s_typo_line_gap.write_into(writer);
        self.us_win_ascent.write_into(writer);
        self.us_win_descent.write_into(writer);
        self.ul_code_page_range.write_into(writer);
        self.sx_height.write_into(writer);
        self.s_cap_height.write_into(writer);
        self.us_default_char.write_into(writer);
        self.us_break_char.write_into(writer);
        self.us_max_context.write_into(writer);
    }
}

impl Validate for Os2 {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("OS/2", |ctx| {
            ctx.in_field("ach_vend_id", |ctx| {
                if let Err(e) = Tag::new_checked(&self.ach_vend_id.to_be_bytes()) {
                    ctx.report(e);
                }
            });
            ctx.in_field("fs_selection", |ctx| {
                if self.fs_selection.contains(SelectionFlags::REGULAR)
                    && self
                        .fs_selection
                        .intersects(SelectionFlags::BOLD | SelectionFlags::ITALIC)
                {
                    ctx.report("REGULAR cannot be combined with BOLD or ITALIC");
                }
            });
            ctx.in_field("us_first_char_index", |ctx| {
                if self.us_first_char_index > self.us_last_char_index {
                    ctx.report("first char index is greater than last char index");
                }
            });
        })
    }
}

impl FontRead for Os2 {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        match version {
            0 | 1 => return Err(ReadError::InvalidFormat(version as _)),
            VERSION => (),
            // the later fields of versions 4 and 5 are not needed
            _ => log::warn!("reading OS/2 version {version} with the version {VERSION} layout"),
        }
        Ok(Os2 {
            x_avg_char_width: cursor.read()?,
            us_weight_class: cursor.read()?,
            us_width_class: cursor.read()?,
            fs_type: FsType::from_bits_retain(cursor.read()?),
            y_subscript_x_size: cursor.read()?,
            y_subscript_y_size: cursor.read()?,
            y_subscript_x_offset: cursor.read()?,
            y_subscript_y_offset: cursor.read()?,
            y_superscript_x_size: cursor.read()?,
            y_superscript_y_size: cursor.read()?,
            y_superscript_x_offset: cursor.read()?,
            y_superscript_y_offset: cursor.read()?,
            y_strikeout_size: cursor.read()?,
            y_strikeout_position: cursor.read()?,
            s_family_class: cursor.read()?,
            panose_10: cursor
                .read_bytes(10)?
                .try_into()
                .map_err(|_| ReadError::OutOfBounds)?,
            ul_unicode_range: [cursor.read()?, cursor.read()?, cursor.read()?, cursor.read()?],
            ach_vend_id: cursor.read()?,
            fs_selection: SelectionFlags::from_bits_retain(cursor.read()?),
            us_first_char_index: cursor.read()?,
            us_last_char_index: cursor.read()?,
            s_typo_ascender: cursor.read()?,
            s_typo_descender: cursor.read()?,
            s_typo_line_gap: cursor.read()?,
            us_win_ascent: cursor.read()?,
            us_win_descent: cursor.read()?,
            ul_code_page_range: [cursor.read()?, cursor.read()?],
            sx_height: cursor.read()?,
            s_cap_height: cursor.read()?,
            us_default_char: cursor.read()?,
            us_break_char: cursor.read()?,
            us_max_context: cursor.read()?,
        })
    }
}

/// The `ulUnicodeRange` bit for a codepoint, if it falls in a known block.
pub fn unicode_range_bit(cp: u32) -> Option<u8> {
    UNICODE_RANGES
        .binary_search_by(|&(first, last, _)| {
            if cp < first {
                Ordering::Greater
            } else if cp <= last {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        })
        .ok()
        .map(|i| UNICODE_RANGES[i].2)
}

/// `(first, last, bit)` for every Unicode block with a range bit, sorted by
/// first codepoint.
#[rustfmt::skip]
static UNICODE_RANGES: &[(u32, u32, u8)] = &[
    (0x0000, 0x007F, 0),
    (0x0080, 0x00FF, 1),
    (0x0100, 0x017F, 2),
    (0x0180, 0x024F, 3),
    (0x0250, 0x02AF, 4),
    (0x02B0, 0x02FF, 5),
    (0x0300, 0x036F, 6),
    (0x0370, 0x03FF, 7),
    (0x0400, 0x04FF, 9),
    (0x0530, 0x058F, 10),
    (0x0590, 0x05FF, 11),
    (0x0600, 0x06FF, 13),
    (0x0700, 0x074F, 71),
    (0x0780, 0x07BF, 72),
    (0x07C0, 0x07FF, 14),
    (0x0900, 0x097F, 15),
    (0x0980, 0x09FF, 16),
    (0x0A00, 0x0A7F, 17),
    (0x0A80, 0x0AFF, 18),
    (0x0B00, 0x0B7F, 19),
    (0x0B80, 0x0BFF, 20),
    (0x0C00, 0x0C7F, 21),
    (0x0C80, 0x0CFF, 22),
    (0x0D00, 0x0D7F, 23),
    (0x0D80, 0x0DFF, 73),
    (0x0E00, 0x0E7F, 24),
    (0x0E80, 0x0EFF, 25),
    (0x0F00, 0x0FFF, 70),
    (0x1000, 0x109F, 74),
    (0x10A0, 0x10FF, 26),
    (0x1100, 0x11FF, 28),
    (0x1200, 0x137F, 75),
    (0x13A0, 0x13FF, 76),
    (0x1400, 0x167F, 77),
    (0x1680, 0x169F, 78),
    (0x16A0, 0x16FF, 79),
    (0x1700, 0x171F, 84),
    (0x1780, 0x17FF, 80),
    (0x1800, 0x18AF, 81),
    (0x1900, 0x194F, 93),
    (0x1950, 0x197F, 94),
    (0x1980, 0x19DF, 95),
    (0x1A00, 0x1A1F, 96),
    (0x1B00, 0x1B7F, 27),
    (0x1B80, 0x1BBF, 112),
    (0x1C00, 0x1C4F, 113),
    (0x1C50, 0x1C7F, 114),
    (0x1E00, 0x1EFF, 29),
    (0x1F00, 0x1FFF, 30),
    (0x2000, 0x206F, 31),
    (0x2070, 0x209F, 32),
    (0x20A0, 0x20CF, 33),
    (0x20D0, 0x20FF, 34),
    (0x2100, 0x214F, 35),
    (0x2150, 0x218F, 36),
    (0x2190, 0x21FF, 37),
    (0x2200, 0x22FF, 38),
    (0x2300, 0x23FF, 39),
    (0x2400, 0x243F, 40),
    (0x2440, 0x245F, 41),
    (0x2460, 0x24FF, 42),
    (0x2500, 0x257F, 43),
    (0x2580, 0x259F, 44),
    (0x25A0, 0x25FF, 45),
    (0x2600, 0x26FF, 46),
    (0x2700, 0x27BF, 47),
    (0x2800, 0x28FF, 82),
    (0x2C00, 0x2C5F, 97),
    (0x2C80, 0x2CFF, 8),
    (0x2D30, 0x2D7F, 98),
    (0x3000, 0x303F, 48),
    (0x3040, 0x309F, 49),
    (0x30A0, 0x30FF, 50),
    (0x3100, 0x312F, 51),
    (0x3130, 0x318F, 52),
    (0x31C0, 0x31EF, 61),
    (0x3200, 0x32FF, 54),
    (0x3300, 0x33FF, 55),
    (0x4DC0, 0x4DFF, 99),
    (0x4E00, 0x9FFF, 59),
    (0xA000, 0xA48F, 83),
    (0xA500, 0xA63F, 12),
    (0xA800, 0xA82F, 100),
    (0xA840, 0xA87F, 53),
    (0xA880, 0xA8DF, 115),
    (0xA900, 0xA92F, 116),
    (0xA930, 0xA95F, 117),
    (0xAA00, 0xAA5F, 118),
    (0xAC00, 0xD7AF, 56),
    (0xD800, 0xDFFF, 57),
    (0xE000, 0xF8FF, 60),
    (0xFB00, 0xFB4F, 62),
    (0xFB50, 0xFDFF, 63),
    (0xFE00, 0xFE0F, 91),
    (0xFE10, 0xFE1F, 65),
    (0xFE20, 0xFE2F, 64),
    (0xFE50, 0xFE6F, 66),
    (0xFE70, 0xFEFF, 67),
    (0xFF00, 0xFFEF, 68),
    (0xFFF0, 0xFFFF, 69),
    (0x10000, 0x1007F, 101),
    (0x10140, 0x1018F, 102),
    (0x10190, 0x101CF, 119),
    (0x101D0, 0x101FF, 120),
    (0x102A0, 0x102DF, 121),
    (0x10300, 0x1032F, 85),
    (0x10330, 0x1034F, 86),
    (0x10380, 0x1039F, 103),
    (0x103A0, 0x103DF, 104),
    (0x10400, 0x1044F, 87),
    (0x10450, 0x1047F, 105),
    (0x10480, 0x104AF, 106),
    (0x10800, 0x1083F, 107),
    (0x10900, 0x1091F, 58),
    (0x10A00, 0x10A5F, 108),
    (0x12000, 0x123FF, 110),
    (0x1D000, 0x1D0FF, 88),
    (0x1D300, 0x1D35F, 109),
    (0x1D360, 0x1D37F, 111),
    (0x1D400, 0x1D7FF, 89),
    (0x1F030, 0x1F09F, 122),
    (0xE0000, 0xE007F, 92),
    (0xFF000, 0xFFFFD, 90),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{glyph::Character, write::dump_table};
    use kurbo::{Line, PathSeg};
    use pretty_assertions::assert_eq;

    fn reference_table() -> Os2 {
        Os2 {
            x_avg_char_width: 1000,
            us_weight_class: 0,
            us_width_class: 0,
            fs_type: FsType::empty(),
            y_subscript_x_size: 650,
            y_subscript_y_size: 699,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 140,
            y_superscript_x_size: 650,
            y_superscript_y_size: 699,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 479,
            y_strikeout_size: 49,
            y_strikeout_position: 258,
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range: [0; 4],
            ach_vend_id: Tag::new(b"XXXX"),
            fs_selection: SelectionFlags::empty(),
            us_first_char_index: 0,
            us_last_char_index: 0,
            s_typo_ascender: 800,
            s_typo_descender: -200,
            s_typo_line_gap: 0,
            us_win_ascent: 1000,
            us_win_descent: 0,
            ul_code_page_range: [1, 0],
            sx_height: 0,
            s_cap_height: 0,
            us_default_char: 0,
            us_break_char: 0,
            us_max_context: 0,
        }
    }

    #[test]
    fn compile_reference() {
        let bytes = dump_table(&reference_table()).unwrap();
        assert_eq!(bytes, font_test_data::tables::OS2);
        assert_eq!(bytes.len(), 96);
    }

    #[test]
    fn parse_reference() {
        let os2 = Os2::read(FontData::new(font_test_data::tables::OS2)).unwrap();
        assert_eq!(os2, reference_table());
    }

    #[test]
    fn range_bits() {
        assert_eq!(unicode_range_bit(0x0), Some(0));
        assert_eq!(unicode_range_bit(0x0042), Some(0));
        assert_eq!(unicode_range_bit(0x007F), Some(0));
        assert_eq!(unicode_range_bit(0x0080), Some(1));
        assert_eq!(unicode_range_bit(0x2C80), Some(8));
        assert_eq!(unicode_range_bit(0x30B1), Some(50));
        assert_eq!(unicode_range_bit(0x4E16), Some(59));
        assert_eq!(unicode_range_bit(0x1F030), Some(122));
        assert_eq!(unicode_range_bit(0x0860), None);
        assert_eq!(unicode_range_bit(0x110000), None);
    }

    #[test]
    fn cjk_sets_range_2() {
        let chars = [
            Character::new(".notdef", Some(0), 500.0),
            Character::new("世", Some(0x4E16), 500.0),
        ];
        let settings = FontSettings::default();
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let os2 = Os2::create_table(&glyphs, &settings);
        assert_eq!(os2.ul_unicode_range, [0, 1 << 27, 0, 0]);
        assert_eq!(os2.us_first_char_index, 0x4E16);
        assert_eq!(os2.us_last_char_index, 0x4E16);
    }

    #[test]
    fn derived_heights() {
        let bar = |name: &str, cp: char, height: f64| {
            Character::new(name, Some(cp as u32), 500.0).with_contour(vec![
                PathSeg::Line(Line::new((0.0, -10.0), (100.0, height))),
                PathSeg::Line(Line::new((100.0, height), (0.0, -10.0))),
            ])
        };
        let chars = [
            Character::new(".notdef", None, 500.0),
            Character::new("space", Some(0x20), 250.0),
            bar("y", 'y', 480.0),
            bar("x", 'x', 500.0),
            bar("O", 'O', 710.0),
            bar("H", 'H', 700.0),
        ];
        let settings = FontSettings {
            style_name: "Bold".into(),
            ..Default::default()
        };
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let os2 = Os2::create_table(&glyphs, &settings);
        assert_eq!(os2.sx_height, 500);
        assert_eq!(os2.s_cap_height, 700);
        assert_eq!(os2.us_default_char, 0x20);
        assert_eq!(os2.us_break_char, 0x20);
        assert_eq!(os2.us_first_char_index, 0x20);
        assert_eq!(os2.us_last_char_index, 0x79);
        assert_eq!(os2.us_win_descent, 10);
        assert_eq!(os2.fs_selection, SelectionFlags::BOLD);
        assert_eq!(os2.ul_unicode_range, [1, 0, 0, 0]);
        assert_eq!(os2.x_avg_char_width, 458);
        assert!(os2.validate().is_ok());
    }

    #[test]
    fn fallback_heights() {
        let chars = [Character::new(".notdef", None, 500.0)];
        let settings = FontSettings::default();
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let os2 = Os2::create_table(&glyphs, &settings);
        assert_eq!(os2.sx_height, 400);
        assert_eq!(os2.s_cap_height, 800);
        assert_eq!(os2.us_default_char, 0);
        assert_eq!(os2.fs_selection, SelectionFlags::REGULAR);
        assert_eq!(os2.ul_code_page_range, [1, 0]);
    }

    #[test]
    fn later_versions_are_read() {
        let mut bytes = font_test_data::tables::OS2.to_vec();
        bytes[1] = 4;
        let os2 = Os2::read(FontData::new(&bytes)).unwrap();
        assert_eq!(os2, reference_table());
        bytes[1] = 1;
        assert_eq!(
            Os2::read(FontData::new(&bytes)),
            Err(ReadError::InvalidFormat(1))
        );
    }
}
