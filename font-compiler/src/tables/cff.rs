//! The [CFF](https://learn.microsoft.com/en-us/typography/opentype/spec/cff) table
//!
//! A compiled table holds a single font with no subroutines. Its sections
//! are laid out in a fixed order: header, Name INDEX, Top DICT INDEX,
//! String INDEX, an empty Global Subr INDEX, a format 0 charset, the
//! CharStrings INDEX and finally the Private DICT.

mod charset;
pub mod charstring;
mod dict;
mod index;
mod string;

use font_types::{GlyphId, Tag};

use crate::{
    error::{Error, LayoutOverflow},
    font_data::FontData,
    glyph::NOTDEF,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::TableWriter,
};

pub use dict::{PrivateDict, TopDict};
pub use string::{StringId, STANDARD_STRINGS};

use dict::TopDictOffsets;
use index::{offset_size, Index, IndexData};
use string::{StringTable, Strings};

const MAJOR_VERSION: u8 = 1;
const HEADER_LEN: u8 = 4;

/// The longest name allowed in the Name INDEX.
const MAX_FONT_NAME_LEN: usize = 127;

/// Layout stops if the Top DICT has not settled after this many passes.
const MAX_LAYOUT_PASSES: usize = 4;

/// The [CFF](https://learn.microsoft.com/en-us/typography/opentype/spec/cff)
/// (Compact Font Format) table.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cff {
    /// The PostScript name stored in the Name INDEX.
    pub font_name: String,
    pub top_dict: TopDict,
    pub private_dict: PrivateDict,
    /// The charset, as names, indexed by glyph id. The first is `.notdef`.
    pub glyph_names: Vec<String>,
    /// One Type 2 charstring per glyph.
    pub charstrings: Vec<Vec<u8>>,
}

impl Cff {
    /// Build the table, compiling every glyph's outline.
    pub fn create_table(glyphs: &GlyphSet, settings: &FontSettings) -> Result<Self, Error> {
        let font_bbox = settings.font_bbox.unwrap_or_else(|| {
            let bounds = glyphs.font_metrics().bounds;
            [bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max].map(i32::from)
        });
        let scale = 1.0 / settings.units_per_em as f64;
        let top_dict = TopDict {
            version: Some(settings.version.clone()),
            notice: settings.trademark.clone(),
            copyright: settings.copyright.clone(),
            full_name: Some(settings.full_name()),
            family_name: Some(settings.family_name.clone()),
            weight: Some(settings.style_name.clone()),
            font_matrix: [scale, 0.0, 0.0, scale, 0.0, 0.0],
            font_bbox,
            ..Default::default()
        };
        let private_dict = PrivateDict::default();
        let charstrings = glyphs
            .glyphs()
            .map(|glyph| charstring::compile(glyph, private_dict.nominal_width_x))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Cff {
            font_name: settings
                .postscript_name()
                .chars()
                .filter(char::is_ascii_graphic)
                .collect(),
            top_dict,
            private_dict,
            glyph_names: glyphs.postscript_names().to_vec(),
            charstrings,
        })
    }

    pub fn num_glyphs(&self) -> usize {
        self.charstrings.len()
    }

    pub fn glyph_name(&self, gid: GlyphId) -> Option<&str> {
        self.glyph_names.get(gid.to_usize()).map(String::as_str)
    }

    /// Decode the outline of a glyph.
    pub fn outline(&self, gid: GlyphId) -> Result<kurbo::BezPath, ReadError> {
        let mut path = kurbo::BezPath::new();
        charstring::evaluate(self.charstring(gid)?, &mut path)?;
        Ok(path)
    }

    /// The advance width of a glyph, from its charstring and the Private DICT.
    pub fn advance(&self, gid: GlyphId) -> Result<f64, ReadError> {
        let mut path = kurbo::BezPath::new();
        Ok(match charstring::evaluate(self.charstring(gid)?, &mut path)? {
            Some(width) => width + self.private_dict.nominal_width_x,
            None => self.private_dict.default_width_x,
        })
    }

    fn charstring(&self, gid: GlyphId) -> Result<&[u8], ReadError> {
        self.charstrings
            .get(gid.to_usize())
            .map(Vec::as_slice)
            .ok_or(ReadError::OutOfBounds)
    }

    /// Lay out and encode the table.
    ///
    /// The Top DICT holds offsets to the sections that follow it, so it is
    /// re-encoded until the offsets it produces no longer move the sections
    /// they point to.
    pub fn compile(&self) -> Result<Vec<u8>, Error> {
        self.validate()?;

        let name_index = Index::new(vec![self.font_name.as_bytes().to_vec()])?;
        // glyph names get the first custom SIDs
        let mut glyph_strings = StringTable::default();
        let sids = self.glyph_names[1..]
            .iter()
            .map(|name| glyph_strings.intern(name))
            .collect::<Result<Vec<_>, _>>()?;
        let global_subrs = Index::new(Vec::new())?;
        let charset = charset::encode_format_0(&sids);
        let charstrings = Index::new(self.charstrings.clone())?;
        let private_dict = self.private_dict.encode();

        let mut offsets = TopDictOffsets::default();
        for pass in 1..=MAX_LAYOUT_PASSES {
            let mut strings = glyph_strings.clone();
            let top_dict = Index::new(vec![self.top_dict.encode(&mut strings, &offsets)?])?;
            let string_index = strings.to_index()?;

            let charset_offset = HEADER_LEN as usize
                + name_index.len()
                + top_dict.len()
                + string_index.len()
                + global_subrs.len();
            let charstrings_offset = charset_offset + charset.len();
            let private_offset = charstrings_offset + charstrings.len();
            let planned = TopDictOffsets {
                charset: charset_offset,
                charstrings: charstrings_offset,
                private_size: private_dict.len(),
                private_offset,
            };
            log::debug!("CFF layout pass {pass}: {planned:?}");
            if planned != offsets {
                offsets = planned;
                continue;
            }

            let total_len = private_offset + private_dict.len();
            LayoutOverflow::check("CFF table", total_len, i32::MAX as u64)?;
            let mut writer = TableWriter::default();
            writer.write_slice(&[
                MAJOR_VERSION,
                0,
                HEADER_LEN,
                offset_size(private_offset),
            ]);
            for index in [&name_index, &top_dict, &string_index, &global_subrs] {
                writer.write_slice(&index.to_bytes());
            }
            writer.write_slice(&charset);
            writer.write_slice(&charstrings.to_bytes());
            writer.write_slice(&private_dict);
            let bytes = writer.into_data();
            debug_assert_eq!(bytes.len(), total_len);
            log::debug!("CFF: {} glyphs, {} bytes", self.num_glyphs(), bytes.len());
            return Ok(bytes);
        }
        Err(Error::LayoutOverflow(LayoutOverflow {
            what: "CFF layout passes",
            value: MAX_LAYOUT_PASSES as u64 + 1,
            limit: MAX_LAYOUT_PASSES as u64,
        }))
    }
}

impl TopLevelTable for Cff {
    const TAG: Tag = Tag::new(b"CFF ");
}

impl Validate for Cff {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("CFF", |ctx| {
            ctx.in_field("font_name", |ctx| {
                if self.font_name.is_empty() || self.font_name.len() > MAX_FONT_NAME_LEN {
                    ctx.report(format!(
                        "font name must be 1 to {MAX_FONT_NAME_LEN} bytes long"
                    ));
                }
                if !self.font_name.chars().all(|c| c.is_ascii_graphic()) {
                    ctx.report("font name must be printable ASCII");
                }
            });
            ctx.in_field("glyph_names", |ctx| {
                if self.glyph_names.first().map(String::as_str) != Some(NOTDEF) {
                    ctx.report("the first glyph must be .notdef");
                }
                if self.glyph_names.len() != self.charstrings.len() {
                    ctx.report(format!(
                        "{} glyph names for {} charstrings",
                        self.glyph_names.len(),
                        self.charstrings.len()
                    ));
                }
            });
            ctx.in_field("charstrings", |ctx| {
                if self.charstrings.len() > u16::MAX as usize {
                    ctx.report("too many glyphs");
                }
                ctx.in_array(|ctx| {
                    for charstring in &self.charstrings {
                        ctx.array_item(|ctx| {
                            if charstring.is_empty() {
                                ctx.report("charstring is empty");
                            }
                        })
                    }
                })
            });
            ctx.in_field("font_matrix", |ctx| {
                let [xx, xy, yx, yy, _, _] = self.top_dict.font_matrix;
                if xx * yy - xy * yx == 0.0 {
                    ctx.report("font matrix is not invertible");
                }
            });
        })
    }
}

impl FontRead for Cff {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let bytes = data.as_bytes();
        let mut cursor = data.cursor();
        let major: u8 = cursor.read()?;
        if major != MAJOR_VERSION {
            return Err(ReadError::InvalidFormat(major as _));
        }
        let _minor: u8 = cursor.read()?;
        let header_len: u8 = cursor.read()?;

        let name_index = IndexData::read(bytes, header_len as usize)?;
        let top_dict_start = header_len as usize + name_index.size_in_bytes();
        let top_dict_index = IndexData::read(bytes, top_dict_start)?;
        let strings_start = top_dict_start + top_dict_index.size_in_bytes();
        let string_index = IndexData::read(bytes, strings_start)?;
        let global_subrs = IndexData::read(bytes, strings_start + string_index.size_in_bytes())?;
        if global_subrs.count() != 0 {
            log::warn!(
                "CFF has {} global subroutines; calls to them are not supported",
                global_subrs.count()
            );
        }
        if name_index.count() > 1 {
            log::warn!("CFF holds {} fonts, reading the first", name_index.count());
        }

        let font_name = name_index.get(0)?.iter().map(|b| *b as char).collect();
        let strings = Strings::new(string_index);
        let (top_dict, offsets) = TopDict::parse(top_dict_index.get(0)?, &strings)?;
        let private_dict = if offsets.private_size == 0 {
            PrivateDict::default()
        } else {
            PrivateDict::parse(data.bytes_at(offsets.private_offset, offsets.private_size)?)?
        };

        let charstring_index = IndexData::read(bytes, offsets.charstrings)?;
        let charstrings = charstring_index
            .iter()
            .map(|charstring| charstring.map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        let glyph_names = charset::read(bytes, offsets.charset, charstrings.len())?
            .into_iter()
            .map(|sid| strings.get(sid))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Cff {
            font_name,
            top_dict,
            private_dict,
            glyph_names,
            charstrings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        glyph::Character,
        tests::{fixture_characters, fixture_settings},
    };
    use kurbo::{Line, PathEl, PathSeg};
    use pretty_assertions::assert_eq;

    fn fixture_cff() -> Cff {
        let characters = fixture_characters();
        let settings = fixture_settings();
        let glyphs = GlyphSet::new(&characters, &settings).unwrap();
        Cff::create_table(&glyphs, &settings).unwrap()
    }

    #[test]
    fn compile_reference() {
        let _ = env_logger::builder().is_test(true).try_init();
        let cff = fixture_cff();
        assert_eq!(cff.font_name, "TestMedium");
        assert_eq!(cff.glyph_names, [".notdef", "a"]);
        assert_eq!(cff.top_dict.font_matrix, dict::DEFAULT_FONT_MATRIX);
        assert_eq!(cff.compile().unwrap(), font_test_data::tables::CFF);
    }

    #[test]
    fn parse_reference() {
        let cff = Cff::read(FontData::new(font_test_data::tables::CFF)).unwrap();
        assert_eq!(cff, fixture_cff());
        assert_eq!(cff.top_dict.version.as_deref(), Some("Version 0.1"));
        assert_eq!(cff.top_dict.full_name.as_deref(), Some("Test Medium"));
        assert_eq!(cff.top_dict.weight.as_deref(), Some("Medium"));
        assert_eq!(cff.top_dict.font_bbox, [0, 0, 800, 500]);
        assert_eq!(cff.glyph_name(GlyphId::new(1)), Some("a"));
        assert_eq!(cff.advance(GlyphId::new(1)), Ok(500.0));

        let notdef = cff.outline(GlyphId::NOTDEF).unwrap();
        assert!(notdef.elements().is_empty());
        let outline = cff.outline(GlyphId::new(1)).unwrap();
        assert_eq!(outline.elements()[0], PathEl::MoveTo((386.0, 512.0).into()));
        assert_eq!(outline.elements().len(), 5);
        assert_eq!(cff.outline(GlyphId::new(2)), Err(ReadError::OutOfBounds));
    }

    #[test]
    fn private_dict_is_written() {
        let bytes = fixture_cff().compile().unwrap();
        let name_index = IndexData::read(&bytes, bytes[2] as usize).unwrap();
        let top_dict_start = bytes[2] as usize + name_index.size_in_bytes();
        let top_dict_index = IndexData::read(&bytes, top_dict_start).unwrap();
        let strings_start = top_dict_start + top_dict_index.size_in_bytes();
        let strings = Strings::new(IndexData::read(&bytes, strings_start).unwrap());
        let (_, offsets) = TopDict::parse(top_dict_index.get(0).unwrap(), &strings).unwrap();
        assert_eq!(offsets.private_size, 4);
        assert_eq!(offsets.private_offset + 4, bytes.len());
        assert_eq!(&bytes[offsets.private_offset..], [0x8B, 0x14, 0x8B, 0x15]);
    }

    #[test]
    fn non_default_values() {
        let mut cff = fixture_cff();
        cff.top_dict.notice = Some("Test is a trademark".into());
        cff.top_dict.copyright = Some("© nobody".into());
        cff.top_dict.italic_angle = -12.5;
        cff.top_dict.is_fixed_pitch = true;
        cff.top_dict.font_matrix = [0.0005, 0.0, 0.0, 0.0005, 0.0, 0.0];
        cff.private_dict.nominal_width_x = 480.0;
        cff.private_dict.default_width_x = 500.0;
        let bytes = cff.compile().unwrap();

        let loaded = Cff::read(FontData::new(&bytes)).unwrap();
        assert_eq!(loaded.top_dict, cff.top_dict);
        assert_eq!(loaded.private_dict, cff.private_dict);
        // the stored charstrings still carry widths relative to zero
        assert_eq!(loaded.advance(GlyphId::new(1)), Ok(980.0));
    }

    #[test]
    fn shared_strings() {
        let mut cff = fixture_cff();
        // a glyph name that is also a Top DICT string is stored once
        cff.glyph_names[1] = "Medium".into();
        let bytes = cff.compile().unwrap();
        let loaded = Cff::read(FontData::new(&bytes)).unwrap();
        assert_eq!(loaded.glyph_names[1], "Medium");
        assert_eq!(loaded.top_dict.weight.as_deref(), Some("Medium"));
        assert_eq!(bytes.len(), font_test_data::tables::CFF.len() - 2);
    }

    #[test]
    fn wide_offsets() {
        let settings = fixture_settings();
        let mut characters = fixture_characters();
        for i in 0..300u32 {
            let x = i as f64;
            characters.push(
                Character::new(format!("g{i}"), Some(0x100 + i), 600.0).with_contour(vec![
                    PathSeg::Line(Line::new((x, 0.0), (x + 400.0, 0.0))),
                    PathSeg::Line(Line::new((x + 400.0, 0.0), (x, 700.0))),
                    PathSeg::Line(Line::new((x, 700.0), (x, 0.0))),
                ]),
            );
        }
        let glyphs = GlyphSet::new(&characters, &settings).unwrap();
        let cff = Cff::create_table(&glyphs, &settings).unwrap();
        let bytes = cff.compile().unwrap();
        // header offSize covers the Private DICT offset
        assert_eq!(bytes[3], 2);
        let loaded = Cff::read(FontData::new(&bytes)).unwrap();
        assert_eq!(loaded.num_glyphs(), 302);
        assert_eq!(loaded.glyph_names[301], "g299");
        assert_eq!(loaded.charstrings, cff.charstrings);
        assert_eq!(
            loaded.outline(GlyphId::new(301)).unwrap().elements()[1],
            PathEl::LineTo((699.0, 0.0).into())
        );
    }

    #[test]
    fn validation() {
        let mut cff = fixture_cff();
        cff.glyph_names.swap(0, 1);
        cff.charstrings.pop();
        cff.font_name = "Test Medium".into();
        let Err(Error::ValidationFailed(report)) = cff.compile() else {
            panic!("expected a validation error");
        };
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn bad_version() {
        let mut bytes = font_test_data::tables::CFF.to_vec();
        bytes[0] = 2;
        assert_eq!(
            Cff::read(FontData::new(&bytes)),
            Err(ReadError::InvalidFormat(2))
        );
    }
}
