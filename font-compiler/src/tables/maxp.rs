//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use font_types::{Tag, Version16Dot16};

use crate::{
    font_data::FontData,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp)
/// (maximum profile) table.
///
/// Fonts with CFF outlines use version 0.5, which only stores the glyph
/// count. Version 1.0 is read and written for TrueType fonts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maxp {
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// The extra fields of a version 1.0 table.
    pub truetype_profile: Option<TrueTypeProfile>,
}

/// The fields only present in version 1.0 of the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrueTypeProfile {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl Maxp {
    /// Build the version 0.5 table for a glyph set.
    pub fn create_table(glyphs: &GlyphSet) -> Self {
        Maxp {
            num_glyphs: glyphs.num_glyphs(),
            truetype_profile: None,
        }
    }

    fn compute_version(&self) -> Version16Dot16 {
        if self.truetype_profile.is_some() {
            Version16Dot16::VERSION_1_0
        } else {
            Version16Dot16::VERSION_0_5
        }
    }
}

impl TopLevelTable for Maxp {
    const TAG: Tag = Tag::new(b"maxp");
}

impl FontWrite for Maxp {
    fn write_into(&self, writer: &mut TableWriter) {
        self.compute_version().write_into(writer);
        self.num_glyphs.write_into(writer);
        if let Some(profile) = &self.truetype_profile {
            [
                profile.max_points,
                profile.max_contours,
                profile.max_composite_points,
                profile.max_composite_contours,
                profile.max_zones,
                profile.max_twilight_points,
                profile.max_storage,
                profile.max_function_defs,
                profile.max_instruction_defs,
                profile.max_stack_elements,
                profile.max_size_of_instructions,
                profile.max_component_elements,
                profile.max_component_depth,
            ]
            .write_into(writer);
        }
    }
}

impl Validate for Maxp {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("maxp", |ctx| {
            ctx.in_field("num_glyphs", |ctx| {
                if self.num_glyphs == 0 {
                    ctx.report("a font needs at least the .notdef glyph");
                }
            });
            if let Some(profile) = &self.truetype_profile {
                ctx.in_field("max_zones", |ctx| ctx.check_range(profile.max_zones, 1..=2));
            }
        })
    }
}

impl FontRead for Maxp {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: Version16Dot16 = cursor.read()?;
        let num_glyphs = cursor.read()?;
        let truetype_profile = match version {
            Version16Dot16::VERSION_0_5 => None,
            Version16Dot16::VERSION_1_0 => {
                let fields: Vec<u16> = cursor.read_array(13)?;
                Some(TrueTypeProfile {
                    max_points: fields[0],
                    max_contours: fields[1],
                    max_composite_points: fields[2],
                    max_composite_contours: fields[3],
                    max_zones: fields[4],
                    max_twilight_points: fields[5],
                    max_storage: fields[6],
                    max_function_defs: fields[7],
                    max_instruction_defs: fields[8],
                    max_stack_elements: fields[9],
                    max_size_of_instructions: fields[10],
                    max_component_elements: fields[11],
                    max_component_depth: fields[12],
                })
            }
            other => return Err(ReadError::InvalidFormat(other.to_bits() as _)),
        };
        Ok(Maxp {
            num_glyphs,
            truetype_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use font_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn maxp_05() {
        let maxp = Maxp {
            num_glyphs: 2,
            truetype_profile: None,
        };
        let dumped = dump_table(&maxp).unwrap();
        assert_eq!(dumped, font_test_data::tables::MAXP);
        let loaded = Maxp::read(FontData::new(&dumped)).unwrap();
        assert_eq!(loaded, maxp);
    }

    #[test]
    fn maxp_10() {
        let maxp = Maxp {
            num_glyphs: 5,
            truetype_profile: Some(TrueTypeProfile {
                max_points: 6,
                max_contours: 7,
                max_zones: 2,
                max_component_depth: 18,
                ..Default::default()
            }),
        };
        let dumped = dump_table(&maxp).unwrap();
        assert_eq!(dumped.len(), 32);
        let loaded = Maxp::read(FontData::new(&dumped)).unwrap();
        assert_eq!(loaded, maxp);
    }

    #[test]
    fn unknown_version() {
        let buf = BeBuffer::new().push(0x0002_0000u32).push(5u16);
        assert_eq!(
            Maxp::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(0x0002_0000))
        );
    }
}
