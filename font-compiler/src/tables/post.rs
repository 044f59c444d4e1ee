//! The [post](https://docs.microsoft.com/en-us/typography/opentype/spec/post) table

use font_types::{FWord, Fixed, Tag, Version16Dot16};

use crate::{
    font_data::FontData,
    read::{FontRead, ReadError},
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The [post](https://docs.microsoft.com/en-us/typography/opentype/spec/post)
/// (PostScript) table.
///
/// Only version 3.0 is written: glyph names live in the CFF charset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Post {
    /// Italic angle in counter-clockwise degrees from the vertical. Zero for
    /// upright text, negative for text that leans to the right (forward).
    pub italic_angle: Fixed,
    /// Suggested distance of the top of the underline from the baseline
    /// (negative values indicate below baseline).
    pub underline_position: FWord,
    /// Suggested values for the underline thickness.
    pub underline_thickness: FWord,
    /// Set to 0 if the font is proportionally spaced, non-zero if the font
    /// is not proportionally spaced (i.e. monospaced).
    pub is_fixed_pitch: u32,
    /// Minimum memory usage when an OpenType font is downloaded.
    pub min_mem_type42: u32,
    /// Maximum memory usage when an OpenType font is downloaded.
    pub max_mem_type42: u32,
    /// Minimum memory usage when an OpenType font is downloaded as a Type 1 font.
    pub min_mem_type1: u32,
    /// Maximum memory usage when an OpenType font is downloaded as a Type 1 font.
    pub max_mem_type1: u32,
}

impl Post {
    /// The table for an upright, proportional font.
    pub fn create_table() -> Self {
        Post::default()
    }
}

impl TopLevelTable for Post {
    const TAG: Tag = Tag::new(b"post");
}

impl FontWrite for Post {
    fn write_into(&self, writer: &mut TableWriter) {
        Version16Dot16::VERSION_3_0.write_into(writer);
        self.italic_angle.write_into(writer);
        self.underline_position.write_into(writer);
        self.underline_thickness.write_into(writer);
        self.is_fixed_pitch.write_into(writer);
        self.min_mem_type42.write_into(writer);
        self.max_mem_type42.write_into(writer);
        self.min_mem_type1.write_into(writer);
        self.max_mem_type1.write_into(writer);
    }
}

impl Validate for Post {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("post", |ctx| {
            ctx.in_field("italic_angle", |ctx| {
                ctx.check_range(self.italic_angle.to_f64(), -90.0..=90.0)
            })
        })
    }
}

impl FontRead for Post {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: Version16Dot16 = cursor.read()?;
        match version {
            Version16Dot16::VERSION_3_0 => (),
            Version16Dot16::VERSION_1_0
            | Version16Dot16::VERSION_2_0
            | Version16Dot16::VERSION_2_5 => {
                log::debug!("ignoring glyph names in post table version {version}")
            }
            other => return Err(ReadError::InvalidFormat(other.to_bits() as _)),
        }
        Ok(Post {
            italic_angle: cursor.read()?,
            underline_position: cursor.read()?,
            underline_thickness: cursor.read()?,
            is_fixed_pitch: cursor.read()?,
            min_mem_type42: cursor.read()?,
            max_mem_type42: cursor.read()?,
            min_mem_type1: cursor.read()?,
            max_mem_type1: cursor.read()?,
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
    fn compile_reference() {
        let bytes = dump_table(&Post::create_table()).unwrap();
        assert_eq!(bytes, font_test_data::tables::POST);
    }

    #[test]
    fn parse_reference() {
        let post = Post::read(FontData::new(font_test_data::tables::POST)).unwrap();
        assert_eq!(post, Post::default());
    }

    #[test]
    fn roundtrip_fields() {
        let post = Post {
            italic_angle: Fixed::from_f64(-12.5),
            underline_position: FWord::new(-75),
            underline_thickness: FWord::new(50),
            is_fixed_pitch: 1,
            ..Default::default()
        };
        let bytes = dump_table(&post).unwrap();
        assert_eq!(Post::read(FontData::new(&bytes)).unwrap(), post);
    }

    #[test]
    fn version_2_header() {
        let buf = BeBuffer::new()
            .push(Version16Dot16::VERSION_2_0)
            .push(Fixed::ZERO)
            .extend([-75i16, 50])
            .extend([0u32; 5])
            // glyph names follow but are not needed
            .push(1u16);
        let post = Post::read(FontData::new(&buf)).unwrap();
        assert_eq!(post.underline_position, FWord::new(-75));
    }

    #[test]
    fn bad_angle() {
        let post = Post {
            italic_angle: Fixed::from_i32(120),
            ..Default::default()
        };
        assert!(dump_table(&post).is_err());
    }
}
