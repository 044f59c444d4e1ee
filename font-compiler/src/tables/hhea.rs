//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use font_types::{FWord, MajorMinor, Tag, UfWord};

use crate::{
    font_data::FontData,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea)
/// (horizontal header) table.
///
/// The caret is always vertical; slanted carets are not supported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hhea {
    /// Typographic ascent.
    pub ascender: FWord,
    /// Typographic descent.
    pub descender: FWord,
    /// Typographic line gap.
    pub line_gap: FWord,
    /// Maximum advance width value in 'hmtx' table.
    pub advance_width_max: UfWord,
    /// Minimum left sidebearing value in 'hmtx' table for glyphs with contours.
    pub min_left_side_bearing: FWord,
    /// Minimum right sidebearing value.
    pub min_right_side_bearing: FWord,
    /// Max(lsb + (xMax - xMin)).
    pub x_max_extent: FWord,
    /// Number of hMetric entries in 'hmtx' table.
    pub number_of_h_metrics: u16,
}

impl Hhea {
    /// Build the table for a glyph set.
    ///
    /// `number_of_h_metrics` must agree with the `hmtx` table built from
    /// the same input.
    pub fn create_table(
        glyphs: &GlyphSet,
        settings: &FontSettings,
        number_of_h_metrics: u16,
    ) -> Self {
        let metrics = glyphs.font_metrics();
        Hhea {
            ascender: FWord::new(settings.ascender),
            descender: FWord::new(settings.descender),
            line_gap: FWord::new(settings.line_gap),
            advance_width_max: UfWord::new(metrics.advance_width_max),
            min_left_side_bearing: FWord::new(metrics.min_left_side_bearing),
            min_right_side_bearing: FWord::new(metrics.min_right_side_bearing),
            x_max_extent: FWord::new(metrics.x_max_extent),
            number_of_h_metrics,
        }
    }
}

impl TopLevelTable for Hhea {
    const TAG: Tag = Tag::new(b"hhea");
}

impl FontWrite for Hhea {
    fn write_into(&self, writer: &mut TableWriter) {
        MajorMinor::VERSION_1_0.write_into(writer);
        self.ascender.write_into(writer);
        self.descender.write_into(writer);
        self.line_gap.write_into(writer);
        self.advance_width_max.write_into(writer);
        self.min_left_side_bearing.write_into(writer);
        self.min_right_side_bearing.write_into(writer);
        self.x_max_extent.write_into(writer);
        // caret slope rise, run, offset
        [1i16, 0, 0].write_into(writer);
        // reserved
        [0i16; 4].write_into(writer);
        // metricDataFormat
        0i16.write_into(writer);
        self.number_of_h_metrics.write_into(writer);
    }
}

impl Validate for Hhea {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("hhea", |ctx| {
            ctx.in_field("number_of_h_metrics", |ctx| {
                if self.number_of_h_metrics == 0 {
                    ctx.report("at least one horizontal metric is required");
                }
            })
        })
    }
}

impl FontRead for Hhea {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        if version.major != 1 {
            return Err(ReadError::InvalidFormat(version.major as _));
        }
        let ascender = cursor.read()?;
        let descender = cursor.read()?;
        let line_gap = cursor.read()?;
        let advance_width_max = cursor.read()?;
        let min_left_side_bearing = cursor.read()?;
        let min_right_side_bearing = cursor.read()?;
        let x_max_extent = cursor.read()?;
        // caret slope and reserved fields
        cursor.advance_by(7 * std::mem::size_of::<i16>());
        let metric_data_format: i16 = cursor.read()?;
        if metric_data_format != 0 {
            return Err(ReadError::InvalidFormat(metric_data_format as _));
        }
        Ok(Hhea {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            number_of_h_metrics: cursor.read()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;

    fn reference_table() -> Hhea {
        Hhea {
            ascender: FWord::new(800),
            descender: FWord::new(-200),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(1000),
            min_left_side_bearing: FWord::new(0),
            min_right_side_bearing: FWord::new(0),
            x_max_extent: FWord::new(1000),
            number_of_h_metrics: 2,
        }
    }

    #[test]
    fn compile_reference() {
        let bytes = dump_table(&reference_table()).unwrap();
        assert_eq!(bytes, font_test_data::tables::HHEA);
    }

    #[test]
    fn parse_reference() {
        let hhea = Hhea::read(FontData::new(font_test_data::tables::HHEA)).unwrap();
        assert_eq!(hhea, reference_table());
    }

    #[test]
    fn needs_one_metric() {
        let hhea = Hhea {
            number_of_h_metrics: 0,
            ..reference_table()
        };
        assert!(dump_table(&hhea).is_err());
    }
}
