//! The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use font_types::Tag;

use crate::{
    font_data::FontData,
    glyph_map::GlyphSet,
    metrics::GlyphMetrics,
    read::{FontReadWithArgs, ReadError},
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx)
/// (horizontal metrics) table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hmtx {
    /// Paired advance width and left side bearing values for each glyph.
    /// Records are indexed by glyph ID.
    pub h_metrics: Vec<LongMetric>,
    /// Left side bearings for glyph IDs greater than or equal to
    /// `number_of_h_metrics`; these glyphs share the last advance.
    pub left_side_bearings: Vec<i16>,
}

/// A record of horizontal advance width and left side bearing for a glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

/// The values from `hhea` and `maxp` needed to decode the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HmtxArgs {
    pub number_of_h_metrics: u16,
    pub num_glyphs: u16,
}

impl LongMetric {
    pub fn new(advance: u16, side_bearing: i16) -> Self {
        LongMetric {
            advance,
            side_bearing,
        }
    }
}

impl Hmtx {
    /// Build the table for a glyph set.
    ///
    /// Every glyph gets a full metric unless `compact_hmtx` is set, in which
    /// case trailing glyphs that repeat the last advance only store their
    /// side bearing.
    pub fn create_table(glyphs: &GlyphSet, settings: &FontSettings) -> Self {
        let metrics = glyphs.metrics();
        let number_of_h_metrics = if settings.compact_hmtx {
            compact_metric_count(metrics)
        } else {
            metrics.len()
        };
        let (long, short) = metrics.split_at(number_of_h_metrics);
        Hmtx {
            h_metrics: long
                .iter()
                .map(|m| LongMetric::new(m.advance, m.left_side_bearing()))
                .collect(),
            left_side_bearings: short.iter().map(GlyphMetrics::left_side_bearing).collect(),
        }
    }

    /// The value for `hhea.number_of_h_metrics`.
    pub fn number_of_h_metrics(&self) -> u16 {
        // glyph count is checked before the table is built
        self.h_metrics.len() as u16
    }

    /// The advance of a glyph, which is the last advance for glyphs past
    /// the end of `h_metrics`.
    pub fn advance(&self, gid: font_types::GlyphId) -> Option<u16> {
        let total = self.h_metrics.len() + self.left_side_bearings.len();
        if gid.to_usize() >= total {
            return None;
        }
        self.h_metrics
            .get(gid.to_usize())
            .or(self.h_metrics.last())
            .map(|metric| metric.advance)
    }
}

/// The number of glyphs that need a full metric: everything up to and
/// including the first glyph of the trailing run with an identical advance.
fn compact_metric_count(metrics: &[GlyphMetrics]) -> usize {
    let Some(last) = metrics.last() else {
        return 0;
    };
    let run = metrics
        .iter()
        .rev()
        .take_while(|m| m.advance == last.advance)
        .count();
    metrics.len() - run + 1
}

impl TopLevelTable for Hmtx {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl FontWrite for LongMetric {
    fn write_into(&self, writer: &mut TableWriter) {
        self.advance.write_into(writer);
        self.side_bearing.write_into(writer);
    }
}

impl FontWrite for Hmtx {
    fn write_into(&self, writer: &mut TableWriter) {
        self.h_metrics.write_into(writer);
        self.left_side_bearings.write_into(writer);
    }
}

impl Validate for Hmtx {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("hmtx", |ctx| {
            ctx.in_field("h_metrics", |ctx| {
                if self.h_metrics.is_empty() {
                    ctx.report("at least one metric is required");
                }
                if self.h_metrics.len() + self.left_side_bearings.len() > u16::MAX as usize {
                    ctx.report("more metrics than glyphs can be addressed");
                }
            })
        })
    }
}

impl FontReadWithArgs for Hmtx {
    type Args = HmtxArgs;

    fn read_with_args(data: FontData, args: &HmtxArgs) -> Result<Self, ReadError> {
        if args.number_of_h_metrics == 0 || args.number_of_h_metrics > args.num_glyphs {
            return Err(ReadError::MalformedData(
                "numberOfHMetrics must be between 1 and numGlyphs",
            ));
        }
        let mut cursor = data.cursor();
        let h_metrics = (0..args.number_of_h_metrics)
            .map(|_| -> Result<_, ReadError> {
                Ok(LongMetric::new(cursor.read()?, cursor.read()?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let left_side_bearings =
            cursor.read_array((args.num_glyphs - args.number_of_h_metrics) as usize)?;
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{glyph::Character, write::dump_table};
    use font_types::GlyphId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn chars(advances: &[f64]) -> Vec<Character> {
        advances
            .iter()
            .enumerate()
            .map(|(i, adv)| match i {
                0 => Character::new(".notdef", None, *adv),
                _ => Character::new(format!("g{i}"), None, *adv),
            })
            .collect()
    }

    #[test]
    fn compile_reference() {
        let chars = chars(&[500.0, 500.0]);
        let settings = FontSettings::default();
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let hmtx = Hmtx::create_table(&glyphs, &settings);
        assert_eq!(hmtx.number_of_h_metrics(), 2);
        assert_eq!(dump_table(&hmtx).unwrap(), font_test_data::tables::HMTX);
    }

    #[test]
    fn parse_reference() {
        let args = HmtxArgs {
            number_of_h_metrics: 2,
            num_glyphs: 2,
        };
        let hmtx =
            Hmtx::read_with_args(FontData::new(font_test_data::tables::HMTX), &args).unwrap();
        assert_eq!(hmtx.h_metrics, [LongMetric::new(500, 0); 2]);
        assert!(hmtx.left_side_bearings.is_empty());
    }

    #[rstest]
    #[case::all_same(&[500.0, 500.0, 500.0], 1)]
    #[case::tail(&[500.0, 600.0, 700.0, 700.0, 700.0], 3)]
    #[case::no_tail(&[500.0, 600.0, 700.0], 3)]
    #[case::repeat_in_middle(&[500.0, 500.0, 600.0], 3)]
    fn compact_tail(#[case] advances: &[f64], #[case] expected: u16) {
        let chars = chars(advances);
        let settings = FontSettings {
            compact_hmtx: true,
            ..Default::default()
        };
        let glyphs = GlyphSet::new(&chars, &settings).unwrap();
        let hmtx = Hmtx::create_table(&glyphs, &settings);
        assert_eq!(hmtx.number_of_h_metrics(), expected);
        assert_eq!(
            hmtx.h_metrics.len() + hmtx.left_side_bearings.len(),
            advances.len()
        );

        let bytes = dump_table(&hmtx).unwrap();
        let args = HmtxArgs {
            number_of_h_metrics: expected,
            num_glyphs: advances.len() as u16,
        };
        let loaded = Hmtx::read_with_args(FontData::new(&bytes), &args).unwrap();
        for (gid, advance) in advances.iter().enumerate() {
            assert_eq!(
                loaded.advance(GlyphId::new(gid as u16)),
                Some(*advance as u16)
            );
        }
        assert_eq!(loaded.advance(GlyphId::new(advances.len() as u16)), None);
    }

    #[test]
    fn side_bearings_in_tail() {
        let hmtx = Hmtx {
            h_metrics: vec![LongMetric::new(602, -214)],
            left_side_bearings: vec![-20, -32, -44, -6],
        };
        let bytes = dump_table(&hmtx).unwrap();
        let args = HmtxArgs {
            number_of_h_metrics: 1,
            num_glyphs: 5,
        };
        let loaded = Hmtx::read_with_args(FontData::new(&bytes), &args).unwrap();
        assert_eq!(loaded, hmtx);
    }

    #[test]
    fn bad_args() {
        let args = HmtxArgs {
            number_of_h_metrics: 3,
            num_glyphs: 2,
        };
        assert!(Hmtx::read_with_args(FontData::new(&[0; 12]), &args).is_err());
        let args = HmtxArgs {
            number_of_h_metrics: 2,
            num_glyphs: 4,
        };
        assert_eq!(
            Hmtx::read_with_args(FontData::new(&[0; 9]), &args),
            Err(ReadError::OutOfBounds)
        );
    }
}
