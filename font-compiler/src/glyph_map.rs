//! Glyph ordering and the codepoint/name to glyph id map.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, HashSet},
};

use font_types::GlyphId;

use crate::{
    error::{Error, LayoutOverflow},
    glyph::{Character, NOTDEF},
    metrics::{FontMetrics, GlyphMetrics},
    settings::FontSettings,
    validate::{Validate, ValidationCtx},
};

/// The highest codepoint a format 4 cmap can map.
pub(crate) const MAX_BMP: u32 = 0xFFFF;

/// Bidirectional lookup between glyph ids and codepoints/names.
///
/// This is built once per compilation and shared by the tables that need
/// glyph ids (cmap, CFF charset, hmtx).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphIndexMap {
    codepoints: BTreeMap<u32, GlyphId>,
    names: HashMap<String, GlyphId>,
}

impl GlyphIndexMap {
    /// Build the map for glyphs in glyph id order.
    ///
    /// When two glyphs share a codepoint or name the first one wins.
    pub fn new<'a>(glyphs: impl IntoIterator<Item = (Option<u32>, &'a str)>) -> Self {
        let mut map = GlyphIndexMap::default();
        for (gid, (unicode, name)) in glyphs.into_iter().enumerate() {
            let gid = GlyphId::new(gid as u16);
            if let Some(unicode) = unicode {
                map.codepoints.entry(unicode).or_insert(gid);
            }
            map.names.entry(name.to_owned()).or_insert(gid);
        }
        map
    }

    pub fn glyph_id_for_codepoint(&self, codepoint: u32) -> Option<GlyphId> {
        self.codepoints.get(&codepoint).copied()
    }

    pub fn glyph_id_for_name(&self, name: &str) -> Option<GlyphId> {
        self.names.get(name).copied()
    }

    /// Iterate over `(codepoint, glyph id)` pairs in ascending codepoint order.
    pub fn mappings(&self) -> impl Iterator<Item = (u32, GlyphId)> + '_ {
        self.codepoints.iter().map(|(cp, gid)| (*cp, *gid))
    }
}

/// The glyphs of a font in glyph id order, with everything derived from
/// them that more than one table needs.
#[derive(Clone, Debug)]
pub struct GlyphSet<'a> {
    glyphs: Vec<Cow<'a, Character>>,
    postscript_names: Vec<String>,
    map: GlyphIndexMap,
    metrics: Vec<GlyphMetrics>,
    font_metrics: FontMetrics,
}

impl<'a> GlyphSet<'a> {
    /// Validate and order the input glyphs.
    ///
    /// `.notdef` is moved to glyph id 0 (or synthesized, with no outline and
    /// an advance of half an em, if missing). All other glyphs keep their
    /// input order.
    pub fn new(characters: &'a [Character], settings: &FontSettings) -> Result<Self, Error> {
        let glyphs = order_glyphs(characters, settings.units_per_em);
        LayoutOverflow::check("glyph count", glyphs.len(), u16::MAX as u64)?;
        GlyphInput(&glyphs).validate()?;

        if let Some(glyph) = glyphs
            .iter()
            .find(|glyph| glyph.unicode.is_some_and(|cp| cp > MAX_BMP))
        {
            return Err(Error::UnsupportedCodepoint {
                codepoint: glyph.unicode.unwrap_or_default(),
                glyph: glyph.name.clone(),
            });
        }

        let map = GlyphIndexMap::new(
            glyphs
                .iter()
                .map(|glyph| (glyph.unicode, glyph.name.as_str())),
        );
        let metrics: Vec<_> = glyphs.iter().map(|g| GlyphMetrics::new(g)).collect();
        let font_metrics = FontMetrics::new(&metrics);
        Ok(GlyphSet {
            postscript_names: postscript_names(&glyphs),
            glyphs,
            map,
            metrics,
            font_metrics,
        })
    }

    /// The glyphs, indexed by glyph id.
    pub fn glyphs(&self) -> impl ExactSizeIterator<Item = &Character> + '_ {
        self.glyphs.iter().map(|glyph| glyph.as_ref())
    }

    pub fn get(&self, gid: GlyphId) -> Option<&Character> {
        self.glyphs.get(gid.to_usize()).map(|glyph| glyph.as_ref())
    }

    /// The charset names, indexed by glyph id.
    ///
    /// These are unique, see [`Character::postscript_name`].
    pub fn postscript_names(&self) -> &[String] {
        &self.postscript_names
    }

    pub fn num_glyphs(&self) -> u16 {
        // checked in the constructor
        self.glyphs.len() as u16
    }

    pub fn map(&self) -> &GlyphIndexMap {
        &self.map
    }

    /// Per-glyph metrics, indexed by glyph id.
    pub fn metrics(&self) -> &[GlyphMetrics] {
        &self.metrics
    }

    pub fn font_metrics(&self) -> &FontMetrics {
        &self.font_metrics
    }
}

fn order_glyphs(characters: &[Character], units_per_em: u16) -> Vec<Cow<'_, Character>> {
    let mut glyphs: Vec<_> = characters.iter().map(Cow::Borrowed).collect();
    match glyphs.iter().position(|glyph| glyph.is_notdef()) {
        Some(0) => (),
        Some(pos) => {
            log::debug!("moving {NOTDEF} from glyph {pos} to glyph 0");
            let notdef = glyphs.remove(pos);
            glyphs.insert(0, notdef);
        }
        None => {
            log::debug!("no {NOTDEF} glyph, inserting an empty one");
            let advance = (units_per_em / 2) as f64;
            glyphs.insert(0, Cow::Owned(Character::new(NOTDEF, None, advance)));
        }
    }
    glyphs
}

/// The charset name of every glyph.
///
/// ASCII names are kept. A replacement for another name that collides
/// with an earlier name gets the first free `.1`, `.2`, ... suffix.
fn postscript_names(glyphs: &[Cow<'_, Character>]) -> Vec<String> {
    let mut used: HashSet<String> = glyphs
        .iter()
        .filter(|glyph| glyph.name.is_ascii())
        .map(|glyph| glyph.name.clone())
        .collect();
    glyphs
        .iter()
        .map(|glyph| {
            if glyph.name.is_ascii() {
                return glyph.name.clone();
            }
            let base = glyph.postscript_name();
            let mut name = base.clone();
            let mut suffix = 0;
            while !used.insert(name.clone()) {
                suffix += 1;
                name = format!("{base}.{suffix}");
            }
            if suffix != 0 {
                log::debug!("glyph '{}' is stored as '{name}'", glyph.name);
            }
            name
        })
        .collect()
}

/// Checks on the glyph list, grouped by the table each value ends up in.
struct GlyphInput<'a, 'b>(&'b [Cow<'a, Character>]);

impl Validate for GlyphInput<'_, '_> {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        let glyphs = self.0;
        ctx.in_table("hmtx", |ctx| {
            ctx.in_field("advance_width", |ctx| {
                ctx.in_array(|ctx| {
                    for glyph in glyphs {
                        ctx.array_item(|ctx| {
                            if !glyph.advance_width.is_finite() {
                                ctx.report("advance width is not a finite number");
                            } else {
                                ctx.check_range(glyph.advance_width.round(), 0.0..=65535.0);
                            }
                        })
                    }
                })
            })
        });

        ctx.in_table("cmap", |ctx| {
            ctx.in_field("unicode", |ctx| {
                let mut seen = HashMap::new();
                ctx.in_array(|ctx| {
                    for glyph in glyphs {
                        ctx.array_item(|ctx| {
                            let Some(cp) = glyph.unicode else { return };
                            if char::from_u32(cp).is_none() {
                                ctx.report(format!("0x{cp:X} is not a Unicode scalar value"));
                            } else if let Some(other) = seen.insert(cp, glyph.name.as_str()) {
                                ctx.report(format!(
                                    "U+{cp:04X} is mapped by both '{other}' and '{}'",
                                    glyph.name
                                ));
                            }
                        })
                    }
                })
            })
        });

        ctx.in_table("CFF", |ctx| {
            ctx.in_field("charset", |ctx| {
                let mut seen = HashSet::new();
                ctx.in_array(|ctx| {
                    for glyph in glyphs {
                        ctx.array_item(|ctx| {
                            let name = glyph.postscript_name();
                            if name.is_empty() {
                                ctx.report("glyph name is empty");
                            } else if name.len() > 63 {
                                ctx.report(format!("glyph name '{name}' exceeds 63 characters"));
                            } else if !seen.insert(glyph.name.as_str()) {
                                ctx.report(format!("glyph name '{}' is not unique", glyph.name));
                            }
                        })
                    }
                })
            });
            ctx.in_field("char_strings", |ctx| {
                ctx.in_array(|ctx| {
                    for glyph in glyphs {
                        ctx.array_item(|ctx| validate_outline(glyph, ctx))
                    }
                })
            });
        });
    }
}

fn validate_outline(glyph: &Character, ctx: &mut ValidationCtx) {
    let bad_point = glyph
        .contours
        .iter()
        .flatten()
        .flat_map(crate::glyph::segment_points)
        .find(|pt| {
            !(pt.x.is_finite() && pt.y.is_finite())
                || pt.x.abs() > i16::MAX as f64
                || pt.y.abs() > i16::MAX as f64
        });
    if let Some(pt) = bad_point {
        ctx.report(format!(
            "glyph '{}' has the point ({}, {}) outside the 16-bit coordinate space",
            glyph.name, pt.x, pt.y
        ));
    }
    if let Some(idx) = glyph.first_open_contour() {
        ctx.report(format!(
            "contour {idx} of glyph '{}' is not closed or not connected",
            glyph.name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Line, PathSeg};

    fn glyph(name: &str, unicode: Option<u32>) -> Character {
        Character::new(name, unicode, 500.0)
    }

    #[test]
    fn notdef_is_moved_to_front() {
        let chars = [glyph("a", Some(0x61)), glyph(NOTDEF, None), glyph("b", Some(0x62))];
        let set = GlyphSet::new(&chars, &FontSettings::default()).unwrap();
        let names: Vec<_> = set.glyphs().map(|g| g.name.as_str()).collect();
        assert_eq!(names, [NOTDEF, "a", "b"]);
        assert_eq!(set.map().glyph_id_for_codepoint(0x62), Some(GlyphId::new(2)));
        assert_eq!(set.map().glyph_id_for_name("a"), Some(GlyphId::new(1)));
    }

    #[test]
    fn missing_notdef_is_synthesized() {
        let chars = [glyph("a", Some(0x61))];
        let set = GlyphSet::new(&chars, &FontSettings::default()).unwrap();
        assert_eq!(set.num_glyphs(), 2);
        let notdef = set.get(GlyphId::NOTDEF).unwrap();
        assert!(notdef.is_notdef());
        assert_eq!(notdef.advance_width, 500.0);
        assert!(!notdef.has_outline());
    }

    #[test]
    fn non_bmp_is_unsupported() {
        let chars = [glyph(NOTDEF, None), glyph("emoji", Some(0x1F600))];
        let err = GlyphSet::new(&chars, &FontSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedCodepoint {
                codepoint: 0x1F600,
                ..
            }
        ));
    }

    #[test]
    fn duplicates_are_rejected() {
        let chars = [
            glyph(NOTDEF, None),
            glyph("a", Some(0x61)),
            glyph("a.alt", Some(0x61)),
            glyph("a", None),
        ];
        let Err(Error::ValidationFailed(report)) =
            GlyphSet::new(&chars, &FontSettings::default())
        else {
            panic!("expected validation failure");
        };
        let paths: Vec<_> = report.iter().map(|(path, _)| path).collect();
        assert_eq!(paths, ["cmap.unicode[2]", "CFF.charset[3]"]);
    }

    #[test]
    fn bad_outlines_are_rejected() {
        let mut open = glyph("open", None);
        open.contours
            .push(vec![PathSeg::Line(Line::new((0.0, 0.0), (10.0, 0.0)))]);
        let mut huge = glyph("huge", None);
        huge.contours.push(vec![
            PathSeg::Line(Line::new((0.0, 0.0), (40000.0, 0.0))),
            PathSeg::Line(Line::new((40000.0, 0.0), (0.0, 0.0))),
        ]);
        let mut wide = glyph("wide", None);
        wide.advance_width = f64::NAN;

        let chars = [glyph(NOTDEF, None), open, huge, wide];
        let Err(Error::ValidationFailed(report)) =
            GlyphSet::new(&chars, &FontSettings::default())
        else {
            panic!("expected validation failure");
        };
        let paths: Vec<_> = report.iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            [
                "hmtx.advance_width[3]",
                "CFF.char_strings[1]",
                "CFF.char_strings[2]"
            ]
        );
    }

    #[test]
    fn replacement_names_are_unique() {
        let chars = [
            glyph(NOTDEF, None),
            glyph("世", None),
            glyph("世界", None),
            glyph("4e16", None),
        ];
        let set = GlyphSet::new(&chars, &FontSettings::default()).unwrap();
        assert_eq!(
            set.postscript_names(),
            [NOTDEF, "4e16.1", "4e16.2", "4e16"]
        );
        assert_eq!(set.map().glyph_id_for_name("世界"), Some(GlyphId::new(2)));
    }

    #[test]
    fn first_mapping_wins() {
        let map = GlyphIndexMap::new([(Some(0x41), "A"), (Some(0x41), "A.alt")]);
        assert_eq!(map.glyph_id_for_codepoint(0x41), Some(GlyphId::new(0)));
        assert_eq!(map.mappings().count(), 1);
    }
}
