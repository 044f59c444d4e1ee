//! Font-wide configuration

use font_types::{LongDateTime, Tag};

use crate::{
    tables::os2::FsType,
    validate::{Validate, ValidationCtx},
};

/// The default version string.
pub const DEFAULT_VERSION: &str = "Version 0.1";

/// Font-wide settings supplied alongside the glyphs.
///
/// Every field has a default, so a typical caller only sets the names and
/// vertical metrics:
///
/// ```
/// # use font_compiler::FontSettings;
/// let settings = FontSettings {
///     family_name: "Test".into(),
///     style_name: "Medium".into(),
///     ..Default::default()
/// };
/// assert_eq!(settings.units_per_em, 1000);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontSettings {
    pub family_name: String,
    pub style_name: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    /// The CFF `FontBBox`, `[x_min, y_min, x_max, y_max]`.
    ///
    /// When unset the union of the glyph bounds is used.
    pub font_bbox: Option<[i32; 4]>,

    /// The version string, e.g. `"Version 1.002"`.
    pub version: String,
    pub copyright: Option<String>,
    pub trademark: Option<String>,
    pub manufacturer: Option<String>,
    pub designer: Option<String>,
    pub description: Option<String>,
    pub manufacturer_url: Option<String>,
    pub designer_url: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
    pub preferred_family: Option<String>,
    pub preferred_subfamily: Option<String>,

    /// Creation time. Never sampled from the clock, so output is reproducible.
    pub created: LongDateTime,
    pub modified: LongDateTime,

    pub weight_class: u16,
    pub width_class: u16,
    pub vendor_id: Tag,
    pub fs_type: FsType,
    /// Overrides `ulCodePageRange1`/`ulCodePageRange2` of the OS/2 table.
    pub code_page_ranges: Option<[u32; 2]>,

    /// Store only left side bearings for trailing glyphs that share the
    /// last advance width.
    pub compact_hmtx: bool,
}

impl Default for FontSettings {
    fn default() -> Self {
        FontSettings {
            family_name: "Untitled".into(),
            style_name: "Regular".into(),
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 0,
            font_bbox: None,
            version: DEFAULT_VERSION.into(),
            copyright: None,
            trademark: None,
            manufacturer: None,
            designer: None,
            description: None,
            manufacturer_url: None,
            designer_url: None,
            license: None,
            license_url: None,
            preferred_family: None,
            preferred_subfamily: None,
            created: LongDateTime::default(),
            modified: LongDateTime::default(),
            weight_class: 400,
            width_class: 5,
            vendor_id: Tag::new(b"XXXX"),
            fs_type: FsType::empty(),
            code_page_ranges: None,
            compact_hmtx: false,
        }
    }
}

impl FontSettings {
    /// Family and style joined by a space, e.g. "Test Medium".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.family_name, self.style_name)
    }

    /// Family and style with all whitespace removed, e.g. "TestMedium".
    pub fn postscript_name(&self) -> String {
        self.family_name
            .chars()
            .chain(self.style_name.chars())
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// `true` if the style name marks a bold face.
    pub fn is_bold(&self) -> bool {
        self.style_name.contains("Bold")
    }

    /// `true` if the style name marks an italic or oblique face.
    pub fn is_italic(&self) -> bool {
        self.style_name.contains("Italic") || self.style_name.contains("Oblique")
    }
}

impl Validate for FontSettings {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("head", |ctx| {
            ctx.in_field("units_per_em", |ctx| {
                ctx.check_range(self.units_per_em, 16..=16384)
            });
        });
        ctx.in_table("hhea", |ctx| {
            ctx.in_field("ascender", |ctx| ctx.check_range(self.ascender, 0..=i16::MAX));
            ctx.in_field("descender", |ctx| {
                ctx.check_range(self.descender, i16::MIN..=0)
            });
        });
        ctx.in_table("name", |ctx| {
            ctx.in_field("family_name", |ctx| {
                if self.family_name.trim().is_empty() {
                    ctx.report("family name must not be empty");
                }
            });
            ctx.in_field("postscript_name", |ctx| {
                let name = self.postscript_name();
                if name.len() > 63 {
                    ctx.report(format!("'{name}' is longer than 63 characters"));
                }
                if let Some(c) = name.chars().find(|c| !is_postscript_char(*c)) {
                    ctx.report(format!("'{name}' contains the invalid character {c:?}"));
                }
            });
        });
        ctx.in_table("OS/2", |ctx| {
            ctx.in_field("us_weight_class", |ctx| {
                ctx.check_range(self.weight_class, 1..=1000)
            });
            ctx.in_field("us_width_class", |ctx| ctx.check_range(self.width_class, 1..=9));
            ctx.in_field("ach_vend_id", |ctx| {
                if let Err(e) = Tag::new_checked(&self.vendor_id.to_be_bytes()) {
                    ctx.report(e);
                }
            });
        });
        if let Some(bbox) = self.font_bbox {
            ctx.in_table("CFF", |ctx| {
                ctx.in_field("font_bbox", |ctx| {
                    if bbox[0] > bbox[2] || bbox[1] > bbox[3] {
                        ctx.report(format!("{bbox:?} has negative extent"));
                    }
                })
            });
        }
    }
}

/// Printable ASCII, minus the characters PostScript reserves.
fn is_postscript_char(c: char) -> bool {
    matches!(c, '!'..='~') && !"[](){}<>/%".contains(c)
}
