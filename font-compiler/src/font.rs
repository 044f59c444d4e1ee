//! Compiling a whole font, and reading one back.

use std::collections::HashMap;

use font_types::{GlyphId, Tag};

use crate::{
    error::Error,
    font_builder::{FontBuilder, TableDirectory},
    font_data::FontData,
    glyph::{self, Character},
    glyph_map::GlyphSet,
    read::{FontRead, FontReadWithArgs, ReadError},
    settings::FontSettings,
    tables::{
        cff::Cff,
        cmap::Cmap,
        head::{Head, CHECKSUM_ADJUSTMENT_OFFSET},
        hhea::Hhea,
        hmtx::{Hmtx, HmtxArgs},
        maxp::Maxp,
        name::Name,
        os2::Os2,
        post::Post,
        TopLevelTable,
    },
    validate::Validate,
};

/// One of the tables this crate compiles.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Table {
    Head(Head),
    Hhea(Hhea),
    Hmtx(Hmtx),
    Maxp(Maxp),
    Os2(Os2),
    Post(Post),
    Name(Name),
    Cmap(Cmap),
    Cff(Cff),
}

impl Table {
    pub fn tag(&self) -> Tag {
        match self {
            Table::Head(_) => Head::TAG,
            Table::Hhea(_) => Hhea::TAG,
            Table::Hmtx(_) => Hmtx::TAG,
            Table::Maxp(_) => Maxp::TAG,
            Table::Os2(_) => Os2::TAG,
            Table::Post(_) => Post::TAG,
            Table::Name(_) => Name::TAG,
            Table::Cmap(_) => Cmap::TAG,
            Table::Cff(_) => Cff::TAG,
        }
    }

    /// Validate and encode the table.
    pub fn compile(&self) -> Result<Vec<u8>, Error> {
        Ok(match self {
            Table::Head(table) => crate::dump_table(table)?,
            Table::Hhea(table) => crate::dump_table(table)?,
            Table::Hmtx(table) => crate::dump_table(table)?,
            Table::Maxp(table) => crate::dump_table(table)?,
            Table::Os2(table) => crate::dump_table(table)?,
            Table::Post(table) => crate::dump_table(table)?,
            Table::Name(table) => table.compile()?,
            Table::Cmap(table) => table.compile()?,
            Table::Cff(table) => table.compile()?,
        })
    }
}

/// A font: a set of tables, at most one per tag.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    pub tables: Vec<Table>,
}

macro_rules! table_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<&$ty> {
            self.tables.iter().find_map(|table| match table {
                Table::$variant(table) => Some(table),
                _ => None,
            })
        }
    };
}

impl Font {
    table_getter!(head, Head, Head);
    table_getter!(hhea, Hhea, Hhea);
    table_getter!(hmtx, Hmtx, Hmtx);
    table_getter!(maxp, Maxp, Maxp);
    table_getter!(os2, Os2, Os2);
    table_getter!(post, Post, Post);
    table_getter!(name, Name, Name);
    table_getter!(cmap, Cmap, Cmap);
    table_getter!(cff, Cff, Cff);

    /// Assemble the font file.
    ///
    /// `checkSumAdjustment` is always recomputed, so calling this twice
    /// produces the same bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut builder = FontBuilder::new();
        for table in &self.tables {
            let tag = table.tag();
            if builder.contains(tag) {
                return Err(Error::Format(ReadError::DuplicateTable(tag)));
            }
            let bytes = table.compile()?;
            log::debug!("{tag}: {} bytes", bytes.len());
            builder.add_raw(tag, bytes);
        }
        builder.build()
    }

    /// The glyph a codepoint maps to in the `cmap` table.
    pub fn glyph_id_for_codepoint(&self, codepoint: u32) -> Option<GlyphId> {
        self.cmap()?.map_codepoint(codepoint)
    }

    /// The glyph with this name in the CFF charset.
    ///
    /// Names outside ASCII are stored by the code of their first character
    /// (see [`Character::postscript_name`]) and are matched the same way, so
    /// `世` and `世界` find the first glyph stored as `4e16` or `4e16.N`.
    pub fn glyph_id_for_name(&self, name: &str) -> Option<GlyphId> {
        let names = &self.cff()?.glyph_names;
        let position = match names.iter().position(|n| n == name) {
            Some(position) => position,
            None if !name.is_ascii() => {
                let base = glyph::postscript_name(name);
                names
                    .iter()
                    .position(|n| glyph::is_postscript_replacement(n, &base))?
            }
            None => return None,
        };
        u16::try_from(position).ok().map(GlyphId::new)
    }

    /// `true` if `ch` is the name of a glyph, or a single character that
    /// the `cmap` table maps.
    pub fn has_char(&self, ch: &str) -> bool {
        if self.glyph_id_for_name(ch).is_some() {
            return true;
        }
        let mut chars = ch.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.glyph_id_for_codepoint(c as u32).is_some(),
            _ => false,
        }
    }

    /// Rebuild the glyphs of a font.
    ///
    /// Names and outlines come from the CFF table, codepoints from `cmap`
    /// and advances from `hmtx` (or from the charstrings if there is no
    /// `hmtx`). A glyph mapped from several codepoints gets the lowest.
    pub fn characters(&self) -> Result<Vec<Character>, Error> {
        let cff = self
            .cff()
            .ok_or(Error::Format(ReadError::TableIsMissing(Cff::TAG)))?;
        let mut codepoints = HashMap::new();
        if let Some(subtable) = self.cmap().and_then(Cmap::unicode_subtable) {
            for (codepoint, gid) in subtable.mappings() {
                codepoints.entry(gid).or_insert(codepoint);
            }
        }
        (0..cff.num_glyphs())
            .map(|i| -> Result<Character, Error> {
                let gid = GlyphId::new(i as u16);
                let advance = match self.hmtx().and_then(|hmtx| hmtx.advance(gid)) {
                    Some(advance) => advance as f64,
                    None => cff.advance(gid)?,
                };
                let name = cff.glyph_name(gid).unwrap_or_default();
                let outline = cff.outline(gid)?;
                Ok(Character::from_path(
                    name,
                    codepoints.get(&gid).copied(),
                    advance,
                    &outline,
                ))
            })
            .collect()
    }
}

/// Compile glyphs into a font.
///
/// The returned font already carries the final `checkSumAdjustment` in its
/// `head` table.
pub fn create_font(characters: &[Character], settings: &FontSettings) -> Result<Font, Error> {
    settings.validate()?;
    let glyphs = GlyphSet::new(characters, settings)?;
    let hmtx = Hmtx::create_table(&glyphs, settings);
    let hhea = Hhea::create_table(&glyphs, settings, hmtx.number_of_h_metrics());
    let mut font = Font {
        tables: vec![
            Table::Head(Head::create_table(&glyphs, settings)),
            Table::Hhea(hhea),
            Table::Hmtx(hmtx),
            Table::Maxp(Maxp::create_table(&glyphs)),
            Table::Os2(Os2::create_table(&glyphs, settings)),
            Table::Post(Post::create_table()),
            Table::Name(Name::create_table(settings)),
            Table::Cmap(Cmap::create_table(&glyphs)?),
            Table::Cff(Cff::create_table(&glyphs, settings)?),
        ],
    };

    let bytes = font.to_bytes()?;
    let directory = TableDirectory::read(FontData::new(&bytes))?;
    if let Some(record) = directory.find(Head::TAG) {
        let adjustment: u32 = FontData::new(&bytes)
            .read_at(record.offset as usize + CHECKSUM_ADJUSTMENT_OFFSET)?;
        for table in &mut font.tables {
            if let Table::Head(head) = table {
                head.checksum_adjustment = adjustment;
            }
        }
    }
    log::debug!(
        "compiled {} glyphs into {} bytes",
        glyphs.num_glyphs(),
        bytes.len()
    );
    Ok(font)
}

/// Read a font file.
///
/// Every table this crate knows is parsed; other tables are skipped.
pub fn parse_font(bytes: &[u8]) -> Result<Font, Error> {
    let data = FontData::new(bytes);
    let directory = TableDirectory::read(data)?;
    let mut font = Font::default();
    for record in &directory.table_records {
        let start = record.offset as usize;
        let table = data
            .slice(start..start + record.length as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let table = match record.tag {
            Head::TAG => Table::Head(Head::read(table)?),
            Hhea::TAG => Table::Hhea(Hhea::read(table)?),
            Maxp::TAG => Table::Maxp(Maxp::read(table)?),
            Os2::TAG => Table::Os2(Os2::read(table)?),
            Post::TAG => Table::Post(Post::read(table)?),
            Name::TAG => Table::Name(Name::read(table)?),
            Cmap::TAG => Table::Cmap(Cmap::read(table)?),
            Cff::TAG => Table::Cff(Cff::read(table)?),
            // needs hhea and maxp
            Hmtx::TAG => continue,
            other => {
                log::debug!("skipping unknown table '{other}'");
                continue;
            }
        };
        font.tables.push(table);
    }

    if let Some(record) = directory.find(Hmtx::TAG) {
        let start = record.offset as usize;
        let hmtx_data = data
            .slice(start..start + record.length as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let args = HmtxArgs {
            number_of_h_metrics: font
                .hhea()
                .ok_or(ReadError::TableIsMissing(Hhea::TAG))?
                .number_of_h_metrics,
            num_glyphs: font
                .maxp()
                .ok_or(ReadError::TableIsMissing(Maxp::TAG))?
                .num_glyphs,
        };
        font.tables
            .push(Table::Hmtx(Hmtx::read_with_args(hmtx_data, &args)?));
    }
    Ok(font)
}
