//! the [cmap] table
//!
//! Only [format 4] subtables are compiled. Every segment written maps its
//! codepoints by a constant delta; range offsets into a glyph id array are
//! understood when reading.
//!
//! [cmap]: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
//! [format 4]: https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values

use font_types::{GlyphId, Tag};

use crate::{
    error::{Error, LayoutOverflow},
    font_data::FontData,
    glyph_map::GlyphSet,
    read::{FontRead, ReadError},
    tables::TopLevelTable,
    util::SearchRange,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

// https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#windows-platform-platform-id--3
const PLATFORM_WINDOWS: u16 = 3;
const WINDOWS_BMP_ENCODING: u16 = 1;
const PLATFORM_UNICODE: u16 = 0;

/// The codepoint reserved for the terminating segment.
const SENTINEL: u16 = 0xFFFF;

const CMAP_HEADER_LEN: usize = 4;
const ENCODING_RECORD_LEN: usize = 8;

/// The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap)
/// (character to glyph index mapping) table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmap {
    pub encoding_records: Vec<EncodingRecord>,
}

/// An encoding and the subtable that implements it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub subtable: Cmap4,
}

/// A format 4 subtable: segment mapping to delta values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmap4 {
    pub language: u16,
    /// Segments sorted by codepoint; the last one is always the sentinel.
    pub segments: Vec<Segment>,
    /// Glyph ids addressed by segments with a non-zero `id_range_offset`.
    pub glyph_id_array: Vec<u16>,
}

/// One contiguous range of codepoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

impl Segment {
    const SENTINEL: Segment = Segment {
        start_code: SENTINEL,
        end_code: SENTINEL,
        id_delta: 1,
        id_range_offset: 0,
    };

    fn new(codepoint: u16, gid: u16) -> Self {
        Segment {
            start_code: codepoint,
            end_code: codepoint,
            // deltas are applied modulo 65536
            id_delta: (gid as i32 - codepoint as i32) as i16,
            id_range_offset: 0,
        }
    }

    fn contains(&self, codepoint: u16) -> bool {
        (self.start_code..=self.end_code).contains(&codepoint)
    }
}

impl Cmap {
    /// Build the table for a glyph set: a single Windows BMP subtable.
    pub fn create_table(glyphs: &GlyphSet) -> Result<Self, Error> {
        let subtable = Cmap4::from_mappings(glyphs.map().mappings())?;
        Ok(Cmap {
            encoding_records: vec![EncodingRecord {
                platform_id: PLATFORM_WINDOWS,
                encoding_id: WINDOWS_BMP_ENCODING,
                subtable,
            }],
        })
    }

    /// The subtable to use for Unicode lookups.
    ///
    /// Prefers Windows BMP, then any Unicode platform record, then whatever
    /// is first.
    pub fn unicode_subtable(&self) -> Option<&Cmap4> {
        let find = |f: fn(&EncodingRecord) -> bool| self.encoding_records.iter().find(|r| f(r));
        find(|r| r.platform_id == PLATFORM_WINDOWS && r.encoding_id == WINDOWS_BMP_ENCODING)
            .or_else(|| find(|r| r.platform_id == PLATFORM_UNICODE))
            .or_else(|| self.encoding_records.first())
            .map(|record| &record.subtable)
    }

    pub fn map_codepoint(&self, codepoint: u32) -> Option<GlyphId> {
        self.unicode_subtable()?.map_codepoint(codepoint)
    }

    /// Validate and encode the table.
    pub fn compile(&self) -> Result<Vec<u8>, Error> {
        self.validate()?;
        let mut offset = CMAP_HEADER_LEN + ENCODING_RECORD_LEN * self.encoding_records.len();
        let mut offsets = Vec::with_capacity(self.encoding_records.len());
        for record in &self.encoding_records {
            let len = record.subtable.compute_length();
            LayoutOverflow::check("cmap format 4 subtable", len, u16::MAX as u64)?;
            offsets.push(offset as u32);
            offset += len;
        }
        LayoutOverflow::check("cmap subtable offset", offset, u32::MAX as u64)?;

        let mut writer = TableWriter::default();
        // version
        0u16.write_into(&mut writer);
        (self.encoding_records.len() as u16).write_into(&mut writer);
        for (record, offset) in self.encoding_records.iter().zip(&offsets) {
            record.platform_id.write_into(&mut writer);
            record.encoding_id.write_into(&mut writer);
            offset.write_into(&mut writer);
        }
        for record in &self.encoding_records {
            record.subtable.write_into(&mut writer);
        }
        let bytes = writer.into_data();
        log::debug!(
            "cmap: {} subtables, {} bytes",
            self.encoding_records.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

impl Cmap4 {
    /// Collapse `(codepoint, glyph id)` pairs into delta segments.
    ///
    /// The pairs must be sorted by codepoint. Consecutive codepoints that
    /// map to consecutive glyph ids share a segment.
    pub fn from_mappings(mappings: impl IntoIterator<Item = (u32, GlyphId)>) -> Result<Self, Error> {
        let mut segments: Vec<Segment> = Vec::new();
        for (codepoint, gid) in mappings {
            let Ok(cp) = u16::try_from(codepoint) else {
                return Err(Error::UnsupportedCodepoint {
                    codepoint,
                    glyph: gid.to_string(),
                });
            };
            if cp == SENTINEL {
                log::warn!("U+FFFF is reserved for the cmap sentinel, not mapping {gid}");
                continue;
            }
            let next = Segment::new(cp, gid.to_u16());
            match segments.last_mut() {
                Some(last) if last.end_code + 1 == cp && last.id_delta == next.id_delta => {
                    last.end_code = cp;
                }
                _ => segments.push(next),
            }
        }
        segments.push(Segment::SENTINEL);
        Ok(Cmap4 {
            language: 0,
            segments,
            glyph_id_array: Vec::new(),
        })
    }

    pub fn seg_count(&self) -> u16 {
        self.segments.len() as u16
    }

    pub fn search_range(&self) -> SearchRange {
        SearchRange::compute(self.segments.len(), std::mem::size_of::<u16>())
    }

    /// The size of the encoded subtable in bytes.
    pub fn compute_length(&self) -> usize {
        // 8 u16 header fields (counting reservedPad), four parallel arrays
        8 * 2 + self.segments.len() * 2 * 4 + self.glyph_id_array.len() * 2
    }

    /// The glyph for a codepoint.
    ///
    /// A segment with a range offset addresses `glyph_id_array` relative to
    /// its own position in the `id_range_offset` array, as the encoded
    /// table does.
    pub fn map_codepoint(&self, codepoint: u32) -> Option<GlyphId> {
        let cp = u16::try_from(codepoint).ok()?;
        let (index, segment) = self
            .segments
            .iter()
            .enumerate()
            .find(|(_, seg)| seg.end_code >= cp)?;
        if !segment.contains(cp) {
            return None;
        }
        self.resolve(index, segment, cp)
    }

    fn resolve(&self, index: usize, segment: &Segment, cp: u16) -> Option<GlyphId> {
        if segment.id_range_offset == 0 {
            return Some(GlyphId::new(cp.wrapping_add(segment.id_delta as u16)));
        }
        let array_index = (segment.id_range_offset as usize / 2 + (cp - segment.start_code) as usize
            + index)
            .checked_sub(self.segments.len())?;
        match self.glyph_id_array.get(array_index)? {
            0 => None,
            gid => Some(GlyphId::new(gid.wrapping_add(segment.id_delta as u16))),
        }
    }

    /// Iterate every mapped `(codepoint, glyph id)` pair in codepoint order.
    ///
    /// Explicit mappings to glyph 0 are included; the sentinel is not.
    pub fn mappings(&self) -> impl Iterator<Item = (u32, GlyphId)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, seg)| seg.start_code != SENTINEL)
            .flat_map(move |(index, seg)| {
                (seg.start_code..=seg.end_code)
                    .filter_map(move |cp| Some((cp as u32, self.resolve(index, seg, cp)?)))
            })
    }
}

impl FontWrite for Cmap4 {
    fn write_into(&self, writer: &mut TableWriter) {
        let search = self.search_range();
        // format
        4u16.write_into(writer);
        // checked by Cmap::compile
        (self.compute_length() as u16).write_into(writer);
        self.language.write_into(writer);
        (self.seg_count() * 2).write_into(writer);
        search.search_range.write_into(writer);
        search.entry_selector.write_into(writer);
        search.range_shift.write_into(writer);
        for segment in &self.segments {
            segment.end_code.write_into(writer);
        }
        // reservedPad
        0u16.write_into(writer);
        for segment in &self.segments {
            segment.start_code.write_into(writer);
        }
        for segment in &self.segments {
            segment.id_delta.write_into(writer);
        }
        for segment in &self.segments {
            segment.id_range_offset.write_into(writer);
        }
        self.glyph_id_array.write_into(writer);
    }
}

impl TopLevelTable for Cmap {
    const TAG: Tag = Tag::new(b"cmap");
}

impl Validate for Cmap {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("cmap", |ctx| {
            ctx.in_field("encoding_records", |ctx| {
                if self.encoding_records.is_empty() {
                    ctx.report("at least one encoding record is required");
                }
                if self.encoding_records.windows(2).any(|pair| {
                    (pair[0].platform_id, pair[0].encoding_id)
                        >= (pair[1].platform_id, pair[1].encoding_id)
                }) {
                    ctx.report("encoding records must be sorted and unique");
                }
                ctx.in_array(|ctx| {
                    for record in &self.encoding_records {
                        ctx.array_item(|ctx| record.subtable.validate_impl(ctx))
                    }
                })
            })
        })
    }
}

impl Validate for Cmap4 {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_field("segments", |ctx| {
            if self.segments.last() != Some(&Segment::SENTINEL) {
                ctx.report("the last segment must be the 0xFFFF sentinel");
            }
            if self
                .segments
                .iter()
                .any(|seg| seg.start_code > seg.end_code)
            {
                ctx.report("segment start must not follow its end");
            }
            if self
                .segments
                .windows(2)
                .any(|pair| pair[0].end_code >= pair[1].start_code)
            {
                ctx.report("segments must be sorted and must not overlap");
            }
        })
    }
}

impl FontRead for Cmap {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version != 0 {
            return Err(ReadError::InvalidFormat(version as _));
        }
        let num_tables: u16 = cursor.read()?;
        let mut encoding_records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let platform_id: u16 = cursor.read()?;
            let encoding_id: u16 = cursor.read()?;
            let offset: u32 = cursor.read()?;
            let format: u16 = data.read_at(offset as usize)?;
            if format != 4 {
                log::warn!(
                    "skipping cmap subtable format {format} for ({platform_id}, {encoding_id})"
                );
                continue;
            }
            encoding_records.push(EncodingRecord {
                platform_id,
                encoding_id,
                subtable: data.read_table_at(offset as usize)?,
            });
        }
        Ok(Cmap { encoding_records })
    }
}

impl FontRead for Cmap4 {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 4 {
            return Err(ReadError::InvalidFormat(format as _));
        }
        let length: u16 = cursor.read()?;
        let language = cursor.read()?;
        let seg_count_x2: u16 = cursor.read()?;
        if seg_count_x2 % 2 != 0 {
            return Err(ReadError::MalformedData("odd segCountX2 in cmap format 4"));
        }
        let seg_count = (seg_count_x2 / 2) as usize;
        // searchRange, entrySelector, rangeShift are recomputed on write
        cursor.advance_by(3 * std::mem::size_of::<u16>());
        let end_codes: Vec<u16> = cursor.read_array(seg_count)?;
        let _reserved_pad: u16 = cursor.read()?;
        let start_codes: Vec<u16> = cursor.read_array(seg_count)?;
        let id_deltas: Vec<i16> = cursor.read_array(seg_count)?;
        let id_range_offsets: Vec<u16> = cursor.read_array(seg_count)?;
        let glyph_id_count = (length as usize)
            .checked_sub(cursor.position())
            .ok_or(ReadError::MalformedData("cmap format 4 length too short"))?
            / 2;
        let glyph_id_array = cursor.read_array(glyph_id_count)?;

        let segments = start_codes
            .into_iter()
            .zip(end_codes)
            .zip(id_deltas.into_iter().zip(id_range_offsets))
            .map(|((start_code, end_code), (id_delta, id_range_offset))| Segment {
                start_code,
                end_code,
                id_delta,
                id_range_offset,
            })
            .collect();
        Ok(Cmap4 {
            language,
            segments,
            glyph_id_array,
        })
    }
}
