//!  A builder for top-level font objects

use std::borrow::Cow;
use std::collections::BTreeMap;

use font_types::{Tag, CFF_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{
    error::{Error, LayoutOverflow},
    font_data::FontData,
    read::{FontRead, ReadError},
    tables::{
        compute_checksum,
        head::{Head, CHECKSUM_ADJUSTMENT_OFFSET},
        TopLevelTable,
    },
    util::SearchRange,
    write::{FontWrite, TableWriter},
};

const TABLE_RECORD_LEN: usize = 16;
const TABLE_DIRECTORY_HEADER_LEN: usize = 12;

/// `checkSumAdjustment` is this value minus the checksum of the whole font.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Build a font from some set of tables.
///
/// Tables are kept sorted by tag, which is the order of both the table
/// directory and the table data.
#[derive(Debug, Clone, Default)]
pub struct FontBuilder<'a> {
    tables: BTreeMap<Tag, Cow<'a, [u8]>>,
}

/// One entry of the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    /// Checksum of the unpadded table data.
    pub checksum: u32,
    /// Offset from the start of the font.
    pub offset: u32,
    /// Length of the table, without padding.
    pub length: u32,
}

/// The [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory)
/// at the start of every font file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableDirectory {
    pub sfnt_version: u32,
    pub table_records: Vec<TableRecord>,
}

impl TableDirectory {
    /// The record for `tag`, if the font contains that table.
    pub fn find(&self, tag: Tag) -> Option<&TableRecord> {
        self.table_records.iter().find(|record| record.tag == tag)
    }

    fn search_range(&self) -> SearchRange {
        SearchRange::compute(self.table_records.len(), TABLE_RECORD_LEN)
    }
}

impl FontWrite for TableDirectory {
    fn write_into(&self, writer: &mut TableWriter) {
        let computed = self.search_range();
        self.sfnt_version.write_into(writer);
        (self.table_records.len() as u16).write_into(writer);
        computed.search_range.write_into(writer);
        computed.entry_selector.write_into(writer);
        computed.range_shift.write_into(writer);
        for record in &self.table_records {
            record.tag.write_into(writer);
            record.checksum.write_into(writer);
            record.offset.write_into(writer);
            record.length.write_into(writer);
        }
    }
}

impl FontRead for TableDirectory {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        if ![CFF_SFNT_VERSION, TT_SFNT_VERSION].contains(&sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let num_tables: u16 = cursor.read()?;
        // the binary search parameters are recomputed when writing
        cursor.advance_by(6);
        let mut table_records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let record = TableRecord {
                tag: cursor.read()?,
                checksum: cursor.read()?,
                offset: cursor.read()?,
                length: cursor.read()?,
            };
            if table_records
                .iter()
                .any(|prev: &TableRecord| prev.tag == record.tag)
            {
                return Err(ReadError::DuplicateTable(record.tag));
            }
            table_records.push(record);
        }
        Ok(TableDirectory {
            sfnt_version,
            table_records,
        })
    }
}

impl<'a> FontBuilder<'a> {
    /// Create a new builder to compile a binary font
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder method to add raw data for the provided tag
    pub fn add_raw(&mut self, tag: Tag, data: impl Into<Cow<'a, [u8]>>) -> &mut Self {
        self.tables.insert(tag, data.into());
        self
    }

    /// Returns `true` if the builder contains a table with this tag.
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Assemble all the tables into a binary font file with a [Table Directory].
    ///
    /// Every table is padded to a four byte boundary. If there is a `head`
    /// table, its `checkSumAdjustment` is zeroed before any checksum is
    /// computed and then set so that the whole font sums to `0xB1B0AFBA`.
    ///
    /// [Table Directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory
    pub fn build(&mut self) -> Result<Vec<u8>, Error> {
        LayoutOverflow::check("table count", self.tables.len(), u16::MAX as u64)?;
        if let Some(head) = self.tables.get_mut(&Head::TAG) {
            let adjustment = CHECKSUM_ADJUSTMENT_OFFSET..CHECKSUM_ADJUSTMENT_OFFSET + 4;
            if let Some(bytes) = head.to_mut().get_mut(adjustment) {
                bytes.fill(0);
            }
        }

        let header_len = TABLE_DIRECTORY_HEADER_LEN + self.tables.len() * TABLE_RECORD_LEN;
        let mut position = header_len;
        let mut table_records = Vec::with_capacity(self.tables.len());
        for (tag, data) in &self.tables {
            LayoutOverflow::check("table offset", position, u32::MAX as u64)?;
            table_records.push(TableRecord {
                tag: *tag,
                checksum: compute_checksum(data),
                offset: position as u32,
                length: data.len() as u32,
            });
            position += round4(data.len());
        }
        LayoutOverflow::check("font size", position, u32::MAX as u64)?;

        let directory = TableDirectory {
            sfnt_version: CFF_SFNT_VERSION,
            table_records,
        };
        let mut writer = TableWriter::default();
        directory.write_into(&mut writer);
        for table in self.tables.values() {
            writer.write_slice(table);
            writer.pad_to_4();
        }
        let mut data = writer.into_data();

        if let Some(head) = directory.find(Head::TAG) {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(&data));
            let start = head.offset as usize + CHECKSUM_ADJUSTMENT_OFFSET;
            if let Some(bytes) = data.get_mut(start..start + 4) {
                bytes.copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        log::debug!(
            "assembled {} tables into {} bytes",
            directory.table_records.len(),
            data.len()
        );
        Ok(data)
    }
}

/// <https://github.com/google/woff2/blob/a0d0ed7da27b708c0a4e96ad7a998bddc933c06e/src/round.h#L19>
pub(crate) fn round4(sz: usize) -> usize {
    (sz + 3) & !3
}

#[cfg(test)]
mod tests {
    use font_types::Tag;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sets_binary_search_assists() {
        // Based on Roboto's num tables
        let data = b"doesn't matter".to_vec();
        let mut builder = FontBuilder::default();
        (0..0x16u32).for_each(|i| {
            builder.add_raw(Tag::from_be_bytes(i.to_be_bytes()), &data);
        });
        let bytes = builder.build().unwrap();
        assert_eq!(&bytes[4..12], &[0, 0x16, 1, 0, 0, 4, 0, 96]);
    }

    #[test]
    fn survives_no_tables() {
        let bytes = FontBuilder::default().build().unwrap();
        assert_eq!(bytes, [0x4F, 0x54, 0x54, 0x4F, 0, 0, 0, 0x10, 0, 0, 0, 0]);
    }

    #[test]
    fn records_are_sorted_and_padded() {
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"post"), vec![1u8, 2, 3])
            .add_raw(Tag::new(b"OS/2"), vec![4u8; 5]);
        assert!(builder.contains(Tag::new(b"post")));
        let bytes = builder.build().unwrap();
        let directory = TableDirectory::read(FontData::new(&bytes)).unwrap();
        assert_eq!(
            directory.table_records,
            [
                TableRecord {
                    tag: Tag::new(b"OS/2"),
                    checksum: 0x0404_0404 + 0x0400_0000,
                    offset: 44,
                    length: 5,
                },
                TableRecord {
                    tag: Tag::new(b"post"),
                    checksum: 0x0102_0300,
                    offset: 52,
                    length: 3,
                },
            ]
        );
        assert_eq!(bytes.len(), 56);
        assert_eq!(&bytes[49..52], &[0, 0, 0]);
    }

    #[test]
    fn checksum_adjustment() {
        let mut head = vec![0u8; 54];
        head[CHECKSUM_ADJUSTMENT_OFFSET..CHECKSUM_ADJUSTMENT_OFFSET + 4].fill(0xAB);
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Head::TAG, head)
            .add_raw(Tag::new(b"maxp"), vec![0, 0, 0x50, 0, 0, 2]);
        let bytes = builder.build().unwrap();
        assert_eq!(compute_checksum(&bytes), CHECKSUM_MAGIC);
        // building again starts from a zeroed adjustment
        assert_eq!(builder.build().unwrap(), bytes);
    }

    #[test]
    fn rejects_bad_directories() {
        let mut bytes = FontBuilder::new()
            .add_raw(Tag::new(b"maxp"), vec![0u8; 6])
            .build()
            .unwrap();
        let copy = bytes.clone();
        assert_eq!(
            TableDirectory::read(FontData::new(&copy[..4])),
            Err(ReadError::OutOfBounds)
        );
        bytes[0] = 0;
        assert_eq!(
            TableDirectory::read(FontData::new(&bytes)),
            Err(ReadError::InvalidSfnt(0x0054_544F))
        );

        let duplicated = [
            &copy[..4],
            &[0u8, 2, 0, 32, 0, 1, 0, 0][..],
            &copy[12..28],
            &copy[12..28],
        ]
        .concat();
        assert_eq!(
            TableDirectory::read(FontData::new(&duplicated)),
            Err(ReadError::DuplicateTable(Tag::new(b"maxp")))
        );
    }

    #[test]
    fn pad4() {
        for i in 0..10 {
            let pad = round4(i) - i;
            assert!(pad < 4);
            assert!((i + pad) % 4 == 0, "pad {i} +{pad} bytes");
        }
    }
}
