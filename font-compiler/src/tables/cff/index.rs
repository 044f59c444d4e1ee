//! CFF INDEX objects.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/cff2#5-index-data>

use crate::{
    error::{Error, LayoutOverflow},
    font_data::FontData,
    read::ReadError,
    write::{FontWrite, TableWriter},
};

/// An INDEX to be written: an array of variable length objects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Index {
    items: Vec<Vec<u8>>,
    off_size: u8,
}

/// The number of bytes needed to store `value` as an offset.
pub(crate) fn offset_size(value: usize) -> u8 {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x10000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

impl Index {
    pub(crate) fn new(items: Vec<Vec<u8>>) -> Result<Self, Error> {
        LayoutOverflow::check("CFF INDEX count", items.len(), u16::MAX as u64)?;
        // offsets are 1-based
        let last_offset = items.iter().map(Vec::len).sum::<usize>() + 1;
        LayoutOverflow::check("CFF INDEX data", last_offset, u32::MAX as u64)?;
        Ok(Index {
            off_size: offset_size(last_offset),
            items,
        })
    }

    /// The encoded size in bytes.
    pub(crate) fn len(&self) -> usize {
        if self.items.is_empty() {
            return 2;
        }
        let data_len: usize = self.items.iter().map(Vec::len).sum();
        2 + 1 + (self.items.len() + 1) * self.off_size as usize + data_len
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut writer = TableWriter::default();
        self.write_into(&mut writer);
        writer.into_data()
    }
}

impl FontWrite for Index {
    fn write_into(&self, writer: &mut TableWriter) {
        (self.items.len() as u16).write_into(writer);
        if self.items.is_empty() {
            return;
        }
        self.off_size.write_into(writer);
        let mut offset = 1u32;
        let width = self.off_size as usize;
        for len in std::iter::once(0).chain(self.items.iter().map(Vec::len)) {
            offset += len as u32;
            writer.write_slice(&offset.to_be_bytes()[4 - width..]);
        }
        for item in &self.items {
            writer.write_slice(item);
        }
    }
}

/// An INDEX read from font data.
#[derive(Clone, Debug, Default)]
pub(crate) struct IndexData<'a> {
    offsets: Vec<usize>,
    data: &'a [u8],
    size_in_bytes: usize,
}

impl<'a> IndexData<'a> {
    /// Read the INDEX that starts at `offset` in `bytes`.
    pub(crate) fn read(bytes: &'a [u8], offset: usize) -> Result<Self, ReadError> {
        let data = FontData::new(bytes)
            .split_off(offset)
            .ok_or(ReadError::OutOfBounds)?;
        let mut cursor = data.cursor();
        let count: u16 = cursor.read()?;
        if count == 0 {
            return Ok(IndexData {
                size_in_bytes: 2,
                ..Default::default()
            });
        }
        let off_size: u8 = cursor.read()?;
        if !(1..=4).contains(&off_size) {
            return Err(ReadError::InvalidFormat(off_size as _));
        }
        let offsets = (0..=count)
            .map(|_| {
                let raw = cursor.read_bytes(off_size as usize)?;
                let offset = raw.iter().fold(0usize, |acc, b| acc << 8 | *b as usize);
                // offsets are 1-based
                offset
                    .checked_sub(1)
                    .ok_or(ReadError::MalformedData("zero offset in CFF INDEX"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(ReadError::MalformedData("CFF INDEX offsets must not decrease"));
        }
        let data_len = offsets.last().copied().unwrap_or_default();
        let start = cursor.position();
        let data = data.bytes_at(start, data_len)?;
        Ok(IndexData {
            offsets,
            data,
            size_in_bytes: start + data_len,
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub(crate) fn get(&self, index: usize) -> Result<&'a [u8], ReadError> {
        let start = *self.offsets.get(index).ok_or(ReadError::OutOfBounds)?;
        let end = *self.offsets.get(index + 1).ok_or(ReadError::OutOfBounds)?;
        self.data.get(start..end).ok_or(ReadError::OutOfBounds)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Result<&'a [u8], ReadError>> + '_ {
        (0..self.count()).map(|i| self.get(i))
    }

    /// The size of the whole INDEX structure, header included.
    pub(crate) fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
