//! A directory of all the font tables.

use font_types::Tag;

pub mod cff;
pub mod cmap;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

/// A table that has an associated tag.
///
/// This is true of top-level tables, but not their various subtables.
pub trait TopLevelTable {
    /// The table's tag.
    const TAG: Tag;
}

/// Compute the checksum of a table.
///
/// The table is summed as a sequence of big-endian `u32` words, with any
/// trailing bytes padded with zeros.
pub fn compute_checksum(table: &[u8]) -> u32 {
    let mut chunks = table.chunks_exact(4);
    let mut sum = chunks.by_ref().fold(0u32, |acc, chunk| {
        acc.wrapping_add(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    });
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut last = [0u8; 4];
        last[..rem.len()].copy_from_slice(rem);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}
