//! CFF charsets: glyph id to glyph name SID.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf#page=21>

use crate::{font_data::FontData, read::ReadError};

use super::string::StringId;

/// The largest glyph id covered by the ISOAdobe charset.
const ISO_ADOBE_LAST_GID: usize = 228;

/// Encode a format 0 charset.
///
/// `sids` holds the names of every glyph after `.notdef`, which is implicit.
pub(crate) fn encode_format_0(sids: &[StringId]) -> Vec<u8> {
    std::iter::once(0u8)
        .chain(sids.iter().flat_map(|sid| sid.to_u16().to_be_bytes()))
        .collect()
}

/// Read the SID of every glyph, `.notdef` included.
pub(crate) fn read(
    cff_data: &[u8],
    charset_offset: usize,
    num_glyphs: usize,
) -> Result<Vec<StringId>, ReadError> {
    match charset_offset {
        // ISOAdobe is the identity mapping
        0 if num_glyphs <= ISO_ADOBE_LAST_GID + 1 => {
            Ok((0..num_glyphs as u16).map(StringId::new).collect())
        }
        0 => Err(ReadError::MalformedData("too many glyphs for the ISOAdobe charset")),
        1 | 2 => Err(ReadError::MalformedData("expert charsets are not supported")),
        _ => read_custom(cff_data, charset_offset, num_glyphs),
    }
}

fn read_custom(
    cff_data: &[u8],
    offset: usize,
    num_glyphs: usize,
) -> Result<Vec<StringId>, ReadError> {
    let data = FontData::new(cff_data)
        .split_off(offset)
        .ok_or(ReadError::OutOfBounds)?;
    let mut cursor = data.cursor();
    let format: u8 = cursor.read()?;
    let mut sids = Vec::with_capacity(num_glyphs);
    sids.push(StringId::new(0));
    match format {
        0 => {
            let raw: Vec<u16> = cursor.read_array(num_glyphs.saturating_sub(1))?;
            sids.extend(raw.into_iter().map(StringId::new));
        }
        1 | 2 => {
            while sids.len() < num_glyphs {
                let first: u16 = cursor.read()?;
                let n_left = if format == 1 {
                    cursor.read::<u8>()? as u16
                } else {
                    cursor.read::<u16>()?
                };
                let last = first
                    .checked_add(n_left)
                    .ok_or(ReadError::MalformedData("charset range overflows"))?;
                sids.extend((first..=last).map(StringId::new));
            }
            sids.truncate(num_glyphs);
        }
        other => return Err(ReadError::InvalidFormat(other as _)),
    }
    Ok(sids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    fn sids(raw: &[u16]) -> Vec<StringId> {
        raw.iter().copied().map(StringId::new).collect()
    }

    #[test]
    fn format_0() {
        let bytes = encode_format_0(&sids(&[391]));
        assert_eq!(bytes, [0x00, 0x01, 0x87]);
        assert_eq!(read(&bytes, 0, 1).unwrap(), sids(&[0]));
        // offsets below 3 name predefined charsets, so pad in front
        let padded = [[0u8; 3].as_slice(), &bytes].concat();
        assert_eq!(read(&padded, 3, 2).unwrap(), sids(&[0, 391]));
    }

    #[test]
    fn format_1_ranges() {
        let buf = BeBuffer::new()
            .extend([0u8; 4])
            .push(1u8)
            .push(34u16)
            .push(2u8)
            .push(400u16)
            .push(0u8);
        assert_eq!(read(&buf, 4, 5).unwrap(), sids(&[0, 34, 35, 36, 400]));
    }

    #[test]
    fn format_2_ranges() {
        let buf = BeBuffer::new()
            .extend([0u8; 4])
            .push(2u8)
            .push(1u16)
            .push(300u16);
        let charset = read(&buf, 4, 50).unwrap();
        assert_eq!(charset.len(), 50);
        assert_eq!(charset[49], StringId::new(49));
    }

    #[test]
    fn iso_adobe() {
        assert_eq!(read(&[], 0, 3).unwrap(), sids(&[0, 1, 2]));
        assert!(read(&[], 0, 300).is_err());
        assert!(read(&[], 1, 3).is_err());
    }

    #[test]
    fn truncated() {
        let bytes = [0u8, 0, 0, 0, 0x01, 0x87];
        assert_eq!(read(&bytes, 3, 3), Err(ReadError::OutOfBounds));
    }
}
