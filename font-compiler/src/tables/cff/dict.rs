//! Top and Private DICTs.
//!
//! See "Table 9 Top DICT Operator Entries" and "Table 23 Private DICT
//! Operators" at <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf>

use crate::{error::Error, font_data::FontData, read::ReadError};

use super::string::{StringId, StringTable, Strings};

/// Escape opcode for two byte operators.
const ESCAPE: u8 = 12;

/// The most operands allowed before an operator.
const MAX_OPERANDS: usize = 48;

/// DICT operators that are read or written.
///
/// Two byte operators are numbered `1200 + second byte`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Operator {
    Version,
    Notice,
    Copyright,
    FullName,
    FamilyName,
    Weight,
    IsFixedPitch,
    ItalicAngle,
    UnderlinePosition,
    UnderlineThickness,
    FontMatrix,
    FontBbox,
    Charset,
    CharStrings,
    Private,
    Subrs,
    DefaultWidthX,
    NominalWidthX,
}

impl Operator {
    fn from_code(code: u16) -> Option<Self> {
        use Operator::*;
        Some(match code {
            0 => Version,
            1 => Notice,
            2 => FullName,
            3 => FamilyName,
            4 => Weight,
            5 => FontBbox,
            15 => Charset,
            17 => CharStrings,
            18 => Private,
            19 => Subrs,
            20 => DefaultWidthX,
            21 => NominalWidthX,
            1200 => Copyright,
            1201 => IsFixedPitch,
            1202 => ItalicAngle,
            1203 => UnderlinePosition,
            1204 => UnderlineThickness,
            1207 => FontMatrix,
            _ => return None,
        })
    }

    fn code(self) -> u16 {
        use Operator::*;
        match self {
            Version => 0,
            Notice => 1,
            FullName => 2,
            FamilyName => 3,
            Weight => 4,
            FontBbox => 5,
            Charset => 15,
            CharStrings => 17,
            Private => 18,
            Subrs => 19,
            DefaultWidthX => 20,
            NominalWidthX => 21,
            Copyright => 1200,
            IsFixedPitch => 1201,
            ItalicAngle => 1202,
            UnderlinePosition => 1203,
            UnderlineThickness => 1204,
            FontMatrix => 1207,
        }
    }
}

/// Builds the bytes of a DICT.
#[derive(Clone, Debug, Default)]
pub(crate) struct DictWriter {
    data: Vec<u8>,
}

impl DictWriter {
    /// Write an integer in the shortest encoding.
    pub(crate) fn integer(&mut self, value: i32) -> &mut Self {
        // Size   b0 range     Value range              Value calculation
        //--------------------------------------------------------------------------------
        // 1      32 to 246    -107 to +107             b0 - 139
        // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
        // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
        // 3      28           -32768 to +32767         b1 << 8 | b2
        // 5      29           -(2^31) to +(2^31 - 1)   b1 << 24 | b2 << 16 | b3 << 8 | b4
        match value {
            -107..=107 => self.data.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.data.extend([(v >> 8) as u8 + 247, v as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.data.extend([(v >> 8) as u8 + 251, v as u8]);
            }
            -32768..=32767 => {
                self.data.push(28);
                self.data.extend((value as i16).to_be_bytes());
            }
            _ => self.offset(value),
        }
        self
    }

    /// Write an integer in the fixed five byte encoding.
    ///
    /// Used for offsets, so the DICT size does not depend on their value.
    pub(crate) fn offset(&mut self, value: i32) {
        self.data.push(29);
        self.data.extend(value.to_be_bytes());
    }

    /// Write a real number as packed binary coded decimal.
    pub(crate) fn real(&mut self, value: f64) -> &mut Self {
        let text = value.to_string();
        let text = text.strip_prefix("0.").map(|rest| format!(".{rest}")).unwrap_or(text);
        let text = text
            .strip_prefix("-0.")
            .map(|rest| format!("-.{rest}"))
            .unwrap_or(text);
        let mut nibbles: Vec<u8> = text
            .bytes()
            .filter_map(|b| match b {
                b'0'..=b'9' => Some(b - b'0'),
                b'.' => Some(0xa),
                b'-' => Some(0xe),
                _ => None,
            })
            .collect();
        nibbles.push(0xf);
        if nibbles.len() % 2 != 0 {
            nibbles.push(0xf);
        }
        self.data.push(30);
        self.data
            .extend(nibbles.chunks_exact(2).map(|pair| pair[0] << 4 | pair[1]));
        self
    }

    /// Write a number, as an integer when it has no fractional part.
    pub(crate) fn number(&mut self, value: f64) -> &mut Self {
        if value.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&value) {
            self.integer(value as i32)
        } else {
            self.real(value)
        }
    }

    pub(crate) fn sid(&mut self, sid: StringId) -> &mut Self {
        self.integer(sid.to_u16() as i32)
    }

    pub(crate) fn operator(&mut self, op: Operator) {
        match op.code() {
            code @ 1200.. => self.data.extend([ESCAPE, (code - 1200) as u8]),
            code => self.data.push(code as u8),
        }
    }

    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Split DICT data into operators and their operands.
///
/// Unknown operators are returned as `Err(code)` so callers can skip them.
pub(crate) fn entries(dict_data: &[u8]) -> Result<Vec<(Result<Operator, u16>, Vec<f64>)>, ReadError> {
    let mut cursor = FontData::new(dict_data).cursor();
    let mut entries = Vec::new();
    let mut operands = Vec::new();
    while cursor.remaining() != 0 {
        let b0: u8 = cursor.read()?;
        match b0 {
            28 | 29 | 32..=254 => operands.push(parse_int(&mut cursor, b0)? as f64),
            30 => operands.push(parse_real(&mut cursor)?),
            ESCAPE => {
                let b1: u8 = cursor.read()?;
                let code = 1200 + b1 as u16;
                entries.push((
                    Operator::from_code(code).ok_or(code),
                    std::mem::take(&mut operands),
                ));
            }
            0..=21 => entries.push((
                Operator::from_code(b0 as u16).ok_or(b0 as u16),
                std::mem::take(&mut operands),
            )),
            _ => return Err(ReadError::MalformedData("reserved byte in CFF DICT")),
        }
        if operands.len() > MAX_OPERANDS {
            return Err(ReadError::MalformedData("too many operands in CFF DICT"));
        }
    }
    Ok(entries)
}

/// Parse an integer operand, shared with charstrings.
pub(crate) fn parse_int(cursor: &mut crate::font_data::Cursor, b0: u8) -> Result<i32, ReadError> {
    Ok(match b0 {
        32..=246 => b0 as i32 - 139,
        247..=250 => (b0 as i32 - 247) * 256 + cursor.read::<u8>()? as i32 + 108,
        251..=254 => -(b0 as i32 - 251) * 256 - cursor.read::<u8>()? as i32 - 108,
        28 => cursor.read::<i16>()? as i32,
        29 => cursor.read::<i32>()?,
        _ => return Err(ReadError::MalformedData("invalid CFF integer")),
    })
}

fn parse_real(cursor: &mut crate::font_data::Cursor) -> Result<f64, ReadError> {
    let mut text = String::new();
    'bytes: loop {
        let byte: u8 = cursor.read()?;
        for nibble in [byte >> 4, byte & 0xf] {
            match nibble {
                0..=9 => text.push((b'0' + nibble) as char),
                0xa => text.push('.'),
                0xb => text.push('E'),
                0xc => text.push_str("E-"),
                0xe => text.push('-'),
                0xf => break 'bytes,
                _ => return Err(ReadError::MalformedData("reserved nibble in CFF real")),
            }
        }
    }
    text.parse()
        .map_err(|_| ReadError::MalformedData("malformed CFF real"))
}

/// The font-wide values of the Top DICT.
///
/// Offsets to other structures are computed during layout and are not
/// stored here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopDict {
    pub version: Option<String>,
    pub notice: Option<String>,
    pub copyright: Option<String>,
    pub full_name: Option<String>,
    pub family_name: Option<String>,
    pub weight: Option<String>,
    pub is_fixed_pitch: bool,
    pub italic_angle: f64,
    pub underline_position: f64,
    pub underline_thickness: f64,
    pub font_matrix: [f64; 6],
    pub font_bbox: [i32; 4],
}

pub(crate) const DEFAULT_FONT_MATRIX: [f64; 6] = [0.001, 0.0, 0.0, 0.001, 0.0, 0.0];

impl Default for TopDict {
    fn default() -> Self {
        TopDict {
            version: None,
            notice: None,
            copyright: None,
            full_name: None,
            family_name: None,
            weight: None,
            is_fixed_pitch: false,
            italic_angle: 0.0,
            underline_position: -100.0,
            underline_thickness: 50.0,
            font_matrix: DEFAULT_FONT_MATRIX,
            font_bbox: [0; 4],
        }
    }
}

/// Where the structures referenced by the Top DICT start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TopDictOffsets {
    pub(crate) charset: usize,
    pub(crate) charstrings: usize,
    pub(crate) private_size: usize,
    pub(crate) private_offset: usize,
}

impl TopDict {
    /// Encode the DICT, omitting values equal to their defaults.
    pub(crate) fn encode(
        &self,
        strings: &mut StringTable,
        offsets: &TopDictOffsets,
    ) -> Result<Vec<u8>, Error> {
        let defaults = TopDict::default();
        let mut dict = DictWriter::default();
        for (op, value) in [
            (Operator::Version, &self.version),
            (Operator::Notice, &self.notice),
            (Operator::Copyright, &self.copyright),
            (Operator::FullName, &self.full_name),
            (Operator::FamilyName, &self.family_name),
            (Operator::Weight, &self.weight),
        ] {
            if let Some(value) = value {
                dict.sid(strings.intern(value)?).operator(op);
            }
        }
        if self.is_fixed_pitch {
            dict.integer(1).operator(Operator::IsFixedPitch);
        }
        for (op, value, default) in [
            (Operator::ItalicAngle, self.italic_angle, defaults.italic_angle),
            (
                Operator::UnderlinePosition,
                self.underline_position,
                defaults.underline_position,
            ),
            (
                Operator::UnderlineThickness,
                self.underline_thickness,
                defaults.underline_thickness,
            ),
        ] {
            if value != default {
                dict.number(value).operator(op);
            }
        }
        if self.font_matrix != DEFAULT_FONT_MATRIX {
            for value in self.font_matrix {
                dict.number(value);
            }
            dict.operator(Operator::FontMatrix);
        }
        if self.font_bbox != [0; 4] {
            for value in self.font_bbox {
                dict.integer(value);
            }
            dict.operator(Operator::FontBbox);
        }
        dict.offset(offsets.charset as i32);
        dict.operator(Operator::Charset);
        dict.offset(offsets.charstrings as i32);
        dict.operator(Operator::CharStrings);
        dict.integer(offsets.private_size as i32);
        dict.offset(offsets.private_offset as i32);
        dict.operator(Operator::Private);
        Ok(dict.into_data())
    }

    pub(crate) fn parse(
        dict_data: &[u8],
        strings: &Strings,
    ) -> Result<(TopDict, TopDictOffsets), ReadError> {
        let mut dict = TopDict::default();
        let mut offsets = TopDictOffsets::default();
        let mut has_charstrings = false;
        for (op, operands) in entries(dict_data)? {
            let op = match op {
                Ok(op) => op,
                Err(code) => {
                    log::debug!("skipping Top DICT operator {code}");
                    continue;
                }
            };
            let first = || {
                operands
                    .first()
                    .copied()
                    .ok_or(ReadError::MalformedData("missing DICT operand"))
            };
            let string = || -> Result<Option<String>, ReadError> {
                Ok(Some(strings.get(StringId::new(first()? as u16))?))
            };
            match op {
                Operator::Version => dict.version = string()?,
                Operator::Notice => dict.notice = string()?,
                Operator::Copyright => dict.copyright = string()?,
                Operator::FullName => dict.full_name = string()?,
                Operator::FamilyName => dict.family_name = string()?,
                Operator::Weight => dict.weight = string()?,
                Operator::IsFixedPitch => dict.is_fixed_pitch = first()? != 0.0,
                Operator::ItalicAngle => dict.italic_angle = first()?,
                Operator::UnderlinePosition => dict.underline_position = first()?,
                Operator::UnderlineThickness => dict.underline_thickness = first()?,
                Operator::FontMatrix => {
                    dict.font_matrix = operands
                        .as_slice()
                        .try_into()
                        .map_err(|_| ReadError::MalformedData("FontMatrix needs six operands"))?
                }
                Operator::FontBbox => {
                    let [x_min, y_min, x_max, y_max]: [f64; 4] = operands
                        .as_slice()
                        .try_into()
                        .map_err(|_| ReadError::MalformedData("FontBBox needs four operands"))?;
                    dict.font_bbox = [x_min, y_min, x_max, y_max].map(|v| v.round() as i32);
                }
                Operator::Charset => offsets.charset = first()? as usize,
                Operator::CharStrings => {
                    offsets.charstrings = first()? as usize;
                    has_charstrings = true;
                }
                Operator::Private => {
                    let [size, offset]: [f64; 2] = operands
                        .as_slice()
                        .try_into()
                        .map_err(|_| ReadError::MalformedData("Private needs two operands"))?;
                    offsets.private_size = size as usize;
                    offsets.private_offset = offset as usize;
                }
                // Private DICT operators
                Operator::Subrs | Operator::DefaultWidthX | Operator::NominalWidthX => (),
            }
        }
        if !has_charstrings {
            return Err(ReadError::MalformedData("Top DICT has no CharStrings offset"));
        }
        Ok((dict, offsets))
    }
}

/// The Private DICT values used by charstrings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrivateDict {
    /// Advance of glyphs whose charstring omits the width.
    pub default_width_x: f64,
    /// Added to the width operand of a charstring.
    pub nominal_width_x: f64,
}

impl PrivateDict {
    /// Both widths are always written, even when they are zero.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut dict = DictWriter::default();
        dict.number(self.default_width_x)
            .operator(Operator::DefaultWidthX);
        dict.number(self.nominal_width_x)
            .operator(Operator::NominalWidthX);
        dict.into_data()
    }

    pub(crate) fn parse(dict_data: &[u8]) -> Result<Self, ReadError> {
        let mut dict = PrivateDict::default();
        for (op, operands) in entries(dict_data)? {
            let value = operands.first().copied().unwrap_or_default();
            match op {
                Ok(Operator::DefaultWidthX) => dict.default_width_x = value,
                Ok(Operator::NominalWidthX) => dict.nominal_width_x = value,
                Ok(Operator::Subrs) => {
                    log::warn!("local subroutines are present but calls to them are not supported")
                }
                _ => (),
            }
        }
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::cff::index::IndexData;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn encode_int(value: i32) -> Vec<u8> {
        let mut dict = DictWriter::default();
        dict.integer(value);
        dict.into_data()
    }

    #[rstest]
    #[case(0, &[0x8B])]
    #[case(-107, &[0x20])]
    #[case(107, &[0xF6])]
    #[case(392, &[0xF8, 0x1C])]
    #[case(500, &[0xF8, 0x88])]
    #[case(800, &[0xF9, 0xB4])]
    #[case(-1131, &[0xFE, 0xFF])]
    #[case(-108, &[0xFB, 0x00])]
    #[case(10000, &[0x1C, 0x27, 0x10])]
    #[case(100000, &[0x1D, 0x00, 0x01, 0x86, 0xA0])]
    fn integer_encoding(#[case] value: i32, #[case] expected: &[u8]) {
        let bytes = encode_int(value);
        assert_eq!(bytes, expected);
        let mut cursor = FontData::new(&bytes).cursor();
        let b0: u8 = cursor.read().unwrap();
        assert_eq!(parse_int(&mut cursor, b0).unwrap(), value);
    }

    #[test]
    fn real_encoding() {
        let mut dict = DictWriter::default();
        dict.real(-2.25).real(0.001);
        let bytes = dict.into_data();
        // from the examples in the CFF specification
        assert_eq!(&bytes[..4], &[0x1E, 0xE2, 0xA2, 0x5F]);
        assert_eq!(&bytes[4..], &[0x1E, 0xA0, 0x01, 0xFF]);
        let entries = entries(&[bytes.as_slice(), &[ESCAPE, 2][..]].concat()).unwrap();
        assert_eq!(entries[0].1, [-2.25, 0.001]);
    }

    #[test]
    fn exponent_reals() {
        // 1.140541E-05
        let bytes = [0x1E, 0x1A, 0x14, 0x05, 0x41, 0xC0, 0x5F, 0x00];
        let entries = entries(&bytes).unwrap();
        assert_eq!(entries[0].1, [1.140541E-05]);
        assert_eq!(entries[0].0, Ok(Operator::Version));
    }

    #[test]
    fn fixture_top_dict() {
        let mut strings = StringTable::default();
        strings.intern("a").unwrap();
        let dict = TopDict {
            version: Some("Version 0.1".into()),
            full_name: Some("Test Medium".into()),
            family_name: Some("Test".into()),
            weight: Some("Medium".into()),
            font_bbox: [0, 0, 800, 500],
            ..Default::default()
        };
        let offsets = TopDictOffsets {
            charset: 106,
            charstrings: 109,
            private_size: 4,
            private_offset: 151,
        };
        let bytes = dict.encode(&mut strings, &offsets).unwrap();
        assert_eq!(bytes, &font_test_data::tables::CFF[24..62]);

        let string_index = strings.to_index().unwrap().to_bytes();
        let strings = Strings::new(IndexData::read(&string_index, 0).unwrap());
        let (parsed, parsed_offsets) = TopDict::parse(&bytes, &strings).unwrap();
        assert_eq!(parsed, dict);
        assert_eq!(parsed_offsets, offsets);
    }

    #[test]
    fn non_default_values() {
        let dict = TopDict {
            is_fixed_pitch: true,
            italic_angle: -12.5,
            underline_position: -75.0,
            font_matrix: [1.0 / 2048.0, 0.0, 0.0, 1.0 / 2048.0, 0.0, 0.0],
            ..Default::default()
        };
        let mut strings = StringTable::default();
        let bytes = dict
            .encode(&mut strings, &TopDictOffsets::default())
            .unwrap();
        let (parsed, _) = TopDict::parse(&bytes, &Strings::new(Default::default())).unwrap();
        assert_eq!(parsed, dict);
    }

    #[test]
    fn missing_charstrings() {
        let bytes = [0x8B, 0x0F];
        assert!(TopDict::parse(&bytes, &Strings::new(Default::default())).is_err());
    }

    #[test]
    fn private_dict() {
        // 0 defaultWidthX 0 nominalWidthX
        let zero = PrivateDict::default();
        assert_eq!(zero.encode(), [0x8B, 0x14, 0x8B, 0x15]);
        assert_eq!(PrivateDict::parse(&zero.encode()).unwrap(), zero);
        let dict = PrivateDict {
            default_width_x: 500.0,
            nominal_width_x: 600.0,
        };
        let bytes = dict.encode();
        assert_eq!(PrivateDict::parse(&bytes).unwrap(), dict);
    }
}
