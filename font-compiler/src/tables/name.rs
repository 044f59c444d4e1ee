//! The [name](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use std::collections::HashMap;

use font_types::{NameId, Tag};

use crate::{
    error::{Error, LayoutOverflow},
    font_data::FontData,
    read::{FontRead, ReadError},
    settings::FontSettings,
    tables::TopLevelTable,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// Platform id for Windows.
pub const PLATFORM_WINDOWS: u16 = 3;
/// Windows Unicode BMP encoding.
pub const ENCODING_WINDOWS_UNICODE_BMP: u16 = 1;
/// Windows language id for English (United States).
pub const LANGUAGE_EN_US: u16 = 0x0409;

/// Written in place of name strings that were not provided.
const UNSET: &str = " ";

/// The [name](https://docs.microsoft.com/en-us/typography/opentype/spec/name)
/// (naming) table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    /// The name records, sorted by platform, encoding, language and name id.
    pub name_record: Vec<NameRecord>,
}

/// Part of [`Name`].
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameRecord {
    /// Platform ID.
    pub platform_id: u16,
    /// Platform-specific encoding ID.
    pub encoding_id: u16,
    /// Language ID.
    pub language_id: u16,
    /// Name ID.
    pub name_id: NameId,
    /// The decoded string.
    pub string: String,
}

/// The text encoding of a name record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf16Be,
    /// Only the ASCII subset of Mac Roman is supported.
    MacRoman,
    Unknown,
}

impl Encoding {
    /// The encoding used for a platform and encoding id pair.
    pub fn new(platform_id: u16, encoding_id: u16) -> Encoding {
        match (platform_id, encoding_id) {
            (0, _) => Encoding::Utf16Be,
            (1, 0) => Encoding::MacRoman,
            (3, 0 | 1 | 10) => Encoding::Utf16Be,
            _ => Encoding::Unknown,
        }
    }

    fn encode(self, string: &str) -> Option<Vec<u8>> {
        match self {
            Encoding::Utf16Be => Some(
                string
                    .encode_utf16()
                    .flat_map(|unit| unit.to_be_bytes())
                    .collect(),
            ),
            Encoding::MacRoman => string.is_ascii().then(|| string.as_bytes().to_vec()),
            Encoding::Unknown => None,
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<String, ReadError> {
        match self {
            Encoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(ReadError::MalformedData("odd length UTF-16 name string"));
                }
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                Ok(char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect())
            }
            Encoding::MacRoman => Ok(bytes
                .iter()
                .map(|b| match *b {
                    b if b.is_ascii() => b as char,
                    _ => char::REPLACEMENT_CHARACTER,
                })
                .collect()),
            Encoding::Unknown => Err(ReadError::MalformedData("unknown name encoding")),
        }
    }
}

impl NameRecord {
    /// A record for the Windows platform, in US English.
    pub fn windows_en(name_id: NameId, string: impl Into<String>) -> Self {
        NameRecord {
            platform_id: PLATFORM_WINDOWS,
            encoding_id: ENCODING_WINDOWS_UNICODE_BMP,
            language_id: LANGUAGE_EN_US,
            name_id,
            string: string.into(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::new(self.platform_id, self.encoding_id)
    }

    fn sort_key(&self) -> (u16, u16, u16, NameId) {
        (
            self.platform_id,
            self.encoding_id,
            self.language_id,
            self.name_id,
        )
    }
}

impl Name {
    /// Build the English names for a font.
    pub fn create_table(settings: &FontSettings) -> Self {
        let full_name = settings.full_name();
        let unique_id = match &settings.manufacturer {
            Some(manufacturer) => format!("{manufacturer}:{full_name}"),
            None => full_name.clone(),
        };
        let opt = |value: &Option<String>| value.clone().unwrap_or_else(|| UNSET.to_owned());
        let strings = [
            (NameId::COPYRIGHT_NOTICE, opt(&settings.copyright)),
            (NameId::FAMILY_NAME, settings.family_name.clone()),
            (NameId::SUBFAMILY_NAME, settings.style_name.clone()),
            (NameId::UNIQUE_ID, unique_id),
            (NameId::FULL_NAME, full_name),
            (NameId::VERSION_STRING, settings.version.clone()),
            (NameId::POSTSCRIPT_NAME, settings.postscript_name()),
            (NameId::TRADEMARK, opt(&settings.trademark)),
            (NameId::MANUFACTURER, opt(&settings.manufacturer)),
            (NameId::DESIGNER, opt(&settings.designer)),
            (NameId::DESCRIPTION, opt(&settings.description)),
            (NameId::VENDOR_URL, opt(&settings.manufacturer_url)),
            (NameId::DESIGNER_URL, opt(&settings.designer_url)),
            (NameId::LICENSE_DESCRIPTION, opt(&settings.license)),
            (NameId::LICENSE_URL, opt(&settings.license_url)),
            (
                NameId::TYPOGRAPHIC_FAMILY_NAME,
                settings
                    .preferred_family
                    .clone()
                    .unwrap_or_else(|| settings.family_name.clone()),
            ),
            (
                NameId::TYPOGRAPHIC_SUBFAMILY_NAME,
                settings
                    .preferred_subfamily
                    .clone()
                    .unwrap_or_else(|| settings.style_name.clone()),
            ),
        ];
        let mut name_record: Vec<_> = strings
            .into_iter()
            .map(|(id, string)| NameRecord::windows_en(id, string))
            .collect();
        name_record.sort();
        Name { name_record }
    }

    /// The string for a name id in any Unicode record.
    pub fn get(&self, name_id: NameId) -> Option<&str> {
        self.name_record
            .iter()
            .find(|record| record.name_id == name_id && record.encoding() == Encoding::Utf16Be)
            .map(|record| record.string.as_str())
    }

    /// Validate and encode the table.
    ///
    /// Identical encoded strings share storage.
    pub fn compile(&self) -> Result<Vec<u8>, Error> {
        self.validate()?;
        LayoutOverflow::check("name record count", self.name_record.len(), u16::MAX as u64)?;
        let storage_offset = 6 + self.name_record.len() * 12;
        LayoutOverflow::check("name storage offset", storage_offset, u16::MAX as u64)?;

        let mut storage = Vec::new();
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut records = Vec::with_capacity(self.name_record.len());
        for record in &self.name_record {
            // validation guarantees every string is encodable
            let encoded = record.encoding().encode(&record.string).unwrap_or_default();
            LayoutOverflow::check("name string length", encoded.len(), u16::MAX as u64)?;
            let len = encoded.len();
            let offset = match seen.get(&encoded) {
                Some(offset) => *offset,
                None => {
                    let offset = storage.len();
                    storage.extend_from_slice(&encoded);
                    seen.insert(encoded, offset);
                    offset
                }
            };
            LayoutOverflow::check("name string offset", offset, u16::MAX as u64)?;
            records.push((record, len as u16, offset as u16));
        }
        log::debug!(
            "name: {} records, {} bytes of string data",
            records.len(),
            storage.len()
        );

        let mut writer = TableWriter::default();
        CompiledName {
            records: &records,
            storage_offset: storage_offset as u16,
            storage: &storage,
        }
        .write_into(&mut writer);
        Ok(writer.into_data())
    }
}

/// A name table with its string storage laid out.
struct CompiledName<'a> {
    records: &'a [(&'a NameRecord, u16, u16)],
    storage_offset: u16,
    storage: &'a [u8],
}

impl FontWrite for CompiledName<'_> {
    fn write_into(&self, writer: &mut TableWriter) {
        // version
        0u16.write_into(writer);
        (self.records.len() as u16).write_into(writer);
        self.storage_offset.write_into(writer);
        for (record, len, offset) in self.records {
            record.platform_id.write_into(writer);
            record.encoding_id.write_into(writer);
            record.language_id.write_into(writer);
            record.name_id.write_into(writer);
            len.write_into(writer);
            offset.write_into(writer);
        }
        writer.write_slice(self.storage);
    }
}

impl TopLevelTable for Name {
    const TAG: Tag = Tag::new(b"name");
}

impl Validate for Name {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("name", |ctx| {
            ctx.in_field("name_record", |ctx| {
                if self
                    .name_record
                    .windows(2)
                    .any(|pair| pair[0].sort_key() > pair[1].sort_key())
                {
                    ctx.report("name_record array must be sorted");
                }
                for pair in self.name_record.windows(2) {
                    if pair[0].sort_key() == pair[1].sort_key() {
                        ctx.report(format!("duplicate entry in name_record: '{}'", pair[0].name_id))
                    }
                }
                ctx.in_array(|ctx| {
                    for record in &self.name_record {
                        ctx.array_item(|ctx| match record.encoding() {
                            Encoding::Unknown => ctx.report(format!(
                                "Unhandled platform/encoding id pair: ({}, {})",
                                record.platform_id, record.encoding_id
                            )),
                            Encoding::MacRoman if !record.string.is_ascii() => ctx.report(
                                format!("'{}' is not representable in Mac Roman", record.string),
                            ),
                            _ => (),
                        })
                    }
                })
            })
        })
    }
}

impl FontRead for Name {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u16 = cursor.read()?;
        if version > 1 {
            return Err(ReadError::InvalidFormat(version as _));
        }
        let count: u16 = cursor.read()?;
        let storage_offset: u16 = cursor.read()?;
        let storage = data
            .split_off(storage_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let mut name_record = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let platform_id = cursor.read()?;
            let encoding_id = cursor.read()?;
            let language_id = cursor.read()?;
            let name_id = cursor.read()?;
            let length: u16 = cursor.read()?;
            let offset: u16 = cursor.read()?;
            let encoding = Encoding::new(platform_id, encoding_id);
            if encoding == Encoding::Unknown {
                log::warn!("skipping name {name_id:?} with encoding ({platform_id}, {encoding_id})");
                continue;
            }
            let bytes = storage.bytes_at(offset as usize, length as usize)?;
            name_record.push(NameRecord {
                platform_id,
                encoding_id,
                language_id,
                name_id,
                string: encoding.decode(bytes)?,
            });
        }
        Ok(Name { name_record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn settings() -> FontSettings {
        FontSettings {
            family_name: "Test".into(),
            style_name: "Medium".into(),
            ..Default::default()
        }
    }

    #[test]
    fn english_names() {
        let name = Name::create_table(&settings());
        assert_eq!(name.name_record.len(), 17);
        assert_eq!(name.get(NameId::FAMILY_NAME), Some("Test"));
        assert_eq!(name.get(NameId::FULL_NAME), Some("Test Medium"));
        assert_eq!(name.get(NameId::UNIQUE_ID), Some("Test Medium"));
        assert_eq!(name.get(NameId::POSTSCRIPT_NAME), Some("TestMedium"));
        assert_eq!(name.get(NameId::VERSION_STRING), Some("Version 0.1"));
        assert_eq!(name.get(NameId::TRADEMARK), Some(" "));
        assert_eq!(name.get(NameId::TYPOGRAPHIC_SUBFAMILY_NAME), Some("Medium"));
        assert_eq!(name.get(NameId::new(15)), None);
    }

    #[test]
    fn unique_id_with_manufacturer() {
        let settings = FontSettings {
            manufacturer: Some("Foundry".into()),
            ..settings()
        };
        let name = Name::create_table(&settings);
        assert_eq!(name.get(NameId::UNIQUE_ID), Some("Foundry:Test Medium"));
    }

    #[test]
    fn shared_storage() {
        init();
        let name = Name::create_table(&settings());
        let bytes = name.compile().unwrap();
        let storage_offset = 6 + 17 * 12;
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), storage_offset);
        // " " once, "Test", "Medium", "Test Medium", "Version 0.1", "TestMedium"
        let expected_storage = 2 * (1 + 4 + 6 + 11 + 11 + 10);
        assert_eq!(bytes.len(), storage_offset as usize + expected_storage);
    }

    #[test]
    fn roundtrip() {
        let mut name = Name::create_table(&settings());
        name.name_record.push(NameRecord {
            platform_id: 1,
            encoding_id: 0,
            language_id: 0,
            name_id: NameId::FAMILY_NAME,
            string: "Test".into(),
        });
        name.name_record
            .push(NameRecord::windows_en(NameId::new(256), "Ünïcödé 世界"));
        name.name_record.sort();
        let bytes = name.compile().unwrap();
        let loaded = Name::read(FontData::new(&bytes)).unwrap();
        assert_eq!(loaded, name);
    }

    #[test]
    fn sorting_and_duplicates() {
        let mut name = Name::default();
        name.name_record
            .push(NameRecord::windows_en(NameId::FULL_NAME, "b"));
        name.name_record
            .push(NameRecord::windows_en(NameId::FAMILY_NAME, "a"));
        assert!(name.compile().is_err());
        name.name_record.sort();
        assert!(name.compile().is_ok());
        name.name_record
            .push(NameRecord::windows_en(NameId::FULL_NAME, "c"));
        let Err(Error::ValidationFailed(report)) = name.compile() else {
            panic!("expected a validation error");
        };
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn mac_roman_must_be_ascii() {
        let name = Name {
            name_record: vec![NameRecord {
                platform_id: 1,
                encoding_id: 0,
                language_id: 0,
                name_id: NameId::FAMILY_NAME,
                string: "Ordinær".into(),
            }],
        };
        assert!(matches!(name.compile(), Err(Error::ValidationFailed(_))));
    }

    #[test]
    fn skips_unknown_encodings() {
        init();
        let buf = BeBuffer::new()
            .extend([0u16, 2, 30])
            // symbol-ish encoding we can't decode
            .extend([2u16, 0, 0, 1, 2, 0])
            .extend([3u16, 1, 0x409, 1, 2, 0])
            .extend([0x0041u16]);
        let name = Name::read(FontData::new(&buf)).unwrap();
        assert_eq!(name.name_record.len(), 1);
        assert_eq!(name.get(NameId::FAMILY_NAME), Some("A"));
    }
}
