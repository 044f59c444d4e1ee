//! Whole-font tests, and the glyphs they share with the table tests.

use font_types::{GlyphId, Tag};
use kurbo::{CubicBez, Line, PathSeg};
use pretty_assertions::assert_eq;

use crate::{
    create_font,
    error::Error,
    font_builder::TableDirectory,
    font_data::FontData,
    glyph::Character,
    parse_font,
    read::{FontRead, ReadError},
    settings::FontSettings,
    tables::compute_checksum,
    Table,
};

/// `.notdef` and a single curved `a`.
pub(crate) fn fixture_characters() -> Vec<Character> {
    vec![
        Character::new(".notdef", Some(0), 500.0),
        Character::new("a", Some(0x61), 500.0).with_contour(vec![
            PathSeg::Cubic(CubicBez::new(
                (386.0, 512.0),
                (417.5, 545.6),
                (498.4, 599.6),
                (540.0, 584.0),
            )),
            PathSeg::Cubic(CubicBez::new(
                (540.0, 584.0),
                (604.0, 560.0),
                (716.7, 469.1),
                (640.0, 356.0),
            )),
            PathSeg::Cubic(CubicBez::new(
                (640.0, 356.0),
                (640.0, 356.0),
                (386.0, 512.0),
                (386.0, 512.0),
            )),
        ]),
    ]
}

pub(crate) fn fixture_settings() -> FontSettings {
    FontSettings {
        family_name: "Test".into(),
        style_name: "Medium".into(),
        units_per_em: 1000,
        ascender: 800,
        descender: -200,
        font_bbox: Some([0, 0, 800, 500]),
        ..Default::default()
    }
}

fn fixture_font_bytes() -> Vec<u8> {
    create_font(&fixture_characters(), &fixture_settings())
        .unwrap()
        .to_bytes()
        .unwrap()
}

fn table_bytes<'a>(font: &'a [u8], tag: &[u8; 4]) -> &'a [u8] {
    let directory = TableDirectory::read(FontData::new(font)).unwrap();
    let record = directory.find(Tag::new(tag)).unwrap();
    let start = record.offset as usize;
    &font[start..start + record.length as usize]
}

#[test]
fn compile_fixture() {
    let _ = env_logger::builder().is_test(true).try_init();
    let bytes = fixture_font_bytes();
    let directory = TableDirectory::read(FontData::new(&bytes)).unwrap();
    let tags: Vec<_> = directory
        .table_records
        .iter()
        .map(|record| record.tag.to_string())
        .collect();
    assert_eq!(
        tags,
        ["CFF ", "OS/2", "cmap", "head", "hhea", "hmtx", "maxp", "name", "post"]
    );
    for record in &directory.table_records {
        assert_eq!(record.offset % 4, 0, "{} is not aligned", record.tag);
        let start = record.offset as usize;
        let data = &bytes[start..start + record.length as usize];
        if record.tag != Tag::new(b"head") {
            assert_eq!(record.checksum, compute_checksum(data), "{}", record.tag);
        }
    }
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(compute_checksum(&bytes), 0xB1B0AFBA);

    assert_eq!(table_bytes(&bytes, b"maxp"), font_test_data::tables::MAXP);
    assert_eq!(table_bytes(&bytes, b"post"), font_test_data::tables::POST);
    assert_eq!(table_bytes(&bytes, b"cmap"), font_test_data::tables::CMAP);
    assert_eq!(table_bytes(&bytes, b"CFF "), font_test_data::tables::CFF);
}

#[test]
fn head_checksum_adjustment() {
    let font = create_font(&fixture_characters(), &fixture_settings()).unwrap();
    let bytes = font.to_bytes().unwrap();
    let head = table_bytes(&bytes, b"head");
    let stored = u32::from_be_bytes([head[8], head[9], head[10], head[11]]);
    assert_ne!(stored, 0);
    assert_eq!(font.head().unwrap().checksum_adjustment, stored);

    // the head checksum is computed with the adjustment zeroed
    let mut zeroed = head.to_vec();
    zeroed[8..12].fill(0);
    let directory = TableDirectory::read(FontData::new(&bytes)).unwrap();
    let record = directory.find(Tag::new(b"head")).unwrap();
    assert_eq!(record.checksum, compute_checksum(&zeroed));
}

#[test]
fn to_bytes_is_idempotent() {
    let bytes = fixture_font_bytes();
    let font = parse_font(&bytes).unwrap();
    assert_eq!(font.tables.len(), 9);
    assert_eq!(font.to_bytes().unwrap(), bytes);
    assert_eq!(font.to_bytes().unwrap(), bytes);
}

#[test]
fn lookups() {
    let font = parse_font(&fixture_font_bytes()).unwrap();
    assert!(font.has_char("a"));
    assert!(font.has_char(".notdef"));
    assert!(!font.has_char("b"));
    assert!(!font.has_char("ab"));
    assert_eq!(font.glyph_id_for_codepoint(0x61), Some(GlyphId::new(1)));
    assert_eq!(font.glyph_id_for_codepoint(0x62), None);
    assert_eq!(font.glyph_id_for_name("a"), Some(GlyphId::new(1)));
    assert_eq!(font.glyph_id_for_name(".notdef"), Some(GlyphId::NOTDEF));
    assert_eq!(font.glyph_id_for_name("b"), None);
    assert_eq!(font.maxp().unwrap().num_glyphs, 2);
}

#[test]
fn non_ascii_names() {
    let mut characters = fixture_characters();
    characters.push(Character::new("世", None, 1000.0));
    characters.push(Character::new("世界", None, 1000.0));
    let font = create_font(&characters, &fixture_settings()).unwrap();
    let font = parse_font(&font.to_bytes().unwrap()).unwrap();
    assert_eq!(
        font.cff().unwrap().glyph_names,
        [".notdef", "a", "4e16", "4e16.1"]
    );
    assert!(font.has_char("世"));
    assert!(font.has_char("世界"));
    assert!(!font.has_char("界"));
    assert_eq!(font.glyph_id_for_name("世"), Some(GlyphId::new(2)));
    assert_eq!(font.glyph_id_for_name("4e16.1"), Some(GlyphId::new(3)));
}

#[test]
fn recover_characters() {
    let font = parse_font(&fixture_font_bytes()).unwrap();
    let characters = font.characters().unwrap();
    let summary: Vec<_> = characters
        .iter()
        .map(|c| (c.name.as_str(), c.unicode, c.advance_width, c.contours.len()))
        .collect();
    assert_eq!(
        summary,
        [(".notdef", Some(0), 500.0, 0), ("a", Some(0x61), 500.0, 1)]
    );
    // outlines come back on the integer grid
    assert_eq!(
        characters[1].contours[0][0],
        PathSeg::Cubic(CubicBez::new(
            (386.0, 512.0),
            (418.0, 546.0),
            (499.0, 600.0),
            (541.0, 584.0),
        ))
    );

    // rounding drift leaves a one unit gap, closed with a line
    assert_eq!(characters[1].contours[0].len(), 4);
    assert_eq!(
        characters[1].contours[0][3],
        PathSeg::Line(Line::new((387.0, 512.0), (386.0, 512.0)))
    );

    // recompiling keeps the curves where they were
    let recompiled = create_font(&characters, &fixture_settings()).unwrap();
    let original = font.cff().unwrap().outline(GlyphId::new(1)).unwrap();
    let outline = recompiled.cff().unwrap().outline(GlyphId::new(1)).unwrap();
    assert_eq!(outline.elements()[..4], original.elements()[..4]);
}

#[test]
fn synthesized_notdef() {
    let characters = &fixture_characters()[1..];
    let font = create_font(characters, &FontSettings::default()).unwrap();
    let characters = parse_font(&font.to_bytes().unwrap())
        .unwrap()
        .characters()
        .unwrap();
    assert_eq!(characters[0].name, ".notdef");
    assert_eq!(characters[0].advance_width, 500.0);
    assert_eq!(characters[0].unicode, None);
    assert_eq!(characters[1].name, "a");
}

#[test]
fn bad_sfnt_version() {
    let mut bytes = fixture_font_bytes();
    bytes[..4].copy_from_slice(b"wOFF");
    assert!(matches!(
        parse_font(&bytes),
        Err(Error::Format(ReadError::InvalidSfnt(0x774F4646)))
    ));
}

#[test]
fn bad_head_magic() {
    let mut bytes = fixture_font_bytes();
    let directory = TableDirectory::read(FontData::new(&bytes)).unwrap();
    let start = directory.find(Tag::new(b"head")).unwrap().offset as usize;
    bytes[start + 12] = 0;
    assert!(matches!(
        parse_font(&bytes),
        Err(Error::Format(ReadError::BadMagicNumber(0x000F3CF5)))
    ));
}

#[test]
fn truncated_font() {
    let bytes = fixture_font_bytes();
    assert!(matches!(
        parse_font(&bytes[..bytes.len() - 8]),
        Err(Error::Format(ReadError::OutOfBounds))
    ));
}

#[test]
fn hmtx_needs_hhea() {
    let font = create_font(&fixture_characters(), &fixture_settings()).unwrap();
    let without_hhea = crate::Font {
        tables: font
            .tables
            .into_iter()
            .filter(|table| !matches!(table, Table::Hhea(_)))
            .collect(),
    };
    let bytes = without_hhea.to_bytes().unwrap();
    assert!(matches!(
        parse_font(&bytes),
        Err(Error::Format(ReadError::TableIsMissing(tag))) if tag == Tag::new(b"hhea")
    ));
}

#[test]
fn duplicate_tables() {
    let mut font = create_font(&fixture_characters(), &fixture_settings()).unwrap();
    let post = font.post().cloned().unwrap();
    font.tables.push(Table::Post(post));
    assert!(matches!(
        font.to_bytes(),
        Err(Error::Format(ReadError::DuplicateTable(_)))
    ));
}

#[test]
fn unsupported_codepoint() {
    let mut characters = fixture_characters();
    characters.push(Character::new("emoji", Some(0x1F600), 1000.0));
    assert!(matches!(
        create_font(&characters, &fixture_settings()),
        Err(Error::UnsupportedCodepoint { codepoint: 0x1F600, .. })
    ));
}

#[test]
fn invalid_settings() {
    let settings = FontSettings {
        units_per_em: 8,
        ..fixture_settings()
    };
    assert!(matches!(
        create_font(&fixture_characters(), &settings),
        Err(Error::ValidationFailed(_))
    ));
}
