//! ensure serde is working as expected

use super::*;

#[test]
fn head_fields_survive_json() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    struct HeadLike {
        version: MajorMinor,
        revision: Fixed,
        created: LongDateTime,
        units_per_em: u16,
        notdef: GlyphId,
        tag: Tag,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    struct Metrics {
        maxp: Version16Dot16,
        ascender: FWord,
        advance_max: UfWord,
        family: NameId,
    }

    let head = HeadLike {
        version: MajorMinor::VERSION_1_0,
        revision: Fixed::from_f64(1.5),
        created: LongDateTime::from_unix_millis(1_696_000_000_000),
        units_per_em: 1000,
        notdef: GlyphId::NOTDEF,
        tag: Tag::new(b"head"),
    };
    let dumped = serde_json::to_string(&head).unwrap();
    let loaded: HeadLike = serde_json::from_str(&dumped).unwrap();
    assert_eq!(head, loaded);

    let metrics = Metrics {
        maxp: Version16Dot16::VERSION_0_5,
        ascender: FWord::new(800),
        advance_max: UfWord::new(1000),
        family: NameId::FAMILY_NAME,
    };
    let dumped = serde_json::to_string(&metrics).unwrap();
    let loaded: Metrics = serde_json::from_str(&dumped).unwrap();
    assert_eq!(metrics, loaded);
}
