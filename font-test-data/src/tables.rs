//! Reference tables for a two glyph font, "Test Medium".
//!
//! The font holds `.notdef` (mapped from U+0000, no outline) and `a`, both
//! with an advance of 500, at 1000 units per em.

#[rustfmt::skip]
pub static HEAD: &[u8] = &[
    0x00, 0x01, 0x00, 0x00, // version 1.0
    0x00, 0x01, 0x00, 0x00, // fontRevision 1.0
    0x00, 0x00, 0x00, 0x00, // checksumAdjustment
    0x5F, 0x0F, 0x3C, 0xF5, // magicNumber
    0x00, 0x03,             // flags
    0x03, 0xE8,             // unitsPerEm 1000
    0x00, 0x00, 0x00, 0x00, 0x65, 0x1C, 0xF6, 0x55, // created
    0x00, 0x00, 0x00, 0x00, 0x65, 0x1C, 0xF6, 0x55, // modified
    0x00, 0x00,             // xMin
    0x00, 0x00,             // yMin
    0x03, 0xE8,             // xMax 1000
    0x03, 0xE8,             // yMax 1000
    0x00, 0x00,             // macStyle
    0x00, 0x03,             // lowestRecPPEM
    0x00, 0x02,             // fontDirectionHint
    0x00, 0x00,             // indexToLocFormat
    0x00, 0x00,             // glyphDataFormat
];

#[rustfmt::skip]
pub static HHEA: &[u8] = &[
    0x00, 0x01, 0x00, 0x00, // version 1.0
    0x03, 0x20,             // ascender 800
    0xFF, 0x38,             // descender -200
    0x00, 0x00,             // lineGap
    0x03, 0xE8,             // advanceWidthMax 1000
    0x00, 0x00,             // minLeftSideBearing
    0x00, 0x00,             // minRightSideBearing
    0x03, 0xE8,             // xMaxExtent 1000
    0x00, 0x01,             // caretSlopeRise
    0x00, 0x00,             // caretSlopeRun
    0x00, 0x00,             // caretOffset
    0x00, 0x00, 0x00, 0x00, // reserved
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,             // metricDataFormat
    0x00, 0x02,             // numberOfHMetrics
];

#[rustfmt::skip]
pub static HMTX: &[u8] = &[
    0x01, 0xF4, 0x00, 0x00, // 500, lsb 0
    0x01, 0xF4, 0x00, 0x00,
];

#[rustfmt::skip]
pub static MAXP: &[u8] = &[
    0x00, 0x00, 0x50, 0x00, // version 0.5
    0x00, 0x02,             // numGlyphs
];

#[rustfmt::skip]
pub static POST: &[u8] = &[
    0x00, 0x03, 0x00, 0x00, // version 3.0
    0x00, 0x00, 0x00, 0x00, // italicAngle
    0x00, 0x00,             // underlinePosition
    0x00, 0x00,             // underlineThickness
    0x00, 0x00, 0x00, 0x00, // isFixedPitch
    0x00, 0x00, 0x00, 0x00, // minMemType42
    0x00, 0x00, 0x00, 0x00, // maxMemType42
    0x00, 0x00, 0x00, 0x00, // minMemType1
    0x00, 0x00, 0x00, 0x00, // maxMemType1
];

#[rustfmt::skip]
pub static OS2: &[u8] = &[
    0x00, 0x03,             // version
    0x03, 0xE8,             // xAvgCharWidth 1000
    0x00, 0x00,             // usWeightClass
    0x00, 0x00,             // usWidthClass
    0x00, 0x00,             // fsType
    0x02, 0x8A,             // ySubscriptXSize 650
    0x02, 0xBB,             // ySubscriptYSize 699
    0x00, 0x00,             // ySubscriptXOffset
    0x00, 0x8C,             // ySubscriptYOffset 140
    0x02, 0x8A,             // ySuperscriptXSize 650
    0x02, 0xBB,             // ySuperscriptYSize 699
    0x00, 0x00,             // ySuperscriptXOffset
    0x01, 0xDF,             // ySuperscriptYOffset 479
    0x00, 0x31,             // yStrikeoutSize 49
    0x01, 0x02,             // yStrikeoutPosition 258
    0x00, 0x00,             // sFamilyClass
    0x00, 0x00, 0x00, 0x00, 0x00, // panose
    0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, // ulUnicodeRange1
    0x00, 0x00, 0x00, 0x00, // ulUnicodeRange2
    0x00, 0x00, 0x00, 0x00, // ulUnicodeRange3
    0x00, 0x00, 0x00, 0x00, // ulUnicodeRange4
    0x58, 0x58, 0x58, 0x58, // achVendID 'XXXX'
    0x00, 0x00,             // fsSelection
    0x00, 0x00,             // usFirstCharIndex
    0x00, 0x00,             // usLastCharIndex
    0x03, 0x20,             // sTypoAscender 800
    0xFF, 0x38,             // sTypoDescender -200
    0x00, 0x00,             // sTypoLineGap
    0x03, 0xE8,             // usWinAscent 1000
    0x00, 0x00,             // usWinDescent
    0x00, 0x00, 0x00, 0x01, // ulCodePageRange1
    0x00, 0x00, 0x00, 0x00, // ulCodePageRange2
    0x00, 0x00,             // sxHeight
    0x00, 0x00,             // sCapHeight
    0x00, 0x00,             // usDefaultChar
    0x00, 0x00,             // usBreakChar
    0x00, 0x00,             // usMaxContext
];

#[rustfmt::skip]
pub static CMAP: &[u8] = &[
    0x00, 0x00,             // version
    0x00, 0x01,             // numTables
    0x00, 0x03, 0x00, 0x01, // platform 3, encoding 1
    0x00, 0x00, 0x00, 0x0C, // subtableOffset
    0x00, 0x04,             // format 4
    0x00, 0x28,             // length 40
    0x00, 0x00,             // language
    0x00, 0x06,             // segCountX2
    0x00, 0x04,             // searchRange
    0x00, 0x01,             // entrySelector
    0x00, 0x02,             // rangeShift
    0x00, 0x00, 0x00, 0x61, 0xFF, 0xFF, // endCode
    0x00, 0x00,             // reservedPad
    0x00, 0x00, 0x00, 0x61, 0xFF, 0xFF, // startCode
    0x00, 0x00, 0xFF, 0xA0, 0x00, 0x01, // idDelta 0, -96, 1
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // idRangeOffset
];

#[rustfmt::skip]
pub static CFF: &[u8] = &[
    // header: version 1.0, hdrSize 4, offSize 1
    0x01, 0x00, 0x04, 0x01,
    // Name INDEX: "TestMedium"
    0x00, 0x01, 0x01, 0x01, 0x0B,
    0x54, 0x65, 0x73, 0x74, 0x4D, 0x65, 0x64, 0x69, 0x75, 0x6D,
    // Top DICT INDEX
    0x00, 0x01, 0x01, 0x01, 0x27,
    0xF8, 0x1C, 0x00,       // version SID 392
    0xF8, 0x1D, 0x02,       // FullName SID 393
    0xF8, 0x1E, 0x03,       // FamilyName SID 394
    0xF8, 0x1F, 0x04,       // Weight SID 395
    0x8B, 0x8B, 0xF9, 0xB4, 0xF8, 0x88, 0x05, // FontBBox 0 0 800 500
    0x1D, 0x00, 0x00, 0x00, 0x6A, 0x0F, // charset 106
    0x1D, 0x00, 0x00, 0x00, 0x6D, 0x11, // CharStrings 109
    0x8F, 0x1D, 0x00, 0x00, 0x00, 0x97, 0x12, // Private 4 151
    // String INDEX: "a" "Version 0.1" "Test Medium" "Test" "Medium"
    0x00, 0x05, 0x01, 0x01, 0x02, 0x0D, 0x18, 0x1C, 0x22,
    0x61,
    0x56, 0x65, 0x72, 0x73, 0x69, 0x6F, 0x6E, 0x20, 0x30, 0x2E, 0x31,
    0x54, 0x65, 0x73, 0x74, 0x20, 0x4D, 0x65, 0x64, 0x69, 0x75, 0x6D,
    0x54, 0x65, 0x73, 0x74,
    0x4D, 0x65, 0x64, 0x69, 0x75, 0x6D,
    // Global Subr INDEX
    0x00, 0x00,
    // charset format 0: 'a' is SID 391
    0x00, 0x01, 0x87,
    // CharStrings INDEX
    0x00, 0x02, 0x01, 0x01, 0x04, 0x25,
    0xF8, 0x88, 0x0E,       // 500 endchar
    0xF8, 0x88,             // 500
    0xF8, 0x16, 0xF8, 0x94, 0x15, // 386 512 rmoveto
    0xAB, 0xAD, 0xDC, 0xC1, 0xB5, 0x7B, 0x08, // 32 34 81 54 42 -16 rrcurveto
    0xCB, 0x73, 0xF7, 0x05, 0x30, 0x3E, 0xFB, 0x05, 0x08, // 64 -24 113 -91 -77 -113 rrcurveto
    0x8B, 0x8B, 0xFB, 0x92, 0xF7, 0x30, 0x8B, 0x8B, 0x08, // 0 0 -254 156 0 0 rrcurveto
    0x0E,                   // endchar
    // Private DICT
    0x8B, 0x14,             // defaultWidthX 0
    0x8B, 0x15,             // nominalWidthX 0
];
