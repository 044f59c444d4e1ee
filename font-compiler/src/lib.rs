//! Compiling glyph outlines into OpenType fonts
//!
//! This crate turns a list of [`Character`]s and a set of [`FontSettings`]
//! into a complete font file with CFF outlines, and reads such files back.
//!
//! The tables written are `head`, `hhea`, `hmtx`, `maxp`, `OS/2`, `post`,
//! `name`, `cmap` and `CFF `. Each has a module in [`tables`], with a type
//! that can be built from the glyphs (`create_table`), encoded, and parsed.
//!
//! # Example
//!
//! ```
//! use font_compiler::{create_font, parse_font, Character, FontSettings};
//! use kurbo::BezPath;
//!
//! let mut path = BezPath::new();
//! path.move_to((100.0, 0.0));
//! path.line_to((400.0, 0.0));
//! path.line_to((250.0, 700.0));
//! path.close_path();
//! let glyphs = [Character::from_path("A", Some('A' as u32), 500.0, &path)];
//!
//! let settings = FontSettings {
//!     family_name: "Test".into(),
//!     style_name: "Regular".into(),
//!     ..Default::default()
//! };
//! let font = create_font(&glyphs, &settings).unwrap();
//! let bytes = font.to_bytes().unwrap();
//!
//! let loaded = parse_font(&bytes).unwrap();
//! assert!(loaded.has_char("A"));
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod error;
mod font;
mod font_builder;
mod font_data;
pub mod glyph;
pub mod glyph_map;
pub mod metrics;
pub mod read;
pub mod round;
pub mod settings;
pub mod tables;
pub mod util;
pub mod validate;
mod write;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use font::{create_font, parse_font, Font, Table};
pub use font_builder::{FontBuilder, TableDirectory, TableRecord};
pub use font_data::{Cursor, FontData};
pub use glyph::{Character, Contour};
pub use glyph_map::{GlyphIndexMap, GlyphSet};
pub use settings::FontSettings;
pub use write::{dump_table, FontWrite, TableWriter};

/// Public re-export of the font-types crate.
pub extern crate font_types as types;
