//! test data shared between the font-compiler crates.

pub mod bebuffer;
pub mod tables;
