//! Common utilities for ktex.
//!
//! This crate provides the low-level pieces shared by the format crates:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian cursor over a byte slice
//! - [`Error`] - Errors raised while reading raw bytes

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;
