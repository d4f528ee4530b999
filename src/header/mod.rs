//! # ChPF Header
//!
//! Builds the versioned header that precedes the data region.
//!
//! ## Layout
//!
//! All fields are packed and written in the producer's native byte order.
//!
//! ```text
//! magic[4]            "ChPF"
//! version: u16        1 | 2 | 3
//! flags: u16          v3 only; bit 1 = key names follow
//! header_size: u32    offset of the data region
//! num_keys: u32       column count
//! types: u16 * n      wire type codes
//! compression: u16    v2+ only; 0 = none, 1 = zlib, 2 = zstd
//! key block           v3 with keys only; NUL-terminated names
//! padding             1..=512 bytes, aligns header_size to 512
//! ```
//!
//! Versions are built by chaining: [`HeaderBuilder::build_v1`] describes the
//! columns, [`HeaderBuilder::build_v2`] adds compression, and
//! [`HeaderBuilder::build_v3`] adds flags. [`HeaderBuilder::apply_size_accounting`]
//! then fixes `header_size` and the padding length.

mod builder;


pub use builder::{padding_for, FormatVersion, Header, HeaderBuilder};
