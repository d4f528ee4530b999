//! # ChPF Schema
//!
//! Runtime description of the data a ChPF file carries.
//!
//! A [`Dataset`] is an ordered list of [`Column`]s, each tagged with a
//! [`WireType`] and an element size, plus optional key names. The wire type
//! registry ([`wire_type_of`]) maps native Rust element types to the codes stored
//! in the header.
//!
//! ## Wire Type Codes
//!
//! | Code | Type | Element size |
//! |------|------|--------------|
//! | 0 | int8 | 1 |
//! | 1 | int16 | 2 |
//! | 2 | int32 | 4 |
//! | 3 | int64 | 8 |
//! | 4 | uint8 | 1 |
//! | 5 | uint16 | 2 |
//! | 6 | uint32 | 4 |
//! | 7 | uint64 | 8 |
//! | 8 | half | 2 |
//! | 9 | float | 4 |
//! | 10 | double | 8 |
//! | 11 | unknown | caller supplied |

mod column;
mod constants;
mod dataset;
mod types;


pub use column::Column;
pub use constants::*;
pub use dataset::{Dataset, DatasetBuilder};
pub use types::{wire_type_of, NativeElement, WireType};
