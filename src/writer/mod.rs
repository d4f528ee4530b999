//! # ChPF Writer Module
//!
//! This module writes [`Dataset`](crate::schema::Dataset)s to the ChPF
//! container format.
//!
//! ## Design Principles
//!
//! 1. **Streaming Architecture**: Rows are packed one at a time into a single
//!    reusable record buffer and pushed through one compression session, so
//!    memory use does not grow with the dataset.
//!
//! 2. **Fixed Records**: Each row is the concatenation of one element from
//!    every column in column order. Record boundaries are not marked inside the
//!    compressed region; readers decompress it whole and re-slice by the record
//!    size implied by the header's type table.
//!
//! 3. **Aligned Header**: The header region (fixed struct, optional key block,
//!    padding) always ends on a 512-byte boundary with 1 to 512 bytes of padding.
//!
//! 4. **Silent Failure**: A write never returns an error for I/O or codec
//!    failures. It stops at the first failure, leaves already-written bytes
//!    intact, and reports the stage in [`WriterStats`]. Callers must check the
//!    stats or the [`OutputStream`] to detect a truncated file.

mod config;
mod error;
mod packer;
mod stats;
mod stream;
mod writer_impl;

#[cfg(test)]
mod tests;

pub use config::{CompressionType, WriterConfig};
pub use error::WriterError;
pub use packer::RowPacker;
pub use stats::{AbortReason, WriteOutcome, WriteStage, WriterStats};
pub use stream::{OutputStream, StreamState};
pub use writer_impl::{write, ParticleWriter};
