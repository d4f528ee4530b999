//! # chpf - ChPF Particle Container Writer
//!
//! `chpf` writes large column-oriented ("particle") datasets to the ChPF binary
//! container: a versioned header describing the columns, an optional block of
//! column names, and a data region of fixed-size row records passed through a
//! streaming compressor.
//!
//! ## Key Features
//!
//! - **Runtime Schema**: Columns are described by a wire type and element size,
//!   built from typed slices or raw bytes.
//!
//! - **Versioned Headers**: v1, v2 (compression code) and v3 (flags and key
//!   names) headers, always padded to a 512-byte boundary.
//!
//! - **Streaming Compression**: None, zlib and zstd backends behind one session
//!   interface, selected at runtime and gated by cargo features.
//!
//! - **Failure Tolerance**: A failing sink or codec stops the write without
//!   touching bytes already written; the outcome is reported in [`writer::WriterStats`].
//!
//! ## Quick Start
//!
//! ```rust
//! use chpf::schema::Dataset;
//! use chpf::writer::{CompressionType, OutputStream, ParticleWriter, WriterConfig};
//!
//! let position_x = vec![0.0f32, 1.0, 2.0, 3.0];
//! let id = vec![10i32, 11, 12, 13];
//!
//! let dataset = Dataset::builder()
//!     .named("position_x", &position_x)
//!     .named("id", &id)
//!     .build()?;
//!
//! let writer = ParticleWriter::new(WriterConfig::with_compression(CompressionType::None));
//! let mut stream = OutputStream::new(Vec::new());
//! let stats = writer.write(&mut stream, &dataset);
//!
//! assert!(stats.is_complete());
//! assert_eq!(stream.bytes_written(), 512 + 4 * 8);
//! # Ok::<(), chpf::writer::WriterError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`schema`]: wire types, columns and datasets
//! - [`header`]: versioned header construction and size accounting
//! - [`compression`]: streaming compression sessions
//! - [`writer`]: row packing, output stream health and write orchestration
//!
//! ## File Layout
//!
//! | Region | Contents |
//! |--------|----------|
//! | Fixed header | magic "ChPF", version, flags (v3), header_size, num_keys, types, compression (v2+) |
//! | Key block | NUL-terminated column names (v3, optional) |
//! | Padding | 1 to 512 bytes; header_size is a multiple of 512 |
//! | Data | compressed concatenation of fixed-size records |
//!
//! All integers are in the producer's native byte order.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod compression;
pub mod header;
pub mod schema;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::compression::{Compressor, StreamCompressor};
    pub use crate::header::{FormatVersion, Header, HeaderBuilder};
    pub use crate::schema::{
        wire_type_of, Column, Dataset, DatasetBuilder, NativeElement, WireType, CHPF_MAGIC,
        HEADER_BLOCK_SIZE,
    };
    pub use crate::writer::{
        write, CompressionType, OutputStream, ParticleWriter, RowPacker, WriteOutcome,
        WriterConfig, WriterError, WriterStats,
    };
}
