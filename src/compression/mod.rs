//! # Streaming Compression Sessions
//!
//! Every backend implements [`StreamCompressor`]: records go in through
//! [`compress`](StreamCompressor::compress) in order, and exactly one
//! [`finalize`](StreamCompressor::finalize) drains whatever the codec still holds.
//! Output slices borrow a buffer owned by the session and are valid until the
//! next call.
//!
//! [`Compressor`] is the closed set of backends. Zlib and Zstd are only present
//! when the `zlib` and `zstd` cargo features are enabled.

mod buffer;
mod none;
#[cfg(feature = "zlib")]
mod zlib;
#[cfg(feature = "zstd")]
mod zstd;


use std::fmt;

use log::debug;

use crate::writer::{CompressionType, WriterConfig};

pub use self::none::NoneCompressor;
#[cfg(feature = "zlib")]
pub use self::zlib::ZlibCompressor;
#[cfg(feature = "zstd")]
pub use self::zstd::ZstdCompressor;

/// Capability shared by all compression backends.
pub trait StreamCompressor {
    /// Feed `src` to the codec and return the bytes it produced
    fn compress(&mut self, src: &[u8]) -> &[u8];

    /// Flush trailing codec state, mark the session done and return the last bytes
    fn finalize(&mut self) -> &[u8];

    /// Bytes produced by the most recent `compress` or `finalize` call
    fn output(&self) -> &[u8];

    /// False once the codec has reported an unrecoverable error
    fn good(&self) -> bool;

    /// True once `finalize` has completed the stream
    fn eof(&self) -> bool;

    /// Uncompressed bytes consumed so far
    fn total_in(&self) -> u64;

    /// Compressed bytes produced so far
    fn total_out(&self) -> u64;
}

/// One compression session, owned by a single write call.
pub enum Compressor {
    /// Pass-through
    None(NoneCompressor),
    /// zlib stream
    #[cfg(feature = "zlib")]
    Zlib(ZlibCompressor),
    /// zstd frame
    #[cfg(feature = "zstd")]
    Zstd(ZstdCompressor),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Compressor::None($inner) => $body,
            #[cfg(feature = "zlib")]
            Compressor::Zlib($inner) => $body,
            #[cfg(feature = "zstd")]
            Compressor::Zstd($inner) => $body,
        }
    };
}

impl Compressor {
    /// Create a session for `requested`, resolved against the compiled-in
    /// backends (see [`CompressionType::resolve`]).
    #[cfg_attr(not(any(feature = "zlib", feature = "zstd")), allow(unused_variables))]
    pub fn for_type(requested: CompressionType, config: &WriterConfig) -> Self {
        let resolved = requested.resolve();
        debug!("Starting {:?} compression session", resolved);

        match resolved {
            #[cfg(feature = "zstd")]
            CompressionType::Zstd => Compressor::Zstd(ZstdCompressor::new(
                config.zstd_level,
                config.drain_block_size,
            )),
            #[cfg(feature = "zlib")]
            CompressionType::Zlib => Compressor::Zlib(ZlibCompressor::new(
                config.zlib_level,
                config.drain_block_size,
            )),
            _ => Compressor::None(NoneCompressor::new()),
        }
    }

    /// Backend of this session
    pub fn kind(&self) -> CompressionType {
        match self {
            Compressor::None(_) => CompressionType::None,
            #[cfg(feature = "zlib")]
            Compressor::Zlib(_) => CompressionType::Zlib,
            #[cfg(feature = "zstd")]
            Compressor::Zstd(_) => CompressionType::Zstd,
        }
    }
}

impl StreamCompressor for Compressor {
    fn compress(&mut self, src: &[u8]) -> &[u8] {
        dispatch!(self, c => c.compress(src))
    }

    fn finalize(&mut self) -> &[u8] {
        dispatch!(self, c => c.finalize())
    }

    fn output(&self) -> &[u8] {
        dispatch!(self, c => c.output())
    }

    fn good(&self) -> bool {
        dispatch!(self, c => c.good())
    }

    fn eof(&self) -> bool {
        dispatch!(self, c => c.eof())
    }

    fn total_in(&self) -> u64 {
        dispatch!(self, c => c.total_in())
    }

    fn total_out(&self) -> u64 {
        dispatch!(self, c => c.total_out())
    }
}

impl fmt::Debug for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compressor")
            .field("kind", &self.kind())
            .field("good", &self.good())
            .field("eof", &self.eof())
            .finish()
    }
}
