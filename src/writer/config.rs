use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::header::FormatVersion;

use super::error::WriterError;

/// Compression backends for the ChPF data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    /// Rows are written as packed records, unchanged
    None,
    /// zlib-wrapped deflate stream
    Zlib,
    /// Single zstd frame
    Zstd,
    /// Best backend compiled in: Zstd, then Zlib, then None
    #[default]
    #[serde(rename = "default")]
    UseDefault,
}

impl CompressionType {
    /// Code stored in the v2+ header. `UseDefault` has no code of its own and
    /// is written as whatever it resolves to.
    pub fn code(self) -> u16 {
        match self.resolve() {
            CompressionType::Zlib => 1,
            CompressionType::Zstd => 2,
            _ => 0,
        }
    }

    /// True when the backend is compiled into this build
    pub fn is_available(self) -> bool {
        match self {
            CompressionType::None | CompressionType::UseDefault => true,
            CompressionType::Zlib => cfg!(feature = "zlib"),
            CompressionType::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// Resolve to a concrete backend that is compiled in.
    ///
    /// `UseDefault` prefers Zstd, then Zlib, then None. An explicit request for a
    /// backend that is not compiled in falls back to None with a warning.
    pub fn resolve(self) -> CompressionType {
        match self {
            CompressionType::UseDefault => {
                if cfg!(feature = "zstd") {
                    CompressionType::Zstd
                } else if cfg!(feature = "zlib") {
                    CompressionType::Zlib
                } else {
                    CompressionType::None
                }
            }
            requested if requested.is_available() => requested,
            requested => {
                warn!(
                    "{:?} compression is not compiled into this build, writing uncompressed",
                    requested
                );
                CompressionType::None
            }
        }
    }

    /// Compression with the highest ratio
    pub fn max_compression() -> Self {
        Self::UseDefault
    }

    /// Fastest option (no codec at all)
    pub fn fast() -> Self {
        Self::None
    }
}

/// Configuration for the ChPF writer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Compression requested for the data region
    pub compression: CompressionType,

    /// Header version to emit. v1 has no compression field and v1/v2 have no
    /// key block, so those features are dropped for older versions.
    pub header_version: FormatVersion,

    /// zlib level (0-9)
    pub zlib_level: u32,

    /// zstd level (1-22)
    pub zstd_level: i32,

    /// Growth step of the codec output buffer in bytes
    pub drain_block_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::UseDefault,
            header_version: FormatVersion::V3,
            // zlib's own default level
            zlib_level: 6,
            zstd_level: 3,
            drain_block_size: 16 * 1024,
        }
    }
}

/// Root of a `chpf.toml` file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    writer: WriterConfig,
}

impl WriterConfig {
    /// Configuration with a specific compression request
    pub fn with_compression(compression: CompressionType) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }

    /// Smallest output, slowest write
    pub fn max_compression() -> Self {
        Self {
            compression: CompressionType::max_compression(),
            zlib_level: 9,
            zstd_level: 19,
            drain_block_size: 64 * 1024,
            ..Self::default()
        }
    }

    /// Uncompressed output
    pub fn fast() -> Self {
        Self {
            compression: CompressionType::fast(),
            ..Self::default()
        }
    }

    /// Balanced configuration (default)
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// ```toml
    /// [writer]
    /// compression = "zstd"
    /// header_version = 3
    /// zstd_level = 9
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, WriterError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.writer.sanitized())
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WriterError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Clamp out-of-range settings to usable values
    pub(crate) fn sanitized(mut self) -> Self {
        if self.zlib_level > 9 {
            warn!("zlib level {} out of range, using 9", self.zlib_level);
            self.zlib_level = 9;
        }
        if self.drain_block_size < MIN_DRAIN_BLOCK {
            warn!(
                "drain block size {} too small, using {}",
                self.drain_block_size, MIN_DRAIN_BLOCK
            );
            self.drain_block_size = MIN_DRAIN_BLOCK;
        }
        self
    }
}

const MIN_DRAIN_BLOCK: usize = 64;
