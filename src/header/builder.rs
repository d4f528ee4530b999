use byteorder::{ByteOrder, NativeEndian};
use serde::Deserialize;

use crate::schema::{Column, Dataset, WireType, CHPF_MAGIC, FLAG_KEYS_FOLLOW, HEADER_BLOCK_SIZE};
use crate::writer::{CompressionType, WriterError};

/// ChPF header version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(try_from = "u16")]
#[repr(u16)]
pub enum FormatVersion {
    /// Column types only
    V1 = 1,
    /// Adds the compression code
    V2 = 2,
    /// Adds flags and the optional key block
    #[default]
    V3 = 3,
}

impl FormatVersion {
    /// Version number written to the header
    pub const fn number(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for FormatVersion {
    type Error = WriterError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FormatVersion::V1),
            2 => Ok(FormatVersion::V2),
            3 => Ok(FormatVersion::V3),
            other => Err(WriterError::InvalidData(format!(
                "unsupported header version {}",
                other
            ))),
        }
    }
}

/// Padding needed after `size` bytes to reach the next block boundary.
///
/// Always in `1..=HEADER_BLOCK_SIZE`: an already aligned size gets a full block.
#[inline]
pub fn padding_for(size: usize) -> usize {
    HEADER_BLOCK_SIZE - size % HEADER_BLOCK_SIZE
}

/// A built ChPF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: FormatVersion,
    flags: u16,
    header_size: u32,
    types: Vec<WireType>,
    compression: CompressionType,
    key_block_size: usize,
    padding: usize,
}

impl Header {
    /// Header version
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Flag bits (always zero before v3)
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// True when the key block follows the fixed struct
    pub fn keys_follow(&self) -> bool {
        self.flags & FLAG_KEYS_FOLLOW != 0
    }

    /// Offset of the data region
    pub fn header_size(&self) -> u32 {
        self.header_size
    }

    /// Number of columns
    pub fn num_keys(&self) -> u32 {
        // size accounting rejects headers whose column count exceeds u32
        self.types.len() as u32
    }

    /// Wire types in column order
    pub fn types(&self) -> &[WireType] {
        &self.types
    }

    /// Compression recorded in the header (always `None` for v1)
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Bytes of the key block accounted in `header_size`
    pub fn key_block_size(&self) -> usize {
        self.key_block_size
    }

    /// Bytes of padding between the key block (or fixed struct) and the data region
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Size of the fixed struct for this version, without key block or padding
    pub fn fixed_size(&self) -> usize {
        Self::fixed_size_for(self.version, self.types.len())
    }

    /// Size of the fixed struct of `version` with `num_keys` columns
    pub fn fixed_size_for(version: FormatVersion, num_keys: usize) -> usize {
        // magic + version + header_size + num_keys + types
        let mut size = 4 + 2 + 4 + 4 + 2 * num_keys;
        if version >= FormatVersion::V2 {
            size += 2;
        }
        if version >= FormatVersion::V3 {
            size += 2;
        }
        size
    }

    /// Record size implied by `types[]`, or `None` if any type is `Unknown`
    pub fn implied_record_size(&self) -> Option<usize> {
        self.types.iter().map(|t| t.element_size()).sum()
    }

    /// Serialize exactly the fixed struct (no key block, no padding)
    pub fn fixed_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.fixed_size()];
        buf[..4].copy_from_slice(&CHPF_MAGIC);
        NativeEndian::write_u16(&mut buf[4..6], self.version.number());
        let mut pos = 6;

        if self.version >= FormatVersion::V3 {
            NativeEndian::write_u16(&mut buf[pos..pos + 2], self.flags);
            pos += 2;
        }
        NativeEndian::write_u32(&mut buf[pos..pos + 4], self.header_size);
        pos += 4;
        NativeEndian::write_u32(&mut buf[pos..pos + 4], self.num_keys());
        pos += 4;
        for wire in &self.types {
            NativeEndian::write_u16(&mut buf[pos..pos + 2], wire.code());
            pos += 2;
        }
        if self.version >= FormatVersion::V2 {
            NativeEndian::write_u16(&mut buf[pos..pos + 2], self.compression.code());
            pos += 2;
        }

        debug_assert_eq!(pos, buf.len());
        buf
    }
}

/// Assembles headers version by version.
pub struct HeaderBuilder;

impl HeaderBuilder {
    /// Version 1: column types, `header_size` = fixed struct size
    pub fn build_v1(columns: &[Column<'_>]) -> Header {
        let types: Vec<WireType> = columns.iter().map(Column::wire_type).collect();
        let header_size = Header::fixed_size_for(FormatVersion::V1, types.len()) as u32;
        Header {
            version: FormatVersion::V1,
            flags: 0,
            header_size,
            types,
            compression: CompressionType::None,
            key_block_size: 0,
            padding: 0,
        }
    }

    /// Version 2: adds the compression code
    pub fn build_v2(v1: Header, compression: CompressionType) -> Header {
        let mut header = Header {
            version: FormatVersion::V2,
            compression,
            ..v1
        };
        header.header_size = header.fixed_size() as u32;
        header
    }

    /// Version 3: adds flags
    pub fn build_v3(v2: Header, flags: u16) -> Header {
        let mut header = Header {
            version: FormatVersion::V3,
            flags,
            ..v2
        };
        header.header_size = header.fixed_size() as u32;
        header
    }

    /// Final size accounting: fixed struct plus key block, padded to the next
    /// block boundary with between 1 and 512 bytes.
    pub fn apply_size_accounting(
        mut header: Header,
        key_block_size: usize,
    ) -> Result<Header, WriterError> {
        if u32::try_from(header.types.len()).is_err() {
            return Err(WriterError::HeaderTooLarge(header.types.len() as u64));
        }

        let unpadded = header.fixed_size() as u64 + key_block_size as u64;
        let padding = padding_for((unpadded % HEADER_BLOCK_SIZE as u64) as usize);
        let total = unpadded + padding as u64;

        header.header_size =
            u32::try_from(total).map_err(|_| WriterError::HeaderTooLarge(total))?;
        header.key_block_size = key_block_size;
        header.padding = padding;
        Ok(header)
    }

    /// Build the header for `dataset` up to `version`.
    ///
    /// `compression` must already be resolved. Features the version cannot
    /// express are dropped: v1 records no compression, v1/v2 carry no keys.
    pub fn for_dataset(
        dataset: &Dataset<'_>,
        version: FormatVersion,
        compression: CompressionType,
    ) -> Result<Header, WriterError> {
        let mut header = Self::build_v1(dataset.columns());
        let mut key_block_size = 0;

        if version >= FormatVersion::V2 {
            header = Self::build_v2(header, compression);
        }
        if version >= FormatVersion::V3 {
            let flags = if dataset.has_keys() {
                key_block_size = dataset.key_block_size();
                FLAG_KEYS_FOLLOW
            } else {
                0
            };
            header = Self::build_v3(header, flags);
        }

        Self::apply_size_accounting(header, key_block_size)
    }
}
