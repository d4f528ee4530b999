//! Minimal ChPF header parser used to check what the writer produced.

#![allow(dead_code)]

use chpf::schema::WireType;

/// Parsed header fields
#[derive(Debug)]
pub struct ParsedHeader {
    pub version: u16,
    pub flags: u16,
    pub header_size: u32,
    pub types: Vec<WireType>,
    pub compression: Option<u16>,
    pub keys: Vec<String>,
    pub fixed_size: usize,
}

impl ParsedHeader {
    pub fn record_size(&self) -> usize {
        self.types
            .iter()
            .map(|t| t.element_size().expect("known wire type"))
            .sum()
    }
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

pub fn parse_header(bytes: &[u8]) -> ParsedHeader {
    assert_eq!(&bytes[..4], b"ChPF", "bad magic");
    let version = u16_at(bytes, 4);
    let mut pos = 6;

    let flags = if version >= 3 {
        pos += 2;
        u16_at(bytes, 6)
    } else {
        0
    };
    let header_size = u32_at(bytes, pos);
    let num_keys = u32_at(bytes, pos + 4) as usize;
    pos += 8;

    let types = (0..num_keys)
        .map(|i| WireType::from_code(u16_at(bytes, pos + 2 * i)))
        .collect();
    pos += 2 * num_keys;

    let compression = if version >= 2 {
        pos += 2;
        Some(u16_at(bytes, pos - 2))
    } else {
        None
    };
    let fixed_size = pos;

    let mut keys = Vec::new();
    if flags & 0x2 != 0 {
        for _ in 0..num_keys {
            let end = pos + bytes[pos..].iter().position(|&b| b == 0).expect("NUL");
            keys.push(String::from_utf8(bytes[pos..end].to_vec()).expect("utf8 key"));
            pos = end + 1;
        }
    }

    ParsedHeader {
        version,
        flags,
        header_size,
        types,
        compression,
        keys,
        fixed_size,
    }
}

/// Initialise test logging once
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
