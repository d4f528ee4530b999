/// Magic bytes opening every ChPF file ("ChPF")
pub const CHPF_MAGIC: [u8; 4] = [0x43, 0x68, 0x50, 0x46];

/// Alignment unit of the header region in bytes
pub const HEADER_BLOCK_SIZE: usize = 512;

/// Header flag (v3): a NUL-terminated key name per column follows the fixed struct
pub const FLAG_KEYS_FOLLOW: u16 = 1 << 1;

