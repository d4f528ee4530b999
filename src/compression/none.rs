use super::StreamCompressor;

/// Pass-through session: records are written exactly as packed.
#[derive(Debug, Default)]
pub struct NoneCompressor {
    out: Vec<u8>,
    eof: bool,
    total: u64,
}

impl NoneCompressor {
    /// Create a pass-through session
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamCompressor for NoneCompressor {
    fn compress(&mut self, src: &[u8]) -> &[u8] {
        self.out.clear();
        self.out.extend_from_slice(src);
        self.total += src.len() as u64;
        &self.out
    }

    fn finalize(&mut self) -> &[u8] {
        self.out.clear();
        self.eof = true;
        &self.out
    }

    fn output(&self) -> &[u8] {
        &self.out
    }

    fn good(&self) -> bool {
        true
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn total_in(&self) -> u64 {
        self.total
    }

    fn total_out(&self) -> u64 {
        self.total
    }
}
