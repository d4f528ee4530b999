/// Reusable codec output buffer.
///
/// The writable tail never runs dry: once more than 80% of the buffer is
/// filled, one more block is appended before the codec is handed the tail.
#[derive(Debug)]
pub(crate) struct DrainBuffer {
    data: Vec<u8>,
    filled: usize,
    block: usize,
}

impl DrainBuffer {
    pub(crate) fn new(block: usize) -> Self {
        let block = block.max(1);
        Self {
            data: vec![0; block],
            filled: 0,
            block,
        }
    }

    /// Forget the previous output, keeping the allocation
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.filled = 0;
    }

    /// Writable tail for the next codec call
    pub(crate) fn spare(&mut self) -> &mut [u8] {
        if self.filled * 5 > self.data.len() * 4 {
            let grown = self.data.len() + self.block;
            self.data.resize(grown, 0);
        }
        &mut self.data[self.filled..]
    }

    /// Mark `n` bytes of the tail as produced
    #[inline]
    pub(crate) fn commit(&mut self, n: usize) {
        self.filled += n;
        debug_assert!(self.filled <= self.data.len());
    }

    /// Bytes produced since the last `clear`
    #[inline]
    pub(crate) fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }
}
