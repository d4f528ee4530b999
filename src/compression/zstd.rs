use ::zstd::stream::raw::{Encoder, InBuffer, Operation, OutBuffer};
use log::error;

use super::buffer::DrainBuffer;
use super::StreamCompressor;

/// Streaming zstd session producing a single frame.
pub struct ZstdCompressor {
    encoder: Option<Encoder<'static>>,
    out: DrainBuffer,
    good: bool,
    eof: bool,
    total_in: u64,
    total_out: u64,
}

impl ZstdCompressor {
    /// Start a zstd stream at `level`. A context that fails to initialise
    /// yields a session that is not `good()`.
    pub fn new(level: i32, block_size: usize) -> Self {
        let encoder = match Encoder::new(level) {
            Ok(encoder) => Some(encoder),
            Err(e) => {
                error!("zstd context init at level {}: {}", level, e);
                None
            }
        };

        Self {
            good: encoder.is_some(),
            encoder,
            out: DrainBuffer::new(block_size),
            eof: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// A session whose context never initialised.
    #[cfg(test)]
    pub(crate) fn failed(block_size: usize) -> Self {
        Self {
            encoder: None,
            out: DrainBuffer::new(block_size),
            good: false,
            eof: false,
            total_in: 0,
            total_out: 0,
        }
    }
}

impl StreamCompressor for ZstdCompressor {
    fn compress(&mut self, src: &[u8]) -> &[u8] {
        self.out.clear();
        if !self.good || self.eof {
            return self.out.filled();
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return self.out.filled();
        };

        let mut input = InBuffer::around(src);
        loop {
            let spare = self.out.spare();
            let spare_len = spare.len();
            let (result, written) = {
                let mut output = OutBuffer::around(spare);
                let result = encoder.run(&mut input, &mut output);
                (result, output.pos())
            };
            self.out.commit(written);

            if let Err(e) = result {
                error!("zstd compress: {}", e);
                self.good = false;
                break;
            }

            // Keep draining while input is pending or the codec filled the tail
            if input.pos() == src.len() && written < spare_len {
                break;
            }
        }

        self.total_in += input.pos() as u64;
        self.total_out += self.out.filled().len() as u64;
        self.out.filled()
    }

    fn finalize(&mut self) -> &[u8] {
        self.out.clear();
        if !self.good || self.eof {
            return self.out.filled();
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return self.out.filled();
        };

        loop {
            let (result, written) = {
                let mut output = OutBuffer::around(self.out.spare());
                let result = encoder.finish(&mut output, true);
                (result, output.pos())
            };
            self.out.commit(written);

            match result {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("zstd finish: {}", e);
                    self.good = false;
                    break;
                }
            }
        }

        self.total_out += self.out.filled().len() as u64;
        self.out.filled()
    }

    fn output(&self) -> &[u8] {
        self.out.filled()
    }

    fn good(&self) -> bool {
        self.good
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn total_in(&self) -> u64 {
        self.total_in
    }

    fn total_out(&self) -> u64 {
        self.total_out
    }
}
