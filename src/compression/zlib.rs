use ::flate2::{Compress, Compression, FlushCompress, Status};
use log::error;

use super::buffer::DrainBuffer;
use super::StreamCompressor;

/// Streaming zlib session backed by `flate2::Compress`.
#[derive(Debug)]
pub struct ZlibCompressor {
    stream: Compress,
    out: DrainBuffer,
    good: bool,
    eof: bool,
}

impl ZlibCompressor {
    /// Start a zlib stream (with zlib header) at `level` (0-9)
    pub fn new(level: u32, block_size: usize) -> Self {
        Self {
            stream: Compress::new(Compression::new(level.min(9)), true),
            out: DrainBuffer::new(block_size),
            good: true,
            eof: false,
        }
    }

    /// Put the session into the failed state, as a codec error would.
    #[cfg(test)]
    pub(crate) fn inject_fault(&mut self) {
        self.fail("injected fault");
    }

    fn fail(&mut self, what: &str) {
        error!("zlib {} failed, aborting compression session", what);
        self.good = false;
    }
}

impl StreamCompressor for ZlibCompressor {
    fn compress(&mut self, src: &[u8]) -> &[u8] {
        self.out.clear();
        if !self.good || self.eof {
            return self.out.filled();
        }

        let mut consumed = 0;
        loop {
            let before_in = self.stream.total_in();
            let before_out = self.stream.total_out();
            let spare = self.out.spare();
            let spare_len = spare.len();
            let result = self.stream.compress(&src[consumed..], spare, FlushCompress::None);

            let read = (self.stream.total_in() - before_in) as usize;
            let written = (self.stream.total_out() - before_out) as usize;
            consumed += read;
            self.out.commit(written);

            match result {
                Ok(Status::Ok) | Ok(Status::BufError) => {}
                Ok(Status::StreamEnd) => {
                    self.fail("stream ended early");
                    break;
                }
                Err(e) => {
                    error!("zlib compress: {}", e);
                    self.fail("compress");
                    break;
                }
            }

            // Keep draining while input is pending or the codec filled the tail
            if consumed == src.len() && written < spare_len {
                break;
            }
            if read == 0 && written == 0 {
                self.fail("compress made no progress");
                break;
            }
        }

        self.out.filled()
    }

    fn finalize(&mut self) -> &[u8] {
        self.out.clear();
        if !self.good || self.eof {
            return self.out.filled();
        }

        loop {
            let before_out = self.stream.total_out();
            let result = self
                .stream
                .compress(&[], self.out.spare(), FlushCompress::Finish);
            let written = (self.stream.total_out() - before_out) as usize;
            self.out.commit(written);

            match result {
                Ok(Status::StreamEnd) => {
                    self.eof = true;
                    break;
                }
                Ok(Status::Ok) => {}
                Ok(Status::BufError) if written > 0 => {}
                Ok(Status::BufError) => {
                    self.fail("finish made no progress");
                    break;
                }
                Err(e) => {
                    error!("zlib finish: {}", e);
                    self.fail("finish");
                    break;
                }
            }
        }

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
        self.stream.total_in()
    }

    fn total_out(&self) -> u64 {
        self.stream.total_out()
    }
}
