use std::fmt;

use super::config::CompressionType;

/// Position in the write state machine.
///
/// `Idle → HeaderEmitted → KeysEmitted? → PaddingEmitted → Streaming → Finalizing`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// Nothing written yet
    Idle,
    /// Fixed header struct written
    HeaderEmitted,
    /// Key block written
    KeysEmitted,
    /// Padding written, data region starts next
    PaddingEmitted,
    /// Writing the record with this index
    Streaming(usize),
    /// Draining the compression session
    Finalizing,
}

/// Why a write stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The output stream was (or became) unhealthy
    StreamUnhealthy,
    /// The compression session reported an error or did not complete
    CompressorFailed,
    /// The header region does not fit the 32-bit header_size field
    HeaderTooLarge,
}

/// Terminal state of a write call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every record and the trailing codec bytes were written
    Done,
    /// The write stopped in `stage`; nothing was written after the failure
    Aborted {
        /// Stage in which the failure was observed
        stage: WriteStage,
        /// What failed
        reason: AbortReason,
    },
}

/// Statistics from a write call
#[derive(Debug, Clone)]
pub struct WriterStats {
    /// How the write ended
    pub outcome: WriteOutcome,
    /// Compression backend actually used
    pub compression: CompressionType,
    /// header_size recorded in the header (0 if no header was built)
    pub header_size: u32,
    /// Padding bytes after the fixed struct and key block
    pub padding: usize,
    /// Records passed through the compression session
    pub rows_written: usize,
    /// Uncompressed bytes fed to the session
    pub uncompressed_bytes: u64,
    /// Bytes the session produced for the data region
    pub compressed_bytes: u64,
    /// Bytes the stream accepted during this call
    pub bytes_written: u64,
}

impl WriterStats {
    pub(crate) fn new(compression: CompressionType) -> Self {
        Self {
            outcome: WriteOutcome::Done,
            compression,
            header_size: 0,
            padding: 0,
            rows_written: 0,
            uncompressed_bytes: 0,
            compressed_bytes: 0,
            bytes_written: 0,
        }
    }

    /// True when the write completed
    pub fn is_complete(&self) -> bool {
        self.outcome == WriteOutcome::Done
    }

    /// Compressed size over uncompressed size of the data region
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.uncompressed_bytes == 0 {
            None
        } else {
            Some(self.compressed_bytes as f64 / self.uncompressed_bytes as f64)
        }
    }
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            WriteOutcome::Done => write!(
                f,
                "Wrote {} rows ({} -> {} bytes, {:?}) after a {}-byte header",
                self.rows_written,
                self.uncompressed_bytes,
                self.compressed_bytes,
                self.compression,
                self.header_size
            ),
            WriteOutcome::Aborted { stage, reason } => write!(
                f,
                "Aborted at {:?} ({:?}) after {} rows, {} bytes written",
                stage, reason, self.rows_written, self.bytes_written
            ),
        }
    }
}
