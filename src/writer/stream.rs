use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use log::warn;

use super::error::WriterError;

/// Health of an [`OutputStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting writes
    Good,
    /// A write or flush failed; no further bytes are accepted
    Failed,
    /// Closed by the caller; no further bytes are accepted
    Closed,
}

/// Byte sink with a health check.
///
/// Wraps any [`Write`] and remembers the first failure: once a write or flush
/// errors, the stream stops accepting bytes and [`good`](Self::good) turns false.
/// The byte count reflects exactly what the inner writer accepted, so callers
/// can detect a truncated file after a write returns.
#[derive(Debug)]
pub struct OutputStream<W: Write> {
    inner: W,
    state: StreamState,
    bytes_written: u64,
    last_error: Option<io::Error>,
}

impl OutputStream<File> {
    /// Create (truncate) a file and wrap it
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, WriterError> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> OutputStream<W> {
    /// Wrap a writer in a healthy stream
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: StreamState::Good,
            bytes_written: 0,
            last_error: None,
        }
    }

    /// True while the stream accepts writes
    pub fn good(&self) -> bool {
        self.state == StreamState::Good
    }

    /// Current health
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Bytes the inner writer has accepted
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The error that made the stream unhealthy, if any
    pub fn last_error(&self) -> Option<&io::Error> {
        self.last_error.as_ref()
    }

    /// Take the recorded error, leaving the stream state unchanged
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.last_error.take()
    }

    /// Flush and stop accepting writes. The inner writer is kept until
    /// [`into_inner`](Self::into_inner).
    pub fn close(&mut self) {
        if self.good() {
            self.flush();
        }
        if self.state == StreamState::Good {
            self.state = StreamState::Closed;
        }
    }

    /// Write all of `bytes`. Returns the stream health afterwards.
    ///
    /// An unhealthy stream writes nothing.
    pub fn write_bytes(&mut self, mut bytes: &[u8]) -> bool {
        if !self.good() {
            return false;
        }

        while !bytes.is_empty() {
            match self.inner.write(bytes) {
                Ok(0) => {
                    self.fail(io::Error::new(
                        ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                    return false;
                }
                Ok(n) => {
                    self.bytes_written += n as u64;
                    bytes = &bytes[n..];
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.fail(e);
                    return false;
                }
            }
        }
        true
    }

    /// Flush the inner writer. Returns the stream health afterwards.
    pub fn flush(&mut self) -> bool {
        if !self.good() {
            return false;
        }
        if let Err(e) = self.inner.flush() {
            self.fail(e);
        }
        self.good()
    }

    /// Borrow the inner writer
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the inner writer
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn fail(&mut self, error: io::Error) {
        warn!(
            "Output stream failed after {} bytes: {}",
            self.bytes_written, error
        );
        self.state = StreamState::Failed;
        self.last_error = Some(error);
    }
}
