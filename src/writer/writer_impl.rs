use std::io::Write;

use log::{debug, warn};

use crate::compression::{Compressor, StreamCompressor};
use crate::header::{FormatVersion, Header, HeaderBuilder};
use crate::schema::{Column, Dataset};

use super::config::{CompressionType, WriterConfig};
use super::error::WriterError;
use super::packer::RowPacker;
use super::stats::{AbortReason, WriteOutcome, WriteStage, WriterStats};
use super::stream::OutputStream;

/// Writes datasets as ChPF files.
///
/// The writer holds only configuration; every [`write`](Self::write) call owns
/// its own compression session and row buffer, so one writer can serve
/// concurrent calls on independent streams.
///
/// Stream and codec failures do not produce errors. The call stops writing at
/// the first failure and reports it through [`WriterStats::outcome`]; the
/// stream keeps the I/O error and the exact byte count it accepted.
#[derive(Debug, Clone, Default)]
pub struct ParticleWriter {
    config: WriterConfig,
}

impl ParticleWriter {
    /// Create a writer with the given configuration
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Compression and header shape this writer uses for `dataset`.
    ///
    /// Returns the resolved backend; v1 headers cannot record one and force None.
    fn effective_compression(&self, dataset: &Dataset<'_>) -> CompressionType {
        let version = self.config.header_version;
        let mut compression = self.config.compression.resolve();

        if version < FormatVersion::V2 && compression != CompressionType::None {
            warn!(
                "v1 headers carry no compression field, writing uncompressed instead of {:?}",
                compression
            );
            compression = CompressionType::None;
        }
        if version < FormatVersion::V3 && dataset.has_keys() {
            warn!(
                "v{} headers carry no key block, dropping {} key names",
                version.number(),
                dataset.num_columns()
            );
        }
        compression
    }

    /// Write `dataset` to `stream`.
    ///
    /// An unhealthy stream is left untouched. Otherwise the header, key block,
    /// padding, records and trailing codec bytes are written in order until
    /// done or until the stream or the codec fails.
    pub fn write<W: Write>(
        &self,
        stream: &mut OutputStream<W>,
        dataset: &Dataset<'_>,
    ) -> WriterStats {
        let compression = self.effective_compression(dataset);
        self.write_with_session(stream, dataset, compression, || {
            Compressor::for_type(compression, &self.config)
        })
    }

    /// Write `dataset` with the codec session produced by `new_session`.
    ///
    /// The session is opened only after the padding is on the stream.
    pub(crate) fn write_with_session<W, S, F>(
        &self,
        stream: &mut OutputStream<W>,
        dataset: &Dataset<'_>,
        compression: CompressionType,
        new_session: F,
    ) -> WriterStats
    where
        W: Write,
        S: StreamCompressor,
        F: FnOnce() -> S,
    {
        let start = stream.bytes_written();
        let mut stats = WriterStats::new(compression);

        let result = self.write_stages(stream, dataset, compression, new_session, &mut stats);
        stats.outcome = match result {
            Ok(()) => WriteOutcome::Done,
            Err((stage, reason)) => {
                warn!("ChPF write aborted at {:?}: {:?}", stage, reason);
                WriteOutcome::Aborted { stage, reason }
            }
        };
        stats.bytes_written = stream.bytes_written() - start;

        debug!("{}", stats);
        stats
    }

    fn write_stages<W, S, F>(
        &self,
        stream: &mut OutputStream<W>,
        dataset: &Dataset<'_>,
        compression: CompressionType,
        new_session: F,
        stats: &mut WriterStats,
    ) -> Result<(), (WriteStage, AbortReason)>
    where
        W: Write,
        S: StreamCompressor,
        F: FnOnce() -> S,
    {
        let mut stage = WriteStage::Idle;
        let stream_failed = |stage| (stage, AbortReason::StreamUnhealthy);

        if !stream.good() {
            return Err(stream_failed(stage));
        }

        let header = HeaderBuilder::for_dataset(dataset, self.config.header_version, compression)
            .map_err(|e| {
                warn!("{}", e);
                (stage, AbortReason::HeaderTooLarge)
            })?;
        stats.header_size = header.header_size();
        stats.padding = header.padding();
        debug!(
            "ChPF v{} header: {} columns, {} bytes ({} key bytes, {} padding)",
            header.version().number(),
            header.num_keys(),
            header.header_size(),
            header.key_block_size(),
            header.padding()
        );

        if !stream.write_bytes(&header.fixed_bytes()) {
            return Err(stream_failed(stage));
        }
        stage = WriteStage::HeaderEmitted;

        if header.keys_follow() {
            if !stream.write_bytes(&key_block(dataset, &header)) {
                return Err(stream_failed(stage));
            }
            stage = WriteStage::KeysEmitted;
        }

        if !stream.write_bytes(&vec![0u8; header.padding()]) {
            return Err(stream_failed(stage));
        }
        stage = WriteStage::PaddingEmitted;

        let mut session = new_session();
        if !session.good() {
            return Err((stage, AbortReason::CompressorFailed));
        }

        let mut packer = RowPacker::new(dataset.columns());
        for row in 0..dataset.num_rows() {
            stage = WriteStage::Streaming(row);

            session.compress(packer.repack_row(row));
            if !session.good() {
                return Err((stage, AbortReason::CompressorFailed));
            }
            if !stream.write_bytes(session.output()) {
                return Err(stream_failed(stage));
            }

            stats.rows_written += 1;
            stats.uncompressed_bytes = session.total_in();
            stats.compressed_bytes = session.total_out();
        }

        stage = WriteStage::Finalizing;
        session.finalize();
        stats.compressed_bytes = session.total_out();
        if !session.eof() {
            return Err((stage, AbortReason::CompressorFailed));
        }
        if !stream.write_bytes(session.output()) || !stream.flush() {
            return Err(stream_failed(stage));
        }

        Ok(())
    }
}

/// Key names in column order, each followed by one NUL byte
fn key_block(dataset: &Dataset<'_>, header: &Header) -> Vec<u8> {
    let mut block = Vec::with_capacity(header.key_block_size());
    for key in dataset.keys() {
        block.extend_from_slice(key.as_bytes());
        block.push(0);
    }
    block
}

/// Write `columns` to `stream` with the default configuration and `compression`.
///
/// `keys` must be empty or hold exactly one name per column; any other shape
/// is rejected before a byte is written. Stream and codec failures are not
/// errors, see [`ParticleWriter`].
pub fn write<'a, W, I, S>(
    stream: &mut OutputStream<W>,
    compression: CompressionType,
    keys: I,
    columns: Vec<Column<'a>>,
) -> Result<WriterStats, WriterError>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let dataset = Dataset::with_keys(columns, keys)?;
    let writer = ParticleWriter::new(WriterConfig::with_compression(compression));
    Ok(writer.write(stream, &dataset))
}
