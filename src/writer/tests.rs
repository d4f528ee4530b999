use super::*;
use crate::compression::StreamCompressor;
use crate::header::FormatVersion;
use crate::schema::{Column, Dataset};
use std::io::{self, Cursor, Write};

/// Sink that accepts `limit` bytes and then fails every write
struct FailAfter {
    limit: usize,
    data: Vec<u8>,
    attempts_after_failure: usize,
}

impl FailAfter {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            data: Vec::new(),
            attempts_after_failure: 0,
        }
    }
}

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.data.len();
        if room == 0 {
            self.attempts_after_failure += 1;
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let n = room.min(buf.len());
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Pass-through codec that can be told to break at a given row or at finish
#[derive(Default)]
struct ScriptedSession {
    broken: bool,
    fail_at_row: Option<usize>,
    trailer: Vec<u8>,
    finish_incomplete: bool,
    rows: usize,
    out: Vec<u8>,
    eof: bool,
    total_in: u64,
    total_out: u64,
}

impl StreamCompressor for ScriptedSession {
    fn compress(&mut self, src: &[u8]) -> &[u8] {
        self.out.clear();
        if self.broken || self.eof {
            return &self.out;
        }
        if self.fail_at_row == Some(self.rows) {
            self.broken = true;
            return &self.out;
        }
        self.rows += 1;
        self.out.extend_from_slice(src);
        self.total_in += src.len() as u64;
        self.total_out += src.len() as u64;
        &self.out
    }

    fn finalize(&mut self) -> &[u8] {
        self.out.clear();
        if self.broken || self.eof {
            return &self.out;
        }
        self.out.extend_from_slice(&self.trailer);
        self.total_out += self.trailer.len() as u64;
        self.eof = !self.finish_incomplete;
        &self.out
    }

    fn output(&self) -> &[u8] {
        &self.out
    }

    fn good(&self) -> bool {
        !self.broken
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

fn aborted(stage: WriteStage, reason: AbortReason) -> WriteOutcome {
    WriteOutcome::Aborted { stage, reason }
}

#[test]
fn test_row_packer_offsets() {
    let a = [1i32, 2];
    let b = [3u8, 4];
    let c = [5.0f64, 6.0];
    let columns = vec![Column::new(&a), Column::new(&b), Column::new(&c)];

    let mut packer = RowPacker::new(&columns);
    assert_eq!(packer.record_size(), 13);

    let mut expected = Vec::new();
    expected.extend_from_slice(&2i32.to_ne_bytes());
    expected.push(4u8);
    expected.extend_from_slice(&6.0f64.to_ne_bytes());
    assert_eq!(packer.repack_row(1), expected.as_slice());
}

#[test]
fn test_stream_counts_and_fails() {
    let mut stream = OutputStream::new(FailAfter::new(5));
    assert!(stream.write_bytes(b"abc"));
    assert!(!stream.write_bytes(b"defg"));
    assert_eq!(stream.state(), StreamState::Failed);
    assert_eq!(stream.bytes_written(), 5);
    assert!(stream.last_error().is_some());

    // A failed stream never touches the sink again
    assert!(!stream.write_bytes(b"h"));
    assert_eq!(stream.get_ref().attempts_after_failure, 1);
}

#[test]
fn test_closed_stream_rejects_writes() {
    let mut stream = OutputStream::new(Vec::new());
    stream.close();
    assert_eq!(stream.state(), StreamState::Closed);
    assert!(!stream.write_bytes(b"x"));
    assert!(stream.into_inner().is_empty());
}

#[test]
fn test_config_from_toml() {
    let config = WriterConfig::from_toml_str(
        r#"
            [writer]
            compression = "zlib"
            header_version = 2
            zlib_level = 12
        "#,
    )
    .unwrap();

    assert_eq!(config.compression, CompressionType::Zlib);
    assert_eq!(config.header_version, FormatVersion::V2);
    // clamped
    assert_eq!(config.zlib_level, 9);
    assert_eq!(config.zstd_level, 3);
}

#[test]
fn test_config_defaults_and_errors() {
    let config = WriterConfig::from_toml_str("").unwrap();
    assert_eq!(config.compression, CompressionType::UseDefault);
    assert_eq!(config.header_version, FormatVersion::V3);

    let config = WriterConfig::from_toml_str("[writer]\ncompression = \"default\"").unwrap();
    assert_eq!(config.compression, CompressionType::UseDefault);

    assert!(matches!(
        WriterConfig::from_toml_str("[writer]\nheader_version = 7"),
        Err(WriterError::ConfigError(_))
    ));
    assert!(matches!(
        WriterConfig::from_toml_str("[writer]\ncompression = \"lz4\""),
        Err(WriterError::ConfigError(_))
    ));
}

#[test]
fn test_write_uncompressed_layout() {
    let a = [1i32, 2];
    let f = [0.5f32, 1.5];
    let dataset = Dataset::new(vec![Column::new(&a), Column::new(&f)]).unwrap();

    let writer = ParticleWriter::new(WriterConfig::fast());
    let mut stream = OutputStream::new(Cursor::new(Vec::new()));
    let stats = writer.write(&mut stream, &dataset);

    assert!(stats.is_complete());
    assert_eq!(stats.compression, CompressionType::None);
    assert_eq!(stats.header_size, 512);
    assert_eq!(stats.rows_written, 2);
    assert_eq!(stats.bytes_written, 512 + 2 * 8);

    let bytes = stream.into_inner().into_inner();
    assert_eq!(bytes.len(), 528);
    assert_eq!(&bytes[512..516], &1i32.to_ne_bytes());
    assert_eq!(&bytes[516..520], &0.5f32.to_ne_bytes());
    assert_eq!(&bytes[520..524], &2i32.to_ne_bytes());
}

#[test]
fn test_unhealthy_stream_writes_nothing() {
    let a = [1u8, 2, 3];
    let dataset = Dataset::new(vec![Column::new(&a)]).unwrap();
    let mut stream = OutputStream::new(Vec::new());
    stream.close();

    let stats = ParticleWriter::default().write(&mut stream, &dataset);
    assert_eq!(
        stats.outcome,
        WriteOutcome::Aborted {
            stage: WriteStage::Idle,
            reason: AbortReason::StreamUnhealthy
        }
    );
    assert_eq!(stats.bytes_written, 0);
    assert!(stream.into_inner().is_empty());
}

#[test]
fn test_failure_during_header() {
    let a = [1u8, 2, 3];
    let dataset = Dataset::new(vec![Column::new(&a)]).unwrap();
    let mut stream = OutputStream::new(FailAfter::new(10));

    let stats = ParticleWriter::new(WriterConfig::fast()).write(&mut stream, &dataset);
    assert_eq!(
        stats.outcome,
        WriteOutcome::Aborted {
            stage: WriteStage::Idle,
            reason: AbortReason::StreamUnhealthy
        }
    );
    assert_eq!(stats.bytes_written, 10);
    assert_eq!(stream.get_ref().attempts_after_failure, 1);
}

#[test]
fn test_failure_mid_stream_stops_writing() {
    let values: Vec<u32> = (0..100).collect();
    let dataset = Dataset::new(vec![Column::new(&values)]).unwrap();
    // header (512) plus ten records and a half
    let mut stream = OutputStream::new(FailAfter::new(512 + 42));

    let stats = ParticleWriter::new(WriterConfig::fast()).write(&mut stream, &dataset);
    assert_eq!(
        stats.outcome,
        WriteOutcome::Aborted {
            stage: WriteStage::Streaming(10),
            reason: AbortReason::StreamUnhealthy
        }
    );
    assert_eq!(stats.rows_written, 10);
    assert_eq!(stream.bytes_written(), 554);
    assert_eq!(stream.get_ref().attempts_after_failure, 1);
    assert!(!stats.is_complete());
}

#[test]
fn test_free_write_rejects_partial_keys() {
    let a = [1u8];
    let b = [2u8];
    let mut stream = OutputStream::new(Vec::new());

    let result = write(
        &mut stream,
        CompressionType::None,
        ["a"],
        vec![Column::new(&a), Column::new(&b)],
    );
    assert!(matches!(result, Err(WriterError::InvalidData(_))));
    assert_eq!(stream.bytes_written(), 0);
}

#[test]
fn test_v1_forces_uncompressed() {
    let a = [1u16, 2, 3];
    let dataset = Dataset::with_keys(vec![Column::new(&a)], ["a"]).unwrap();
    let config = WriterConfig {
        header_version: FormatVersion::V1,
        ..WriterConfig::default()
    };

    let mut stream = OutputStream::new(Vec::new());
    let stats = ParticleWriter::new(config).write(&mut stream, &dataset);

    assert!(stats.is_complete());
    assert_eq!(stats.compression, CompressionType::None);
    let bytes = stream.into_inner();
    assert_eq!(bytes.len(), 512 + 6);
    assert_eq!(u16::from_ne_bytes([bytes[4], bytes[5]]), 1);
}

#[test]
fn test_stats_display() {
    let mut stats = WriterStats::new(CompressionType::None);
    stats.rows_written = 4;
    stats.header_size = 512;
    assert!(stats.to_string().starts_with("Wrote 4 rows"));
    assert_eq!(stats.compression_ratio(), None);
}

#[test]
fn test_session_that_never_starts_stops_after_padding() {
    let values: Vec<u32> = (0..8).collect();
    let dataset = Dataset::new(vec![Column::new(&values)]).unwrap();
    let mut stream = OutputStream::new(Vec::new());

    let writer = ParticleWriter::new(WriterConfig::fast());
    let stats = writer.write_with_session(&mut stream, &dataset, CompressionType::None, || {
        ScriptedSession {
            broken: true,
            ..ScriptedSession::default()
        }
    });

    assert_eq!(
        stats.outcome,
        aborted(WriteStage::PaddingEmitted, AbortReason::CompressorFailed)
    );
    assert_eq!(stats.rows_written, 0);
    assert_eq!(stats.bytes_written, stats.header_size as u64);
    assert_eq!(stream.into_inner().len(), 512);
}

#[cfg(feature = "zstd")]
#[test]
fn test_uninitialised_zstd_context_leaves_header_only() {
    use crate::compression::{Compressor, ZstdCompressor};

    let values: Vec<f32> = (0..64).map(|i| i as f32).collect();
    let dataset = Dataset::with_keys(vec![Column::new(&values)], ["x"]).unwrap();
    let mut stream = OutputStream::new(Vec::new());

    let writer = ParticleWriter::default();
    let stats = writer.write_with_session(&mut stream, &dataset, CompressionType::Zstd, || {
        Compressor::Zstd(ZstdCompressor::failed(1024))
    });

    assert_eq!(
        stats.outcome,
        aborted(WriteStage::PaddingEmitted, AbortReason::CompressorFailed)
    );
    assert_eq!(stats.compressed_bytes, 0);
    assert_eq!(stats.bytes_written, stats.header_size as u64);
    assert_eq!(stream.bytes_written(), stats.header_size as u64);
    assert!(stream.good());
}

#[test]
fn test_codec_failure_mid_stream() {
    let values: Vec<u32> = (0..20).collect();
    let dataset = Dataset::new(vec![Column::new(&values)]).unwrap();
    let mut stream = OutputStream::new(Vec::new());

    let writer = ParticleWriter::new(WriterConfig::fast());
    let stats = writer.write_with_session(&mut stream, &dataset, CompressionType::None, || {
        ScriptedSession {
            fail_at_row: Some(3),
            ..ScriptedSession::default()
        }
    });

    assert_eq!(
        stats.outcome,
        aborted(WriteStage::Streaming(3), AbortReason::CompressorFailed)
    );
    assert_eq!(stats.rows_written, 3);
    let bytes = stream.into_inner();
    assert_eq!(bytes.len(), 512 + 3 * 4);
    assert_eq!(&bytes[512 + 8..], &2u32.to_ne_bytes());
}

#[test]
fn test_incomplete_finish_drops_trailer() {
    let values: Vec<u32> = (0..5).collect();
    let dataset = Dataset::new(vec![Column::new(&values)]).unwrap();
    let mut stream = OutputStream::new(Vec::new());

    let writer = ParticleWriter::new(WriterConfig::fast());
    let stats = writer.write_with_session(&mut stream, &dataset, CompressionType::None, || {
        ScriptedSession {
            trailer: b"END".to_vec(),
            finish_incomplete: true,
            ..ScriptedSession::default()
        }
    });

    assert_eq!(
        stats.outcome,
        aborted(WriteStage::Finalizing, AbortReason::CompressorFailed)
    );
    assert_eq!(stats.rows_written, 5);
    assert_eq!(stats.compressed_bytes, 5 * 4 + 3);
    assert_eq!(stream.into_inner().len(), 512 + 5 * 4);
}

#[test]
fn test_stream_failure_while_writing_trailer() {
    let values: Vec<u32> = (0..5).collect();
    let dataset = Dataset::new(vec![Column::new(&values)]).unwrap();
    // room for every record and one trailer byte
    let mut stream = OutputStream::new(FailAfter::new(512 + 5 * 4 + 1));

    let writer = ParticleWriter::new(WriterConfig::fast());
    let stats = writer.write_with_session(&mut stream, &dataset, CompressionType::None, || {
        ScriptedSession {
            trailer: b"END".to_vec(),
            ..ScriptedSession::default()
        }
    });

    assert_eq!(
        stats.outcome,
        aborted(WriteStage::Finalizing, AbortReason::StreamUnhealthy)
    );
    assert_eq!(stats.rows_written, 5);
    assert_eq!(stats.bytes_written, 512 + 5 * 4 + 1);
    assert_eq!(stream.state(), StreamState::Failed);
    assert_eq!(stream.get_ref().data.last(), Some(&b'E'));
}
