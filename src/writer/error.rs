/// Errors returned by the ChPF writer.
///
/// Stream and codec failures during a write are not errors: they end the write
/// early and are reported through [`WriterStats`](super::WriterStats) and the
/// [`OutputStream`](super::OutputStream) state instead.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error while loading configuration
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed TOML configuration
    #[error("Configuration error: {0}")]
    ConfigError(#[from] toml::de::Error),

    /// Invalid data provided to the writer
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Header region does not fit the 32-bit header_size field
    #[error("Header of {0} bytes exceeds the 32-bit header_size field")]
    HeaderTooLarge(u64),
}
