use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("Corrupt input: non-finite value {value} at index {index}")]
    CorruptInput { index: usize, value: f64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Price provider error: {0}")]
    ProviderError(String),
}

impl EngineError {
    /// Whether the caller can recover by asking for different input
    /// (another symbol, interval or file) rather than treating it as a bug.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::CorruptInput { .. })
    }
}
