//! Error types for dataset generation and benchmark runs.

use datafusion::arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use datafusion::parquet::errors::ParquetError;
use std::path::Path;
use tabbench_common::CommonError;
use thiserror::Error;

/// Errors surfaced by the generators and the benchmark driver.
///
/// Library errors are carried as their rendered message; nothing here is
/// retried or recovered.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("DataFusion error: {0}")]
    DataFusion(String),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Unsupported file format '{0}'. Please use 'csv' or 'parquet'.")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl BenchError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        BenchError::Io(format!("{}: {}", path.as_ref().display(), err))
    }
}

impl From<DataFusionError> for BenchError {
    fn from(err: DataFusionError) -> Self {
        BenchError::DataFusion(err.to_string())
    }
}

impl From<ArrowError> for BenchError {
    fn from(err: ArrowError) -> Self {
        BenchError::Arrow(err.to_string())
    }
}

impl From<ParquetError> for BenchError {
    fn from(err: ParquetError) -> Self {
        BenchError::Parquet(err.to_string())
    }
}

/// Result type for generator and benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;
