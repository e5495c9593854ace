//! tabbench core - synthetic datasets and a timed query-engine round trip
//!
//! This crate provides the `Record` schema and its batch generator, the CSV
//! and Parquet dataset writers, and the DataFusion-backed benchmark job that
//! reads a dataset, runs an identity query over it and writes the result.

pub mod benchmark;
pub mod error;
pub mod generator;
pub mod record;
pub mod session;

pub use benchmark::{BenchmarkJob, BenchmarkReport, FileFormat, IDENTITY_QUERY, VIEW_NAME};
pub use error::{BenchError, BenchResult};
pub use generator::{
    DEFAULT_ROW_COUNTS, DatasetFormat, DatasetGenerator, GeneratedFile, GeneratorConfig,
    RecordBatchSink, dataset_file_name,
};
pub use record::{CATEGORIES, RecordBatchGenerator, record_schema};
pub use session::{BenchmarkSession, EngineConfig};
