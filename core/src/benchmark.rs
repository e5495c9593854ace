//! The timed read, query, write benchmark job.

use crate::error::{BenchError, BenchResult};
use crate::session::{BenchmarkSession, EngineConfig};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tabbench_common::Location;
use tracing::info;

/// Name the input relation is registered under.
pub const VIEW_NAME: &str = "benchmark_data";

/// Identity projection over [`VIEW_NAME`].
pub const IDENTITY_QUERY: &str = "SELECT * FROM benchmark_data";

/// Input formats the driver can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FromStr for FileFormat {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            _ => Err(BenchError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Parquet => write!(f, "parquet"),
        }
    }
}

/// Outcome of a single benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub input_path: String,
    pub output_path: String,
    pub file_format: FileFormat,
    pub rows_written: u64,
    #[serde(rename = "execution_time_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl BenchmarkReport {
    pub fn execution_time_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// The line printed on success.
    pub fn summary_line(&self) -> String {
        format!("Script Execution Time: {:.2} seconds", self.execution_time_secs())
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Reads a dataset, passes it through an identity query and writes it back.
#[derive(Debug, Clone)]
pub struct BenchmarkJob {
    input: Location,
    output: Location,
    file_format: FileFormat,
    engine: EngineConfig,
}

impl BenchmarkJob {
    /// Validate the job arguments.
    ///
    /// Paths are parsed here so malformed locations fail before a session is
    /// started.
    pub fn new(input_path: &str, output_path: &str, file_format: FileFormat) -> BenchResult<Self> {
        Ok(Self {
            input: Location::parse(input_path)?,
            output: Location::parse(output_path)?,
            file_format,
            engine: EngineConfig::default(),
        })
    }

    /// Like [`BenchmarkJob::new`] but takes the format as a string.
    pub fn from_args(input_path: &str, output_path: &str, file_format: &str) -> BenchResult<Self> {
        let file_format = file_format.parse::<FileFormat>()?;
        Self::new(input_path, output_path, file_format)
    }

    pub fn with_engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn input(&self) -> &Location {
        &self.input
    }

    pub fn output(&self) -> &Location {
        &self.output
    }

    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    /// Run the job once and time it.
    ///
    /// The clock covers session startup, load, query and write. It stops
    /// before the session is released.
    pub async fn run(&self) -> BenchResult<BenchmarkReport> {
        if self.output.contains(&self.input)? {
            return Err(BenchError::Configuration(format!(
                "Cannot overwrite '{}' while it is also being read from",
                self.output
            )));
        }

        let start = Instant::now();

        let session = BenchmarkSession::new(self.engine.clone())?;

        let frame = session.load(&self.input, self.file_format).await?;
        session.create_or_replace_view(VIEW_NAME, frame)?;

        let result = session.sql(IDENTITY_QUERY).await?;
        let rows_written = session.write_csv(result, &self.output).await?;

        let elapsed = start.elapsed();
        session.stop();

        let report = BenchmarkReport {
            input_path: self.input.to_string(),
            output_path: self.output.to_string(),
            file_format: self.file_format,
            rows_written,
            elapsed,
        };
        info!(
            "Benchmark finished: {} rows in {:.3}s",
            report.rows_written,
            report.execution_time_secs()
        );
        Ok(report)
    }
}
