//! Query session used by the benchmark driver.
//!
//! [`BenchmarkSession`] wraps a DataFusion [`SessionContext`] and exposes the
//! handful of operations a benchmark job needs: load a dataset, register it
//! as a view, run SQL, and write a result out with overwrite semantics.

use crate::benchmark::FileFormat;
use crate::error::{BenchError, BenchResult};
use datafusion::arrow::array::{Array, AsArray};
use datafusion::arrow::datatypes::UInt64Type;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::config::CsvOptions;
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::execution::memory_pool::FairSpillPool;
use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionConfig, SessionContext};
use serde::Serialize;
use std::sync::Arc;
use tabbench_common::Location;
use tracing::{debug, info};

/// Configuration for the query session.
#[derive(Debug, Clone, Serialize)]
pub struct EngineConfig {
    pub app_name: String,
    pub batch_size: usize,
    pub target_partitions: usize,
    /// Memory pool size in bytes; unbounded when `None`.
    pub memory_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Spark Performance Benchmark".to_string(),
            batch_size: 8192,
            memory_limit: None,
            target_partitions: num_cpus::get(),
        }
    }
}

impl EngineConfig {
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_target_partitions(mut self, target_partitions: usize) -> Self {
        self.target_partitions = target_partitions;
        self
    }

    pub fn with_memory_limit(mut self, memory_limit: Option<usize>) -> Self {
        self.memory_limit = memory_limit;
        self
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.batch_size == 0 {
            return Err(BenchError::Configuration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.target_partitions == 0 {
            return Err(BenchError::Configuration(
                "target_partitions must be greater than zero".to_string(),
            ));
        }
        if self.memory_limit == Some(0) {
            return Err(BenchError::Configuration(
                "memory_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A live query session.
pub struct BenchmarkSession {
    context: SessionContext,
    config: EngineConfig,
}

impl BenchmarkSession {
    /// Start a session with the given configuration.
    pub fn new(config: EngineConfig) -> BenchResult<Self> {
        config.validate()?;

        let session_config = SessionConfig::new()
            .with_batch_size(config.batch_size)
            .with_target_partitions(config.target_partitions);

        let mut runtime = RuntimeEnvBuilder::new();
        if let Some(limit) = config.memory_limit {
            runtime = runtime.with_memory_pool(Arc::new(FairSpillPool::new(limit)));
        }
        let runtime_env = Arc::new(runtime.build()?);

        let context = SessionContext::new_with_config_rt(session_config, runtime_env);
        info!(
            "Started session '{}' (target_partitions={}, batch_size={})",
            config.app_name, config.target_partitions, config.batch_size
        );

        Ok(Self { context, config })
    }

    pub fn session_context(&self) -> &SessionContext {
        &self.context
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Make the object store behind a remote location reachable from queries.
    pub fn register_location(&self, location: &Location) -> BenchResult<()> {
        if let Location::Remote { url, .. } = location {
            let store = location.build_store()?;
            self.context.register_object_store(url, store);
            debug!("Registered object store for {}", url);
        }
        Ok(())
    }

    /// Load a dataset as a frame, inferring the schema for CSV input.
    pub async fn load(&self, location: &Location, format: FileFormat) -> BenchResult<DataFrame> {
        let (source, extension) = read_target(location, format).await;
        self.register_location(&source)?;

        let path = source.as_table_path();
        info!("Loading {} input from {}", format, source);

        let frame = match format {
            FileFormat::Csv => {
                let options = CsvReadOptions::new()
                    .has_header(true)
                    .file_extension(&extension);
                self.context.read_csv(path.as_str(), options).await?
            }
            FileFormat::Parquet => {
                let options = ParquetReadOptions {
                    file_extension: &extension,
                    ..Default::default()
                };
                self.context.read_parquet(path.as_str(), options).await?
            }
        };
        Ok(frame)
    }

    /// Register `frame` under `name`, replacing any view already using it.
    pub fn create_or_replace_view(&self, name: &str, frame: DataFrame) -> BenchResult<()> {
        if self.context.deregister_table(name)?.is_some() {
            debug!("Replaced existing view '{}'", name);
        }
        self.context.register_table(name, frame.into_view())?;
        Ok(())
    }

    pub async fn sql(&self, query: &str) -> BenchResult<DataFrame> {
        debug!("Executing query: {}", query);
        Ok(self.context.sql(query).await?)
    }

    /// Write `frame` as a directory of CSV part files with header rows.
    ///
    /// Whatever already exists at `location` is removed first. Returns the
    /// number of rows written.
    pub async fn write_csv(&self, frame: DataFrame, location: &Location) -> BenchResult<u64> {
        let cleared = location.clear().await?;
        if cleared > 0 {
            info!("Overwriting {} existing entries at {}", cleared, location);
        }

        let target = location.as_directory();
        self.register_location(&target)?;

        let csv_options = CsvOptions::default().with_has_header(true);
        let result = frame
            .write_csv(
                &target.as_table_path(),
                DataFrameWriteOptions::new(),
                Some(csv_options),
            )
            .await?;

        let rows = rows_written(&result);
        info!("Wrote {} rows to {}", rows, target);
        Ok(rows)
    }

    /// Release the session.
    pub fn stop(self) {
        info!("Stopped session '{}'", self.config.app_name);
    }
}

/// Resolve the path and extension filter the engine reads an input with.
///
/// Directories are listed with the format's extension as a filter. A path
/// naming a single file is read as-is whatever its extension.
async fn read_target(location: &Location, format: FileFormat) -> (Location, String) {
    let is_collection = match location {
        Location::Local { path } => tokio::fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_dir()),
        Location::Remote { url, .. } => is_remote_collection(url.path()),
    };
    if is_collection {
        (location.as_directory(), format!(".{}", format))
    } else {
        (location.clone(), String::new())
    }
}

/// Object stores have no directories; a key without an extension is
/// taken to be a prefix.
fn is_remote_collection(path: &str) -> bool {
    if path.ends_with('/') {
        return true;
    }
    let last_segment = path.rsplit('/').next().unwrap_or("");
    !last_segment.contains('.')
}

/// Sum the `count` column DataFusion returns from a write.
fn rows_written(batches: &[RecordBatch]) -> u64 {
    batches
        .iter()
        .filter(|batch| batch.num_columns() > 0)
        .filter_map(|batch| batch.column(0).as_primitive_opt::<UInt64Type>())
        .flat_map(|counts| (0..counts.len()).map(move |i| counts.value(i)))
        .sum()
}
