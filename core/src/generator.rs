//! Synthetic dataset generation.
//!
//! A [`DatasetGenerator`] writes one file per configured row count into an
//! output directory, streaming batches from a [`RecordBatchGenerator`] into a
//! CSV or Parquet [`RecordBatchSink`]. Failures are returned as-is: a failed
//! write may leave a partial file behind.

use crate::error::{BenchError, BenchResult};
use crate::record::RecordBatchGenerator;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use datafusion::parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Row counts written by default: 1M, 2M, 4M, 6M, 8M and 10M.
pub const DEFAULT_ROW_COUNTS: [usize; 6] = [
    1_000_000, 2_000_000, 4_000_000, 6_000_000, 8_000_000, 10_000_000,
];

/// Rows materialized per batch while writing.
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

/// Rows per Parquet row group.
pub const DEFAULT_MAX_ROW_GROUP_SIZE: usize = 1_048_576;

/// On-disk encoding of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DatasetFormat::Csv => "csv",
            DatasetFormat::Parquet => "parquet",
        }
    }

    pub fn default_output_dir(&self) -> &'static str {
        match self {
            DatasetFormat::Csv => "sample_csv_data",
            DatasetFormat::Parquet => "sample_parquet_data",
        }
    }
}

/// Settings for a generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    pub row_counts: Vec<usize>,
    pub batch_size: usize,
    pub max_row_group_size: usize,
    /// Base seed; each file derives its own seed from this and its row count.
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Defaults for `format`: its sample directory and the standard row counts.
    pub fn for_format(format: DatasetFormat) -> Self {
        Self {
            output_dir: PathBuf::from(format.default_output_dir()),
            row_counts: DEFAULT_ROW_COUNTS.to_vec(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_row_group_size: DEFAULT_MAX_ROW_GROUP_SIZE,
            seed: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_row_counts(mut self, row_counts: Vec<usize>) -> Self {
        self.row_counts = row_counts;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_row_group_size(mut self, max_row_group_size: usize) -> Self {
        self.max_row_group_size = max_row_group_size;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> BenchResult<()> {
        if self.batch_size == 0 {
            return Err(BenchError::Configuration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_row_group_size == 0 {
            return Err(BenchError::Configuration(
                "max_row_group_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// File name for a dataset of `num_rows` rows, e.g. `sample_4M_rows.csv`.
///
/// Row counts that are not whole millions fall back to a `K` suffix or the
/// plain count, so small fixtures never share a name.
pub fn dataset_file_name(num_rows: usize, format: DatasetFormat) -> String {
    let size = if num_rows > 0 && num_rows % 1_000_000 == 0 {
        format!("{}M", num_rows / 1_000_000)
    } else if num_rows > 0 && num_rows % 1_000 == 0 {
        format!("{}K", num_rows / 1_000)
    } else {
        num_rows.to_string()
    };
    format!("sample_{}_rows.{}", size, format.extension())
}

/// Destination for generated batches.
pub trait RecordBatchSink {
    fn write(&mut self, batch: &RecordBatch) -> BenchResult<()>;

    /// Flush and close the underlying file.
    fn finish(self: Box<Self>) -> BenchResult<()>;
}

/// CSV with a header row.
pub struct CsvSink {
    writer: arrow::csv::Writer<BufWriter<File>>,
}

impl CsvSink {
    pub fn create(path: &Path) -> BenchResult<Self> {
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        let writer = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(BufWriter::new(file));
        Ok(Self { writer })
    }
}

impl RecordBatchSink for CsvSink {
    fn write(&mut self, batch: &RecordBatch) -> BenchResult<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> BenchResult<()> {
        let mut inner = self.writer.into_inner();
        inner
            .flush()
            .map_err(|e| BenchError::Io(format!("Failed to flush CSV output: {}", e)))
    }
}

/// Parquet with default encoding.
pub struct ParquetSink {
    writer: ArrowWriter<File>,
}

impl ParquetSink {
    pub fn create(path: &Path, schema: SchemaRef, max_row_group_size: usize) -> BenchResult<Self> {
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        let props = WriterProperties::builder()
            .set_max_row_group_size(max_row_group_size)
            .build();
        let writer = ArrowWriter::try_new(file, schema, Some(props))?;
        Ok(Self { writer })
    }
}

impl RecordBatchSink for ParquetSink {
    fn write(&mut self, batch: &RecordBatch) -> BenchResult<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> BenchResult<()> {
        self.writer.close()?;
        Ok(())
    }
}

/// A dataset file written by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub num_rows: usize,
    pub bytes: u64,
}

/// Writes synthetic datasets for a list of row counts.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    format: DatasetFormat,
    config: GeneratorConfig,
}

impl DatasetGenerator {
    pub fn new(format: DatasetFormat, config: GeneratorConfig) -> Self {
        Self { format, config }
    }

    pub fn format(&self) -> DatasetFormat {
        self.format
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Write one file per configured row count.
    ///
    /// The output directory is created first if it does not exist.
    pub fn generate(&self) -> BenchResult<Vec<GeneratedFile>> {
        self.config.validate()?;
        self.ensure_output_dir()?;

        let mut files = Vec::with_capacity(self.config.row_counts.len());
        for &num_rows in &self.config.row_counts {
            files.push(self.write_file(num_rows)?);
        }

        info!(
            "All {} files saved in directory: {}",
            self.format.extension().to_uppercase(),
            self.config.output_dir.display()
        );
        Ok(files)
    }

    /// Write a single file of `num_rows` rows.
    pub fn generate_file(&self, num_rows: usize) -> BenchResult<GeneratedFile> {
        self.config.validate()?;
        self.ensure_output_dir()?;
        self.write_file(num_rows)
    }

    fn ensure_output_dir(&self) -> BenchResult<()> {
        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BenchError::io(&self.config.output_dir, e))
    }

    fn write_file(&self, num_rows: usize) -> BenchResult<GeneratedFile> {
        info!("Generating {} rows...", num_rows);

        let path = self
            .config
            .output_dir
            .join(dataset_file_name(num_rows, self.format));

        let batches = match self.config.seed {
            Some(seed) => RecordBatchGenerator::with_seed(
                num_rows,
                self.config.batch_size,
                seed.wrapping_add(num_rows as u64),
            ),
            None => RecordBatchGenerator::new(num_rows, self.config.batch_size),
        };

        let mut sink = self.open_sink(&path, batches.schema())?;
        for batch in batches {
            let batch = batch?;
            debug!("Writing batch of {} rows to {}", batch.num_rows(), path.display());
            sink.write(&batch)?;
        }
        sink.finish()?;

        let bytes = std::fs::metadata(&path)
            .map_err(|e| BenchError::io(&path, e))?
            .len();
        info!("Saved: {}", path.display());

        Ok(GeneratedFile {
            path,
            num_rows,
            bytes,
        })
    }

    fn open_sink(&self, path: &Path, schema: SchemaRef) -> BenchResult<Box<dyn RecordBatchSink>> {
        match self.format {
            DatasetFormat::Csv => Ok(Box::new(CsvSink::create(path)?)),
            DatasetFormat::Parquet => Ok(Box::new(ParquetSink::create(
                path,
                schema,
                self.config.max_row_group_size,
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    #[test]
    fn test_dataset_file_names() {
        assert_eq!(
            dataset_file_name(1_000_000, DatasetFormat::Csv),
            "sample_1M_rows.csv"
        );
        assert_eq!(
            dataset_file_name(10_000_000, DatasetFormat::Parquet),
            "sample_10M_rows.parquet"
        );
        assert_eq!(
            dataset_file_name(5_000, DatasetFormat::Csv),
            "sample_5K_rows.csv"
        );
        assert_eq!(
            dataset_file_name(123, DatasetFormat::Csv),
            "sample_123_rows.csv"
        );
        assert_eq!(dataset_file_name(0, DatasetFormat::Csv), "sample_0_rows.csv");
    }

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::for_format(DatasetFormat::Parquet);
        assert_eq!(config.output_dir, PathBuf::from("sample_parquet_data"));
        assert_eq!(
            config.row_counts,
            vec![1_000_000, 2_000_000, 4_000_000, 6_000_000, 8_000_000, 10_000_000]
        );
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = GeneratorConfig::for_format(DatasetFormat::Csv)
            .with_output_dir(temp_dir.path())
            .with_batch_size(0);
        let result = DatasetGenerator::new(DatasetFormat::Csv, config).generate_file(10);
        assert!(matches!(result, Err(BenchError::Configuration(_))));
    }

    #[test]
    #[traced_test]
    fn test_generate_logs_progress() {
        let temp_dir = TempDir::new().unwrap();
        let config = GeneratorConfig::for_format(DatasetFormat::Csv)
            .with_output_dir(temp_dir.path())
            .with_row_counts(vec![10, 20])
            .with_seed(Some(5));

        let files = DatasetGenerator::new(DatasetFormat::Csv, config)
            .generate()
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(logs_contain("Generating 10 rows..."));
        assert!(logs_contain("Generating 20 rows..."));
        assert!(logs_contain("Saved:"));
        assert!(logs_contain("All CSV files saved in directory"));
    }

    #[test]
    fn test_seeded_files_are_reproducible() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        for dir in [&first, &second] {
            let config = GeneratorConfig::for_format(DatasetFormat::Csv)
                .with_output_dir(dir.path())
                .with_seed(Some(11));
            DatasetGenerator::new(DatasetFormat::Csv, config)
                .generate_file(250)
                .unwrap();
        }

        let a = std::fs::read_to_string(first.path().join("sample_250_rows.csv")).unwrap();
        let b = std::fs::read_to_string(second.path().join("sample_250_rows.csv")).unwrap();
        assert_eq!(a, b);
    }
}
