//! Common test utilities and helpers for integration tests

use datafusion::arrow::array::{Array, AsArray};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Float64Type, Int64Type};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionContext};
use std::path::Path;
use tabbench_core::{DatasetFormat, DatasetGenerator, FileFormat, GeneratedFile, GeneratorConfig};

/// One `(id, value, category)` row.
pub type Row = (i64, f64, String);

/// Write a single seeded dataset of `num_rows` rows into `dir`.
pub fn generate_fixture(
    format: DatasetFormat,
    dir: &Path,
    num_rows: usize,
    seed: u64,
) -> GeneratedFile {
    let config = GeneratorConfig::for_format(format)
        .with_output_dir(dir)
        .with_batch_size(97)
        .with_seed(Some(seed));
    DatasetGenerator::new(format, config)
        .generate_file(num_rows)
        .expect("fixture generation should succeed")
}

/// Flatten batches into rows, casting so Utf8View or Int32 inference
/// does not matter.
pub fn rows_from_batches(batches: &[RecordBatch]) -> Vec<Row> {
    let mut rows = Vec::new();
    for batch in batches {
        let column = |name: &str, data_type: &DataType| {
            let array = batch
                .column_by_name(name)
                .unwrap_or_else(|| panic!("missing column {}", name));
            cast(array, data_type).unwrap()
        };
        let ids = column("id", &DataType::Int64);
        let values = column("value", &DataType::Float64);
        let categories = column("category", &DataType::Utf8);

        let ids = ids.as_primitive::<Int64Type>();
        let values = values.as_primitive::<Float64Type>();
        let categories = categories.as_string::<i32>();
        for i in 0..batch.num_rows() {
            assert!(!ids.is_null(i) && !values.is_null(i) && !categories.is_null(i));
            rows.push((ids.value(i), values.value(i), categories.value(i).to_string()));
        }
    }
    sort_rows(&mut rows);
    rows
}

/// Order rows by id, breaking ties on the remaining columns.
pub fn sort_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
}

/// Read a dataset (a file, or a directory path ending in `/`) sorted by id.
pub async fn read_rows(path: &str, format: FileFormat) -> Vec<Row> {
    let ctx = SessionContext::new();
    let frame = match format {
        FileFormat::Csv => ctx
            .read_csv(path, CsvReadOptions::new().has_header(true))
            .await
            .unwrap(),
        FileFormat::Parquet => ctx
            .read_parquet(path, ParquetReadOptions::default())
            .await
            .unwrap(),
    };
    rows_from_batches(&frame.collect().await.unwrap())
}

/// `path` as a string with a trailing separator.
pub fn dir_path(path: &Path) -> String {
    let mut raw = path.to_str().unwrap().to_string();
    if !raw.ends_with(std::path::MAIN_SEPARATOR) {
        raw.push(std::path::MAIN_SEPARATOR);
    }
    raw
}
