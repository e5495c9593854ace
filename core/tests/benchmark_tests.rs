//! End-to-end tests for the benchmark job
//!
//! A small fixture is generated, passed through the identity query, and the
//! written output is compared with the input row by row.

mod common;

use common::*;
use tabbench_core::{BenchError, BenchmarkJob, DatasetFormat, EngineConfig, FileFormat};
use tempfile::TempDir;

fn small_engine() -> EngineConfig {
    EngineConfig::default().with_target_partitions(2)
}

#[tokio::test]
async fn test_csv_round_trip_preserves_rows() {
    let temp_dir = TempDir::new().unwrap();
    let input = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 500, 10);
    let output = temp_dir.path().join("output");

    let job = BenchmarkJob::new(
        input.path.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Csv,
    )
    .unwrap()
    .with_engine_config(small_engine());
    let report = job.run().await.unwrap();

    assert_eq!(report.rows_written, 500);
    assert_eq!(report.file_format, FileFormat::Csv);
    assert!(report.execution_time_secs() >= 0.0);
    assert!(report.summary_line().starts_with("Script Execution Time: "));
    assert!(report.summary_line().ends_with(" seconds"));

    let expected = read_rows(input.path.to_str().unwrap(), FileFormat::Csv).await;
    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(actual.len(), 500);
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_parquet_input_written_as_csv() {
    let temp_dir = TempDir::new().unwrap();
    let input = generate_fixture(DatasetFormat::Parquet, temp_dir.path(), 300, 20);
    let output = temp_dir.path().join("parquet_output");

    let job = BenchmarkJob::from_args(
        input.path.to_str().unwrap(),
        output.to_str().unwrap(),
        "parquet",
    )
    .unwrap()
    .with_engine_config(small_engine());
    let report = job.run().await.unwrap();
    assert_eq!(report.rows_written, 300);

    let expected = read_rows(input.path.to_str().unwrap(), FileFormat::Parquet).await;
    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_second_run_overwrites_output() {
    let temp_dir = TempDir::new().unwrap();
    let large = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 200, 30);
    let small = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 50, 31);
    let output = temp_dir.path().join("shared_output");

    for input in [&large, &small] {
        BenchmarkJob::new(
            input.path.to_str().unwrap(),
            output.to_str().unwrap(),
            FileFormat::Csv,
        )
        .unwrap()
        .with_engine_config(small_engine())
        .run()
        .await
        .unwrap();
    }

    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    let expected = read_rows(small.path.to_str().unwrap(), FileFormat::Csv).await;
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_overwrite_removes_stale_files() {
    let temp_dir = TempDir::new().unwrap();
    let input = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 40, 40);
    let output = temp_dir.path().join("stale_output");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("leftover.csv"), "id,value,category\n999,0.5,A\n").unwrap();

    BenchmarkJob::new(
        input.path.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Csv,
    )
    .unwrap()
    .with_engine_config(small_engine())
    .run()
    .await
    .unwrap();

    assert!(!output.join("leftover.csv").exists());
    let rows = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(rows.len(), 40);
    assert!(rows.iter().all(|row| row.0 != 999));
}

#[tokio::test]
async fn test_output_containing_input_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    let input = generate_fixture(DatasetFormat::Csv, &out, 20, 45);

    for output in [out.clone(), input.path.clone()] {
        let result = BenchmarkJob::new(
            input.path.to_str().unwrap(),
            output.to_str().unwrap(),
            FileFormat::Csv,
        )
        .unwrap()
        .with_engine_config(small_engine())
        .run()
        .await;

        match result {
            Err(BenchError::Configuration(message)) => {
                assert!(message.contains("also being read from"));
            }
            other => panic!("expected Configuration error, got {:?}", other.map(|_| ())),
        }
        assert!(input.path.exists());
    }
}

#[tokio::test]
async fn test_existing_file_at_output_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let input = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 25, 46);
    let output = temp_dir.path().join("result.csv");
    std::fs::write(&output, "stale\n").unwrap();

    let report = BenchmarkJob::new(
        input.path.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Csv,
    )
    .unwrap()
    .with_engine_config(small_engine())
    .run()
    .await
    .unwrap();

    assert_eq!(report.rows_written, 25);
    assert!(output.is_dir());
    let expected = read_rows(input.path.to_str().unwrap(), FileFormat::Csv).await;
    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_input_file_without_extension() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = generate_fixture(DatasetFormat::Parquet, temp_dir.path(), 80, 47);
    let input = temp_dir.path().join("dataset");
    std::fs::copy(&fixture.path, &input).unwrap();
    let output = temp_dir.path().join("bare_output");

    let report = BenchmarkJob::new(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Parquet,
    )
    .unwrap()
    .with_engine_config(small_engine())
    .run()
    .await
    .unwrap();

    assert_eq!(report.rows_written, 80);
    let expected = read_rows(fixture.path.to_str().unwrap(), FileFormat::Parquet).await;
    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_directory_input_with_dotted_name() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("runs.v2");
    let first = generate_fixture(DatasetFormat::Csv, &input_dir, 30, 48);
    let second = generate_fixture(DatasetFormat::Csv, &input_dir, 40, 49);
    std::fs::write(input_dir.join("_SUCCESS"), "").unwrap();
    let output = temp_dir.path().join("dir_output");

    let report = BenchmarkJob::new(
        input_dir.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Csv,
    )
    .unwrap()
    .with_engine_config(small_engine())
    .run()
    .await
    .unwrap();

    assert_eq!(report.rows_written, 70);
    let mut expected = read_rows(first.path.to_str().unwrap(), FileFormat::Csv).await;
    expected.extend(read_rows(second.path.to_str().unwrap(), FileFormat::Csv).await);
    sort_rows(&mut expected);
    let actual = read_rows(&dir_path(&output), FileFormat::Csv).await;
    assert_eq!(actual, expected);
}

#[test]
fn test_unsupported_format_rejected() {
    let result = BenchmarkJob::from_args("input.json", "output", "json");
    match result {
        Err(err @ BenchError::UnsupportedFormat(_)) => {
            assert_eq!(
                err.to_string(),
                "Unsupported file format 'json'. Please use 'csv' or 'parquet'."
            );
        }
        other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_invalid_engine_config_fails_before_io() {
    let temp_dir = TempDir::new().unwrap();
    let input = generate_fixture(DatasetFormat::Csv, temp_dir.path(), 10, 50);
    let output = temp_dir.path().join("never_written");

    let result = BenchmarkJob::new(
        input.path.to_str().unwrap(),
        output.to_str().unwrap(),
        FileFormat::Csv,
    )
    .unwrap()
    .with_engine_config(EngineConfig::default().with_batch_size(0))
    .run()
    .await;

    assert!(matches!(result, Err(BenchError::Configuration(_))));
    assert!(!output.exists());
}
