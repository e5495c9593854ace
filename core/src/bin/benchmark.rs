//! Time a read, identity query and write round trip on the query engine.
//!
//! ```bash
//! cargo run --release --bin benchmark -- \
//!     --input_path s3://bucket/sample_csv_data/sample_1M_rows.csv \
//!     --output_path s3://bucket/output/ \
//!     --file_format csv
//! ```

use clap::Parser;
use tabbench_common::init_tracing;
use tabbench_core::{BenchmarkJob, EngineConfig, FileFormat};

#[derive(Parser, Debug)]
#[command(name = "benchmark", about = "Query engine performance benchmark")]
struct Args {
    /// Path or URL of the input dataset.
    #[arg(long = "input_path")]
    input_path: String,

    /// Path or URL the result is written to. Existing content is replaced.
    #[arg(long = "output_path")]
    output_path: String,

    /// Format of the input dataset.
    #[arg(long = "file_format", value_enum, ignore_case = true, default_value_t = FileFormat::Csv)]
    file_format: FileFormat,

    #[arg(long = "target_partitions")]
    target_partitions: Option<usize>,

    #[arg(long = "batch_size")]
    batch_size: Option<usize>,

    /// Memory pool size in bytes.
    #[arg(long = "memory_limit")]
    memory_limit: Option<usize>,

    /// Also print the run report as a JSON line.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default().with_memory_limit(self.memory_limit);
        if let Some(target_partitions) = self.target_partitions {
            config = config.with_target_partitions(target_partitions);
        }
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let job = BenchmarkJob::new(&args.input_path, &args.output_path, args.file_format)?
        .with_engine_config(args.engine_config());
    let report = job.run().await?;

    println!("{}", report.summary_line());
    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
