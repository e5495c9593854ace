//! Write the synthetic Parquet datasets used by the benchmark.
//!
//! ```bash
//! cargo run --release --bin generate-parquet -- [OUTPUT_DIR]
//! ```

use clap::Parser;
use std::path::PathBuf;
use tabbench_common::init_tracing;
use tabbench_core::{DatasetFormat, DatasetGenerator, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "generate-parquet", about = "Generate sample Parquet datasets (1M to 10M rows)")]
struct Args {
    /// Directory the Parquet files are written to.
    #[arg(default_value = "sample_parquet_data")]
    output_dir: PathBuf,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = GeneratorConfig::for_format(DatasetFormat::Parquet)
        .with_output_dir(args.output_dir)
        .with_seed(args.seed);

    for file in DatasetGenerator::new(DatasetFormat::Parquet, config).generate()? {
        println!("{}", file.path.display());
    }
    Ok(())
}
