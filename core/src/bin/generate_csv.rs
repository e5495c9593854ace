//! Write the synthetic CSV datasets used by the benchmark.
//!
//! ```bash
//! cargo run --release --bin generate-csv -- [OUTPUT_DIR]
//! ```

use clap::Parser;
use std::path::PathBuf;
use tabbench_common::init_tracing;
use tabbench_core::{DatasetFormat, DatasetGenerator, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "generate-csv", about = "Generate sample CSV datasets (1M to 10M rows)")]
struct Args {
    /// Directory the CSV files are written to.
    #[arg(default_value = "sample_csv_data")]
    output_dir: PathBuf,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = GeneratorConfig::for_format(DatasetFormat::Csv)
        .with_output_dir(args.output_dir)
        .with_seed(args.seed);

    for file in DatasetGenerator::new(DatasetFormat::Csv, config).generate()? {
        println!("{}", file.path.display());
    }
    Ok(())
}
