use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use gridsweep::sweep::{self, SweepConfig};
use gridsweep_io::{ParamGrid, write_combos};

#[derive(Parser)]
#[command(name = "gridsweep")]
#[command(about = "Random Forest hyperparameter sweep worker for data-pipeline stages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel tree training (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate every parameter file against the training table via
    /// cross-validation, appending one result line per set
    Sweep {
        /// Path to the semicolon-delimited training table CSV
        #[arg(long)]
        training: PathBuf,

        /// Directory of JSON parameter files to evaluate
        #[arg(long)]
        params: PathBuf,

        /// Append-only output file for result lines
        #[arg(long)]
        out: PathBuf,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 10)]
        folds: usize,

        /// Log and skip unparseable parameter files instead of aborting
        #[arg(long, default_value_t = false)]
        skip_invalid: bool,
    },

    /// Expand a JSON ranges file into one parameter file per combination
    Expand {
        /// Path to the ranges file (JSON array of name/min/max/increment)
        #[arg(long)]
        ranges: PathBuf,

        /// Directory to write the generated parameter files into
        #[arg(long)]
        out_dir: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExpandOutput {
    n_ranges: usize,
    n_combos: usize,
    out_dir: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Sweep {
            training,
            params,
            out,
            folds,
            skip_invalid,
        } => {
            let config = SweepConfig::new(&training, &params, &out)
                .with_cv_folds(folds)
                .with_seed(cli.seed)
                .with_skip_invalid(skip_invalid);

            let summary = sweep::run(&config).context("sweep failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Expand { ranges, out_dir } => {
            let grid = ParamGrid::from_file(&ranges)
                .context("failed to read ranges file")?;
            let combos = grid.expand();
            info!(
                n_ranges = grid.ranges().len(),
                n_combos = combos.len(),
                "grid expanded"
            );

            write_combos(&out_dir, &combos).context("failed to write parameter files")?;

            let output = ExpandOutput {
                n_ranges: grid.ranges().len(),
                n_combos: combos.len(),
                out_dir: out_dir.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
