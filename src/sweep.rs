//! The sweep driver: load table, enumerate parameter files, evaluate, append.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use gridsweep_io::{ParamSet, ResultAppender, TrainingTableReader, list_param_files};
use gridsweep_rf::{CrossValidation, MaxFeatures, RandomForestConfig};

/// Explicit configuration for one sweep run.
///
/// All paths are caller-supplied; nothing is hardcoded. Under the original
/// per-stage invocation model the caller passes the mounted pipeline paths,
/// e.g. `/pfs/training/training.csv`, `/pfs/filter`, `/pfs/out/results.csv`.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Path to the semicolon-delimited training table.
    pub training_path: PathBuf,
    /// Directory holding one JSON parameter file per set to evaluate.
    pub param_dir: PathBuf,
    /// Shared append-only output file.
    pub output_path: PathBuf,
    /// Number of cross-validation folds.
    pub cv_folds: usize,
    /// Seed for fold shuffling and forest randomness.
    pub seed: u64,
    /// When true, a parameter file that fails to parse is logged and
    /// skipped instead of aborting the run. Off by default: one bad file
    /// stops the whole sweep.
    pub skip_invalid: bool,
}

impl SweepConfig {
    /// Create a config with the default fold count (10), seed (42), and
    /// fail-fast behavior.
    pub fn new(training_path: &Path, param_dir: &Path, output_path: &Path) -> Self {
        Self {
            training_path: training_path.to_path_buf(),
            param_dir: param_dir.to_path_buf(),
            output_path: output_path.to_path_buf(),
            cv_folds: 10,
            seed: 42,
            skip_invalid: false,
        }
    }

    /// Set the number of cross-validation folds.
    #[must_use]
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable skipping of unparseable parameter files.
    #[must_use]
    pub fn with_skip_invalid(mut self, skip_invalid: bool) -> Self {
        self.skip_invalid = skip_invalid;
        self
    }
}

/// One evaluated parameter set.
#[derive(Debug, Serialize)]
pub struct SweepRecord {
    /// File name of the parameter set.
    pub file: String,
    /// Number of trees trained.
    pub n_estimators: usize,
    /// Features considered per split.
    pub max_features: usize,
    /// Mean cross-validation accuracy.
    pub mean_accuracy: f64,
    /// Standard deviation of the fold accuracies.
    pub std_accuracy: f64,
}

/// Summary of one sweep run, printed as JSON by the CLI.
#[derive(Debug, Serialize)]
pub struct SweepSummary {
    /// Rows in the training table.
    pub n_samples: usize,
    /// Feature columns in the training table.
    pub n_features: usize,
    /// Distinct classes in the label column.
    pub n_classes: usize,
    /// Cross-validation folds used.
    pub cv_folds: usize,
    /// Seed used for all randomness.
    pub seed: u64,
    /// Parameter sets evaluated.
    pub n_evaluated: usize,
    /// Parameter files skipped (only with `skip_invalid`).
    pub n_skipped: usize,
    /// Per-set results, in evaluation order.
    pub records: Vec<SweepRecord>,
}

/// Run one sweep: evaluate every parameter file against the training table
/// and append one result line per set to the output file.
///
/// Parameter files are processed strictly sequentially, in directory
/// enumeration order. Any error aborts the run immediately — already
/// appended lines stay in the output file.
#[instrument(skip_all, fields(params = %config.param_dir.display()))]
pub fn run(config: &SweepConfig) -> Result<SweepSummary> {
    let table = TrainingTableReader::new(&config.training_path)
        .read()
        .context("failed to read training table")?;
    info!(
        n_samples = table.n_samples(),
        n_features = table.n_features(),
        n_classes = table.n_classes(),
        "training table loaded"
    );

    let param_files =
        list_param_files(&config.param_dir).context("failed to list parameter files")?;
    info!(n_files = param_files.len(), "parameter files enumerated");

    let appender = ResultAppender::new(&config.output_path);

    let mut records = Vec::with_capacity(param_files.len());
    let mut n_skipped = 0usize;

    for path in &param_files {
        let params = match ParamSet::from_file(path) {
            Ok(p) => p,
            Err(e) if config.skip_invalid => {
                warn!(path = %path.display(), error = %e, "skipping invalid parameter file");
                n_skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to parse parameter file {}", path.display())
                });
            }
        };

        // All other hyperparameters stay at their defaults.
        let rf_config = RandomForestConfig::new(params.n_estimators())
            .with_context(|| format!("invalid n_estimators in {}", path.display()))?
            .with_max_features(MaxFeatures::Fixed(params.max_features()))
            .with_seed(config.seed);

        let cv = CrossValidation::new(config.cv_folds)
            .context("invalid fold count")?
            .with_seed(config.seed);

        let result = cv
            .evaluate(&rf_config, table.features(), table.labels())
            .with_context(|| format!("cross-validation failed for {}", path.display()))?;

        appender
            .append(params.raw(), result.mean_accuracy)
            .context("failed to append result line")?;

        let file = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        info!(
            file,
            n_estimators = params.n_estimators(),
            max_features = params.max_features(),
            mean_accuracy = result.mean_accuracy,
            std_accuracy = result.std_accuracy,
            "parameter set evaluated"
        );

        records.push(SweepRecord {
            file,
            n_estimators: params.n_estimators(),
            max_features: params.max_features(),
            mean_accuracy: result.mean_accuracy,
            std_accuracy: result.std_accuracy,
        });
    }

    info!(
        n_evaluated = records.len(),
        n_skipped, "sweep complete"
    );

    Ok(SweepSummary {
        n_samples: table.n_samples(),
        n_features: table.n_features(),
        n_classes: table.n_classes(),
        cv_folds: config.cv_folds,
        seed: config.seed,
        n_evaluated: records.len(),
        n_skipped,
        records,
    })
}
