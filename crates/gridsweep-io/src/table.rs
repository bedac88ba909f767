//! Semicolon-delimited CSV training-table reader with full input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::TrainingTable;

/// Reads a classification training table from a semicolon-delimited CSV file.
///
/// Expected format:
/// - Header row required: `feature1;feature2;...;featureN;label`
/// - All columns except the last are numeric features; the last column is
///   the class label (any non-empty string)
/// - One row per sample, all rows must have the same number of columns
///
/// Distinct label strings are encoded to contiguous zero-based class
/// indices in sorted order.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoFeatureColumns`] | Fewer than two columns in the header |
/// | [`IoError::EmptyTable`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
/// | [`IoError::EmptyLabel`] | Label cell is empty |
pub struct TrainingTableReader {
    path: PathBuf,
}

impl TrainingTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`TrainingTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<TrainingTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) allows rows with varying column counts so that our
        // own InconsistentRowLength check fires instead of a low-level
        // CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        // Need at least one feature column plus the trailing label column.
        if expected_cols < 2 {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }
        let n_features = expected_cols - 1;
        let feature_names: Vec<String> = header.iter().take(n_features).map(String::from).collect();

        let mut features = Vec::new();
        let mut raw_labels: Vec<String> = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(n_features);
            for col_index in 0..n_features {
                let raw = record.get(col_index).unwrap_or("");
                let value: f64 = raw.parse().map_err(|_| IoError::NonFiniteValue {
                    path: self.path.clone(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    });
                }
                row.push(value);
            }

            let label = record.get(n_features).unwrap_or("").to_string();
            if label.is_empty() {
                return Err(IoError::EmptyLabel {
                    path: self.path.clone(),
                    row_index,
                });
            }

            features.push(row);
            raw_labels.push(label);
        }

        if features.is_empty() {
            return Err(IoError::EmptyTable {
                path: self.path.clone(),
            });
        }

        // Encode distinct label strings to class indices in sorted order.
        let mut class_names: Vec<String> = raw_labels.clone();
        class_names.sort_unstable();
        class_names.dedup();
        let labels: Vec<usize> = raw_labels
            .iter()
            .map(|l| {
                class_names
                    .binary_search(l)
                    .expect("every label is in the sorted distinct set")
            })
            .collect();

        info!(
            n_samples = features.len(),
            n_features,
            n_classes = class_names.len(),
            "training table loaded"
        );

        Ok(TrainingTable::new(feature_names, class_names, features, labels))
    }
}
