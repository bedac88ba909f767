//! I/O error types for gridsweep-io.

use std::path::PathBuf;

/// Errors from file I/O, CSV parsing, parameter files, and result output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the training table contains a header but zero data rows.
    #[error("empty training table (no data rows) in {path}")]
    EmptyTable {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the training table has fewer than two columns.
    #[error("training table {path} needs at least one feature column and a label column")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a feature cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when a label cell is empty.
    #[error("empty label in {path}: row {row_index}")]
    EmptyLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when the parameter directory cannot be enumerated.
    #[error("cannot list parameter directory {path}")]
    ParamDirRead {
        /// Path to the directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a parameter file is not valid JSON.
    #[error("invalid JSON in parameter file {path}")]
    ParamParse {
        /// Path to the parameter file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a parameter file holds something other than a JSON object.
    #[error("parameter file {path} must contain a JSON object")]
    ParamNotObject {
        /// Path to the parameter file.
        path: PathBuf,
    },

    /// Returned when a required parameter key is absent.
    #[error("parameter file {path} is missing required key \"{key}\"")]
    MissingParamKey {
        /// Path to the parameter file.
        path: PathBuf,
        /// The missing key.
        key: String,
    },

    /// Returned when a parameter value cannot be coerced to a non-negative integer.
    #[error("parameter \"{key}\" in {path} is not an integer: {raw}")]
    InvalidParamValue {
        /// Path to the parameter file.
        path: PathBuf,
        /// The offending key.
        key: String,
        /// The raw JSON value.
        raw: String,
    },

    /// Returned when appending to the result file fails.
    #[error("cannot append to result file {path}")]
    AppendResult {
        /// Path to the result file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the ranges file is not a valid JSON array of ranges.
    #[error("invalid ranges file {path}")]
    RangesParse {
        /// Path to the ranges file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a range has a non-positive increment.
    #[error("range \"{name}\" has non-positive increment {increment}")]
    InvalidIncrement {
        /// Name of the offending range.
        name: String,
        /// The invalid increment.
        increment: f64,
    },

    /// Returned when a range has min greater than max.
    #[error("range \"{name}\" has min {min} greater than max {max}")]
    InvalidBounds {
        /// Name of the offending range.
        name: String,
        /// The range minimum.
        min: f64,
        /// The range maximum.
        max: f64,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
