//! Append-only result writer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::IoError;

/// Appends sweep result lines to a shared output file.
///
/// Each line has the form `<raw parameter text, trailing newlines
/// stripped>, <mean accuracy>`. The file is opened in create-or-append
/// mode per write and never truncated — repeated runs accumulate lines.
/// Writes are strictly sequential; there is no locking.
pub struct ResultAppender {
    path: PathBuf,
}

impl ResultAppender {
    /// Create an appender targeting the given output file.
    ///
    /// The file itself is created lazily on the first append.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Return the output file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result line for an evaluated parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::AppendResult`] when the file cannot be opened
    /// or written.
    #[instrument(skip(self, raw_params), fields(path = %self.path.display()))]
    pub fn append(&self, raw_params: &str, mean_accuracy: f64) -> Result<(), IoError> {
        let line = format!("{}, {}\n", raw_params.trim_end_matches('\n'), mean_accuracy);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| IoError::AppendResult {
                path: self.path.clone(),
                source: e,
            })?;
        file.write_all(line.as_bytes())
            .map_err(|e| IoError::AppendResult {
                path: self.path.clone(),
                source: e,
            })?;

        debug!(mean_accuracy, "result line appended");
        Ok(())
    }
}
