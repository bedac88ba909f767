//! Parameter-set file enumeration and parsing.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::IoError;

/// One parsed hyperparameter set.
///
/// The raw file text is kept verbatim so the result line can echo the
/// original parameter JSON exactly as it arrived.
#[derive(Debug, Clone)]
pub struct ParamSet {
    raw: String,
    n_estimators: usize,
    max_features: usize,
    path: PathBuf,
}

impl ParamSet {
    /// Read and parse one parameter file.
    ///
    /// The file must contain a JSON object with at least the keys
    /// `n_estimators` and `max_features`. Values may be JSON integers,
    /// floats (truncated), or numeric strings — the upstream stage has
    /// historically emitted both numbers and strings. Extra keys are
    /// ignored.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File cannot be read |
    /// | [`IoError::ParamParse`] | Contents are not valid JSON |
    /// | [`IoError::ParamNotObject`] | Top-level value is not an object |
    /// | [`IoError::MissingParamKey`] | A required key is absent |
    /// | [`IoError::InvalidParamValue`] | A value cannot be coerced to an integer |
    #[instrument(fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, IoError> {
        let raw = std::fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: Value = serde_json::from_str(&raw).map_err(|e| IoError::ParamParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let object = value.as_object().ok_or_else(|| IoError::ParamNotObject {
            path: path.to_path_buf(),
        })?;

        let n_estimators = require_usize(object, "n_estimators", path)?;
        let max_features = require_usize(object, "max_features", path)?;

        debug!(n_estimators, max_features, "parameter set parsed");

        Ok(Self {
            raw,
            n_estimators,
            max_features,
            path: path.to_path_buf(),
        })
    }

    /// Return the raw file text, exactly as read.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Return the number of trees to train.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Return the number of features to consider per split.
    #[must_use]
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Return the path this set was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Look up `key` in the object and coerce it to a non-negative integer.
fn require_usize(
    object: &serde_json::Map<String, Value>,
    key: &str,
    path: &Path,
) -> Result<usize, IoError> {
    let value = object.get(key).ok_or_else(|| IoError::MissingParamKey {
        path: path.to_path_buf(),
        key: key.to_string(),
    })?;
    coerce_usize(value).ok_or_else(|| IoError::InvalidParamValue {
        path: path.to_path_buf(),
        key: key.to_string(),
        raw: value.to_string(),
    })
}

/// Coerce a JSON value to a non-negative integer: integers pass through,
/// finite non-negative floats are truncated, strings are parsed.
fn coerce_usize(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v as usize)
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as usize)
            }),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

/// List the regular files in a parameter directory.
///
/// Subdirectories are skipped; symlinks are followed, so a symlink to a
/// file counts. Entries are returned in whatever order the directory
/// enumeration yields them — deliberately not sorted, matching the
/// sweep's documented iteration order.
///
/// # Errors
///
/// Returns [`IoError::ParamDirRead`] when the directory or one of its
/// entries cannot be inspected.
#[instrument(fields(dir = %dir.display()))]
pub fn list_param_files(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::ParamDirRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::ParamDirRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let metadata = std::fs::metadata(&path).map_err(|e| IoError::ParamDirRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if metadata.is_file() {
            files.push(path);
        }
    }

    debug!(n_files = files.len(), "parameter directory listed");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_param_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn parses_integer_values() {
        let f = write_param_file(r#"{"n_estimators": 25, "max_features": 3}"#);
        let params = ParamSet::from_file(f.path()).unwrap();
        assert_eq!(params.n_estimators(), 25);
        assert_eq!(params.max_features(), 3);
    }

    #[test]
    fn coerces_string_values() {
        let f = write_param_file(r#"{"n_estimators": "10", "max_features": "1"}"#);
        let params = ParamSet::from_file(f.path()).unwrap();
        assert_eq!(params.n_estimators(), 10);
        assert_eq!(params.max_features(), 1);
    }

    #[test]
    fn truncates_float_values() {
        let f = write_param_file(r#"{"n_estimators": 10.0, "max_features": 2.9}"#);
        let params = ParamSet::from_file(f.path()).unwrap();
        assert_eq!(params.n_estimators(), 10);
        assert_eq!(params.max_features(), 2);
    }

    #[test]
    fn extra_keys_ignored() {
        let f = write_param_file(
            r#"{"n_estimators": 5, "max_features": 1, "criterion": "gini", "note": null}"#,
        );
        let params = ParamSet::from_file(f.path()).unwrap();
        assert_eq!(params.n_estimators(), 5);
    }

    #[test]
    fn raw_text_preserved_verbatim() {
        let content = "{\"n_estimators\": \"10\", \"max_features\": \"1\"}\n";
        let f = write_param_file(content);
        let params = ParamSet::from_file(f.path()).unwrap();
        assert_eq!(params.raw(), content);
    }

    #[test]
    fn error_missing_key() {
        let f = write_param_file(r#"{"max_features": 1}"#);
        let err = ParamSet::from_file(f.path()).unwrap_err();
        assert!(
            matches!(err, IoError::MissingParamKey { ref key, .. } if key == "n_estimators"),
            "got: {err:?}"
        );
    }

    #[test]
    fn error_invalid_json() {
        let f = write_param_file("not json at all");
        let err = ParamSet::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::ParamParse { .. }));
    }

    #[test]
    fn error_not_an_object() {
        let f = write_param_file("[1, 2, 3]");
        let err = ParamSet::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::ParamNotObject { .. }));
    }

    #[test]
    fn error_non_numeric_value() {
        let f = write_param_file(r#"{"n_estimators": true, "max_features": 1}"#);
        let err = ParamSet::from_file(f.path()).unwrap_err();
        assert!(
            matches!(err, IoError::InvalidParamValue { ref key, .. } if key == "n_estimators")
        );
    }

    #[test]
    fn error_unparseable_string() {
        let f = write_param_file(r#"{"n_estimators": "ten", "max_features": 1}"#);
        let err = ParamSet::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::InvalidParamValue { .. }));
    }

    #[test]
    fn list_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_param_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn list_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = list_param_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn list_missing_directory_errors() {
        let err = list_param_files(Path::new("/nonexistent/params")).unwrap_err();
        assert!(matches!(err, IoError::ParamDirRead { .. }));
    }
}
