//! Parameter-grid expansion: named ranges to one JSON file per combination.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::IoError;

/// An inclusive numeric range for one named parameter.
///
/// Expands to `min, min + increment, ...` while the value stays `<= max`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamRange {
    /// Parameter name, used as the JSON key in generated files.
    pub name: String,
    /// Lowest value (inclusive).
    pub min: f64,
    /// Highest value (inclusive).
    pub max: f64,
    /// Step between consecutive values; must be positive.
    pub increment: f64,
}

impl ParamRange {
    /// Expand the range into its concrete values.
    fn values(&self) -> Vec<f64> {
        let mut values = Vec::new();
        let mut current = self.min;
        while current <= self.max {
            values.push(current);
            current += self.increment;
        }
        values
    }
}

/// A set of parameter ranges loaded from a JSON ranges file.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    ranges: Vec<ParamRange>,
}

/// One concrete combination of parameter values.
#[derive(Debug, Clone)]
pub struct ParamCombo {
    /// `(name, value)` pairs in range order.
    values: Vec<(String, f64)>,
}

impl ParamCombo {
    /// Return the `(name, value)` pairs.
    #[must_use]
    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }

    /// Derive the output file name from the formatted values.
    ///
    /// Each value is formatted to two decimal places, concatenated, and
    /// the dots stripped, matching the naming of the original pipeline
    /// stage. A `.json` extension is appended.
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut name: String = self
            .values
            .iter()
            .map(|(_, v)| format!("{v:.2}"))
            .collect();
        name.retain(|c| c != '.');
        name.push_str(".json");
        name
    }

    /// Render the combination as a JSON object string.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.values {
            object.insert(
                name.clone(),
                serde_json::Number::from_f64(*value)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            );
        }
        serde_json::Value::Object(object).to_string()
    }
}

impl ParamGrid {
    /// Load and validate a ranges file: a JSON array of [`ParamRange`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File cannot be read |
    /// | [`IoError::RangesParse`] | Not a JSON array of ranges |
    /// | [`IoError::InvalidIncrement`] | A range has `increment <= 0` |
    /// | [`IoError::InvalidBounds`] | A range has `min > max` |
    #[instrument(fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let ranges: Vec<ParamRange> =
            serde_json::from_str(&raw).map_err(|e| IoError::RangesParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        for range in &ranges {
            if range.increment <= 0.0 || range.increment.is_nan() {
                return Err(IoError::InvalidIncrement {
                    name: range.name.clone(),
                    increment: range.increment,
                });
            }
            if range.min > range.max {
                return Err(IoError::InvalidBounds {
                    name: range.name.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(Self { ranges })
    }

    /// Return the parameter ranges.
    #[must_use]
    pub fn ranges(&self) -> &[ParamRange] {
        &self.ranges
    }

    /// Expand all ranges into the cartesian product of their values.
    ///
    /// Returns an empty list when the grid has no ranges.
    #[must_use]
    pub fn expand(&self) -> Vec<ParamCombo> {
        if self.ranges.is_empty() {
            return Vec::new();
        }

        let value_sets: Vec<Vec<f64>> = self.ranges.iter().map(ParamRange::values).collect();

        // Odometer over the value sets: the last range varies fastest.
        let n_combos: usize = value_sets.iter().map(Vec::len).product();
        let mut combos = Vec::with_capacity(n_combos);
        let mut cursor = vec![0usize; value_sets.len()];

        for _ in 0..n_combos {
            let values: Vec<(String, f64)> = self
                .ranges
                .iter()
                .zip(&value_sets)
                .zip(&cursor)
                .map(|((range, set), &i)| (range.name.clone(), set[i]))
                .collect();
            combos.push(ParamCombo { values });

            for pos in (0..cursor.len()).rev() {
                cursor[pos] += 1;
                if cursor[pos] < value_sets[pos].len() {
                    break;
                }
                cursor[pos] = 0;
            }
        }

        combos
    }
}

/// Write each combination as one JSON file in the output directory.
///
/// Creates the directory if it does not exist.
///
/// # Errors
///
/// Returns [`IoError::OutputDirCreate`] when the directory cannot be
/// created, or [`IoError::WriteFile`] when a combination file cannot be
/// written.
#[instrument(skip(combos), fields(dir = %dir.display(), n_combos = combos.len()))]
pub fn write_combos(dir: &Path, combos: &[ParamCombo]) -> Result<Vec<PathBuf>, IoError> {
    fs::create_dir_all(dir).map_err(|e| IoError::OutputDirCreate {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(combos.len());
    for combo in combos {
        let path = dir.join(combo.file_name());
        fs::write(&path, combo.to_json()).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }

    info!(n_files = written.len(), "parameter files written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_ranges(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn expands_cartesian_product() {
        let f = write_ranges(
            r#"[
                {"name": "n_estimators", "min": 10, "max": 30, "increment": 10},
                {"name": "max_features", "min": 1, "max": 2, "increment": 1}
            ]"#,
        );
        let grid = ParamGrid::from_file(f.path()).unwrap();
        let combos = grid.expand();
        assert_eq!(combos.len(), 6);

        // Last range varies fastest.
        assert_eq!(combos[0].values()[0].1, 10.0);
        assert_eq!(combos[0].values()[1].1, 1.0);
        assert_eq!(combos[1].values()[0].1, 10.0);
        assert_eq!(combos[1].values()[1].1, 2.0);
        assert_eq!(combos[5].values()[0].1, 30.0);
        assert_eq!(combos[5].values()[1].1, 2.0);
    }

    #[test]
    fn single_range_single_value() {
        let f = write_ranges(r#"[{"name": "n_estimators", "min": 5, "max": 5, "increment": 1}]"#);
        let grid = ParamGrid::from_file(f.path()).unwrap();
        let combos = grid.expand();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].values(), &[("n_estimators".to_string(), 5.0)]);
    }

    #[test]
    fn empty_grid_expands_to_nothing() {
        let f = write_ranges("[]");
        let grid = ParamGrid::from_file(f.path()).unwrap();
        assert!(grid.expand().is_empty());
    }

    #[test]
    fn file_name_strips_dots() {
        let f = write_ranges(
            r#"[
                {"name": "n_estimators", "min": 10, "max": 10, "increment": 1},
                {"name": "max_features", "min": 2, "max": 2, "increment": 1}
            ]"#,
        );
        let combos = ParamGrid::from_file(f.path()).unwrap().expand();
        assert_eq!(combos[0].file_name(), "1000200.json");
    }

    #[test]
    fn combo_json_is_an_object_with_range_names() {
        let f = write_ranges(
            r#"[
                {"name": "n_estimators", "min": 10, "max": 10, "increment": 1},
                {"name": "max_features", "min": 1, "max": 1, "increment": 1}
            ]"#,
        );
        let combos = ParamGrid::from_file(f.path()).unwrap().expand();
        let parsed: serde_json::Value = serde_json::from_str(&combos[0].to_json()).unwrap();
        assert_eq!(parsed["n_estimators"].as_f64().unwrap(), 10.0);
        assert_eq!(parsed["max_features"].as_f64().unwrap(), 1.0);
    }

    #[test]
    fn error_non_positive_increment() {
        let f = write_ranges(r#"[{"name": "x", "min": 0, "max": 10, "increment": 0}]"#);
        let err = ParamGrid::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::InvalidIncrement { .. }));
    }

    #[test]
    fn error_min_above_max() {
        let f = write_ranges(r#"[{"name": "x", "min": 10, "max": 1, "increment": 1}]"#);
        let err = ParamGrid::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::InvalidBounds { .. }));
    }

    #[test]
    fn error_malformed_ranges_file() {
        let f = write_ranges(r#"{"not": "an array"}"#);
        let err = ParamGrid::from_file(f.path()).unwrap_err();
        assert!(matches!(err, IoError::RangesParse { .. }));
    }

    #[test]
    fn write_combos_creates_one_file_each() {
        let f = write_ranges(
            r#"[
                {"name": "n_estimators", "min": 10, "max": 20, "increment": 10},
                {"name": "max_features", "min": 1, "max": 2, "increment": 1}
            ]"#,
        );
        let combos = ParamGrid::from_file(f.path()).unwrap().expand();

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("params");
        let written = write_combos(&out, &combos).unwrap();
        assert_eq!(written.len(), 4);
        for path in &written {
            let content = std::fs::read_to_string(path).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
            assert!(parsed.get("n_estimators").is_some());
            assert!(parsed.get("max_features").is_some());
        }
    }
}
