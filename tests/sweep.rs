//! End-to-end sweep tests: training CSV + parameter directory -> result lines.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use gridsweep::sweep::{self, SweepConfig};
use gridsweep_io::{ParamGrid, list_param_files, write_combos};

/// Write a separable two-class training table: 50 samples per class.
fn write_training_table(dir: &Path) -> PathBuf {
    let path = dir.join("training.csv");
    let mut csv = String::from("f1;f2;label\n");
    for i in 0..50 {
        csv.push_str(&format!("{};0.5;a\n", i as f64 * 0.05));
    }
    for i in 0..50 {
        csv.push_str(&format!("{};0.5;b\n", 10.0 + i as f64 * 0.05));
    }
    fs::write(&path, csv).unwrap();
    path
}

fn write_param_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_result_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

/// Parse the trailing mean-accuracy field of a result line.
fn score_of(line: &str) -> f64 {
    let (_, score) = line.rsplit_once(", ").expect("line has a score field");
    score.parse().expect("score is a float")
}

#[test]
fn one_line_per_parameter_file_in_enumeration_order() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    write_param_file(&params, "p1.json", "{\"n_estimators\": \"10\", \"max_features\": \"1\"}\n");
    write_param_file(&params, "p2.json", r#"{"n_estimators": 5, "max_features": 2}"#);
    write_param_file(&params, "p3.json", r#"{"n_estimators": 3, "max_features": 1}"#);

    let config = SweepConfig::new(&training, &params, &out);
    let summary = sweep::run(&config).unwrap();
    assert_eq!(summary.n_evaluated, 3);
    assert_eq!(summary.n_skipped, 0);
    assert_eq!(summary.n_samples, 100);
    assert_eq!(summary.n_classes, 2);

    let lines = read_result_lines(&out);
    assert_eq!(lines.len(), 3);

    // Lines follow the same directory enumeration order the sweep used.
    let enumerated = list_param_files(&params).unwrap();
    for (line, path) in lines.iter().zip(&enumerated) {
        let raw = fs::read_to_string(path).unwrap();
        assert!(
            line.starts_with(raw.trim_end_matches('\n')),
            "line {line:?} does not echo {path:?}"
        );
        let score = score_of(line);
        assert!((0.0..=1.0).contains(&score), "score = {score}");
    }
}

#[test]
fn separable_data_scores_high() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    write_param_file(&params, "p.json", r#"{"n_estimators": "10", "max_features": "1"}"#);

    sweep::run(&SweepConfig::new(&training, &params, &out)).unwrap();

    let lines = read_result_lines(&out);
    assert_eq!(lines.len(), 1);
    assert!(score_of(&lines[0]) > 0.8, "line: {}", lines[0]);
}

#[test]
fn rerun_doubles_line_count() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    write_param_file(&params, "p1.json", r#"{"n_estimators": 5, "max_features": 1}"#);
    write_param_file(&params, "p2.json", r#"{"n_estimators": 5, "max_features": 2}"#);

    let config = SweepConfig::new(&training, &params, &out);
    sweep::run(&config).unwrap();
    assert_eq!(read_result_lines(&out).len(), 2);

    sweep::run(&config).unwrap();
    assert_eq!(read_result_lines(&out).len(), 4);
}

#[test]
fn missing_key_aborts_run() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    write_param_file(&params, "good_a.json", r#"{"n_estimators": 5, "max_features": 1}"#);
    let bad = write_param_file(&params, "bad.json", r#"{"max_features": 1}"#);
    write_param_file(&params, "good_b.json", r#"{"n_estimators": 5, "max_features": 2}"#);

    let config = SweepConfig::new(&training, &params, &out);
    let err = sweep::run(&config).unwrap_err();
    assert!(err.to_string().contains("failed to parse parameter file"));

    // Fail-fast: only the files enumerated before the bad one were written.
    let enumerated = list_param_files(&params).unwrap();
    let bad_position = enumerated.iter().position(|p| p == &bad).unwrap();
    let lines = if out.exists() { read_result_lines(&out) } else { Vec::new() };
    assert_eq!(lines.len(), bad_position);
}

#[test]
fn skip_invalid_evaluates_the_rest() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    write_param_file(&params, "good_a.json", r#"{"n_estimators": 5, "max_features": 1}"#);
    write_param_file(&params, "bad.json", "not json");
    write_param_file(&params, "good_b.json", r#"{"n_estimators": 5, "max_features": 2}"#);

    let config = SweepConfig::new(&training, &params, &out).with_skip_invalid(true);
    let summary = sweep::run(&config).unwrap();
    assert_eq!(summary.n_evaluated, 2);
    assert_eq!(summary.n_skipped, 1);
    assert_eq!(read_result_lines(&out).len(), 2);
}

#[test]
fn same_seed_gives_identical_output() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();

    write_param_file(&params, "p.json", r#"{"n_estimators": 10, "max_features": 1}"#);

    let out1 = dir.path().join("results1.csv");
    let out2 = dir.path().join("results2.csv");
    sweep::run(&SweepConfig::new(&training, &params, &out1).with_seed(7)).unwrap();
    sweep::run(&SweepConfig::new(&training, &params, &out2).with_seed(7)).unwrap();

    assert_eq!(
        fs::read_to_string(&out1).unwrap(),
        fs::read_to_string(&out2).unwrap()
    );
}

#[test]
fn missing_training_table_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    write_param_file(&params, "p.json", r#"{"n_estimators": 5, "max_features": 1}"#);
    let out = dir.path().join("results.csv");

    let config = SweepConfig::new(&dir.path().join("missing.csv"), &params, &out);
    let err = sweep::run(&config).unwrap_err();
    assert!(err.to_string().contains("failed to read training table"));
    assert!(!out.exists());
}

#[test]
fn empty_parameter_directory_appends_nothing() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    let out = dir.path().join("results.csv");

    let summary = sweep::run(&SweepConfig::new(&training, &params, &out)).unwrap();
    assert_eq!(summary.n_evaluated, 0);
    assert!(!out.exists());
}

#[test]
fn expanded_grid_feeds_the_sweep() {
    let dir = TempDir::new().unwrap();
    let training = write_training_table(dir.path());
    let out = dir.path().join("results.csv");

    // Expand a 3x2 grid into parameter files, then sweep over them.
    let ranges_path = dir.path().join("ranges.json");
    fs::write(
        &ranges_path,
        r#"[
            {"name": "n_estimators", "min": 3, "max": 9, "increment": 3},
            {"name": "max_features", "min": 1, "max": 2, "increment": 1}
        ]"#,
    )
    .unwrap();
    let params = dir.path().join("params");
    let combos = ParamGrid::from_file(&ranges_path).unwrap().expand();
    let written = write_combos(&params, &combos).unwrap();
    assert_eq!(written.len(), 6);

    let summary = sweep::run(&SweepConfig::new(&training, &params, &out)).unwrap();
    assert_eq!(summary.n_evaluated, 6);
    assert_eq!(read_result_lines(&out).len(), 6);
}
