//! Shared fixtures for MediRisk tests: raw record text, model artifacts and
//! sample patients.

use std::fs;
use std::path::{Path, PathBuf};

use medirisk_common::PatientInput;
use tempfile::TempDir;

pub use pretty_assertions::{assert_eq, assert_ne};

/// Eight headerless raw rows. Row 3 is missing `ca`, row 6 is missing
/// `thal`, row 8 has garbage in `chol`. Targets use the 0-4 severity scale.
pub const RAW_RECORDS: &str = "\
63.0,1.0,1.0,145.0,233.0,1.0,2.0,150.0,0.0,2.3,3.0,0.0,6.0,0
67.0,1.0,4.0,160.0,286.0,0.0,2.0,108.0,1.0,1.5,2.0,3.0,3.0,2
67.0,1.0,4.0,120.0,229.0,0.0,2.0,129.0,1.0,2.6,2.0,?,7.0,1
37.0,1.0,3.0,130.0,250.0,0.0,0.0,187.0,0.0,3.5,3.0,0.0,3.0,0
41.0,0.0,2.0,130.0,204.0,0.0,2.0,172.0,0.0,1.4,1.0,0.0,3.0,0
56.0,1.0,2.0,120.0,236.0,0.0,0.0,178.0,0.0,0.8,1.0,0.0,?,0
62.0,0.0,4.0,140.0,268.0,0.0,2.0,160.0,0.0,3.6,3.0,2.0,3.0,3
57.0,0.0,4.0,120.0,n/a,0.0,0.0,163.0,1.0,0.6,1.0,0.0,3.0,4
";

/// Tree importances used by the forest and tree fixtures.
pub const TREE_IMPORTANCES: [f64; 13] = [
    0.05, 0.3, 0.1, 0.05, 0.05, 0.05, 0.05, 0.1, 0.05, 0.05, 0.05, 0.05, 0.05,
];

/// Logistic regression coefficients used by [`LOGISTIC_ARTIFACT`].
pub const LOGISTIC_COEFFICIENTS: [f64; 13] = [
    0.02, 0.8, 0.6, 0.01, 0.003, 0.1, 0.2, -0.03, 0.9, 0.5, 0.4, 0.7, 0.3,
];

pub const LOGISTIC_ARTIFACT: &str = r#"{
  "kind": "logistic_regression",
  "coefficients": [0.02, 0.8, 0.6, 0.01, 0.003, 0.1, 0.2, -0.03, 0.9, 0.5, 0.4, 0.7, 0.3],
  "intercept": -0.25
}"#;

/// Single tree: `cp <= 3.5` → 0.2, else `ca <= 0.5` → 0.5, else 0.9.
pub const DECISION_TREE_ARTIFACT: &str = r#"{
  "kind": "decision_tree",
  "root": {"split": {
    "feature": "cp", "threshold": 3.5,
    "left":  {"leaf": {"value": [8, 2]}},
    "right": {"split": {
      "feature": "ca", "threshold": 0.5,
      "left":  {"leaf": {"value": [5, 5]}},
      "right": {"leaf": {"value": [1, 9]}}
    }}
  }},
  "feature_importances": [0.05, 0.3, 0.1, 0.05, 0.05, 0.05, 0.05, 0.1, 0.05, 0.05, 0.05, 0.05, 0.05]
}"#;

/// Two trees: the decision tree fixture, and `thalach <= 140` → 0.8 else 0.2.
pub const RANDOM_FOREST_ARTIFACT: &str = r#"{
  "kind": "random_forest",
  "trees": [
    {"split": {
      "feature": "cp", "threshold": 3.5,
      "left":  {"leaf": {"value": [8, 2]}},
      "right": {"split": {
        "feature": "ca", "threshold": 0.5,
        "left":  {"leaf": {"value": [5, 5]}},
        "right": {"leaf": {"value": [1, 9]}}
      }}
    }},
    {"split": {
      "feature": "thalach", "threshold": 140,
      "left":  {"leaf": {"value": [2, 8]}},
      "right": {"leaf": {"value": [8, 2]}}
    }}
  ],
  "feature_importances": [0.05, 0.3, 0.1, 0.05, 0.05, 0.05, 0.05, 0.1, 0.05, 0.05, 0.05, 0.05, 0.05]
}"#;

pub const MODEL_METRICS: &str = r#"{
  "random_forest": {"accuracy": 0.85, "precision": 0.84, "recall": 0.83, "f1": 0.835, "roc_auc": 0.92},
  "logistic_regression": {"accuracy": 0.83, "roc_auc": 0.9}
}"#;

/// Write [`RAW_RECORDS`] into a fresh temporary directory.
pub fn raw_records_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("heart_raw.csv");
    fs::write(&path, RAW_RECORDS).expect("write raw fixture");
    (dir, path)
}

/// Write every model artifact fixture plus metrics into `dir`.
pub fn write_model_dir(dir: &Path) {
    fs::create_dir_all(dir).expect("create model dir");
    fs::write(dir.join("logistic_regression.json"), LOGISTIC_ARTIFACT).expect("write model");
    fs::write(dir.join("decision_tree.json"), DECISION_TREE_ARTIFACT).expect("write model");
    fs::write(dir.join("random_forest.json"), RANDOM_FOREST_ARTIFACT).expect("write model");
    fs::write(dir.join("model_metrics.json"), MODEL_METRICS).expect("write metrics");
}

/// A temporary model directory populated by [`write_model_dir`].
pub fn model_dir() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    write_model_dir(dir.path());
    dir
}

/// Female, asymptomatic chest pain, normal fasting glucose.
pub fn female_asymptomatic() -> PatientInput {
    PatientInput {
        age: 58.0,
        sex: "Female".to_string(),
        chest_pain: "Asymptomatic".to_string(),
        resting_bp: 130.0,
        cholesterol: 240.0,
        fasting_glucose: 90.0,
        resting_ecg: "Normal".to_string(),
        max_heart_rate: 125.0,
        exercise_angina: "Yes".to_string(),
        st_depression: 2.4,
        st_slope: "Flat".to_string(),
        major_vessels: 2.0,
        thalassemia: "Reversable Defect".to_string(),
    }
}

/// Young male with typical angina and a high max heart rate.
pub fn low_risk_patient() -> PatientInput {
    PatientInput {
        age: 39.0,
        sex: "Male".to_string(),
        chest_pain: "Typical Angina".to_string(),
        resting_bp: 118.0,
        cholesterol: 180.0,
        fasting_glucose: 95.0,
        resting_ecg: "Normal".to_string(),
        max_heart_rate: 175.0,
        exercise_angina: "No".to_string(),
        st_depression: 0.0,
        st_slope: "Upsloping".to_string(),
        major_vessels: 0.0,
        thalassemia: "Normal".to_string(),
    }
}

/// Absolute-tolerance float comparison for test assertions.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
