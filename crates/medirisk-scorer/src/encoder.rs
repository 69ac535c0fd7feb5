//! Patient input → model feature vector.
//!
//! The label-to-code tables must match the codes the models were trained on.
//! Unknown labels never fail; they take the column's default code.

use medirisk_common::{Feature, FeatureVector, PatientInput, FEATURE_COUNT};
use tracing::debug;

/// Fasting glucose above this value (mg/dL) sets `fbs`.
pub const FASTING_GLUCOSE_THRESHOLD: f64 = 120.0;

const CHEST_PAIN_CODES: &[(&str, f64)] = &[
    ("Typical Angina",   1.0),
    ("Atypical Angina",  2.0),
    ("Non-anginal Pain", 3.0),
    ("Asymptomatic",     4.0),
];
const CHEST_PAIN_DEFAULT: f64 = 4.0;

const RESTING_ECG_CODES: &[(&str, f64)] = &[
    ("Normal",           0.0),
    ("ST-T abnormality", 1.0),
    ("LV hypertrophy",   2.0),
];
const RESTING_ECG_DEFAULT: f64 = 0.0;

const ST_SLOPE_CODES: &[(&str, f64)] = &[
    ("Upsloping",   1.0),
    ("Flat",        2.0),
    ("Downsloping", 3.0),
];
const ST_SLOPE_DEFAULT: f64 = 2.0;

const THAL_CODES: &[(&str, f64)] = &[
    ("Normal",            3.0),
    ("Fixed Defect",      6.0),
    ("Reversable Defect", 7.0),
];
const THAL_DEFAULT: f64 = 3.0;

/// Labels accepted for each categorical field, for form builders.
pub fn chest_pain_labels() -> impl Iterator<Item = &'static str> {
    CHEST_PAIN_CODES.iter().map(|(label, _)| *label)
}

pub fn resting_ecg_labels() -> impl Iterator<Item = &'static str> {
    RESTING_ECG_CODES.iter().map(|(label, _)| *label)
}

pub fn st_slope_labels() -> impl Iterator<Item = &'static str> {
    ST_SLOPE_CODES.iter().map(|(label, _)| *label)
}

pub fn thal_labels() -> impl Iterator<Item = &'static str> {
    THAL_CODES.iter().map(|(label, _)| *label)
}

fn lookup(feature: Feature, table: &[(&str, f64)], label: &str, default: f64) -> f64 {
    match table.iter().find(|(l, _)| *l == label) {
        Some((_, code)) => *code,
        None => {
            debug!("Unrecognised {} label {:?}; using default code {}", feature, label, default);
            default
        }
    }
}

fn flag(label: &str, positive: &str) -> f64 {
    if label == positive { 1.0 } else { 0.0 }
}

/// Encode a patient into the fixed 13-feature layout.
pub fn encode(input: &PatientInput) -> FeatureVector {
    let mut v = FeatureVector::new([0.0; FEATURE_COUNT]);

    v.set(Feature::Age,      input.age);
    v.set(Feature::Sex,      flag(&input.sex, "Male"));
    v.set(Feature::Cp,       lookup(Feature::Cp, CHEST_PAIN_CODES, &input.chest_pain, CHEST_PAIN_DEFAULT));
    v.set(Feature::Trestbps, input.resting_bp);
    v.set(Feature::Chol,     input.cholesterol);
    v.set(Feature::Fbs,      if input.fasting_glucose > FASTING_GLUCOSE_THRESHOLD { 1.0 } else { 0.0 });
    v.set(Feature::Restecg,  lookup(Feature::Restecg, RESTING_ECG_CODES, &input.resting_ecg, RESTING_ECG_DEFAULT));
    v.set(Feature::Thalach,  input.max_heart_rate);
    v.set(Feature::Exang,    flag(&input.exercise_angina, "Yes"));
    v.set(Feature::Oldpeak,  input.st_depression);
    v.set(Feature::Slope,    lookup(Feature::Slope, ST_SLOPE_CODES, &input.st_slope, ST_SLOPE_DEFAULT));
    v.set(Feature::Ca,       input.major_vessels);
    v.set(Feature::Thal,     lookup(Feature::Thal, THAL_CODES, &input.thalassemia, THAL_DEFAULT));

    v
}
