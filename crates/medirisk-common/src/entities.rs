//! Core entity types passed between the preprocessor, the scorer and callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MediriskError;
use crate::schema::{Feature, FeatureVector, RECORD_WIDTH};

// ---------------------------------------------------------------------------
// Cleaned record
// ---------------------------------------------------------------------------

/// One fully numeric row produced by the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub features: FeatureVector,
    /// 1 if the condition is present, else 0.
    pub target: u8,
}

impl CleanedRecord {
    /// Values in record-file column order (features, then target).
    pub fn to_row(&self) -> [f64; RECORD_WIDTH] {
        let mut row = [0.0; RECORD_WIDTH];
        row[..RECORD_WIDTH - 1].copy_from_slice(self.features.as_slice());
        row[RECORD_WIDTH - 1] = f64::from(self.target);
        row
    }
}

// ---------------------------------------------------------------------------
// Patient input
// ---------------------------------------------------------------------------

/// Clinical inputs for a single assessment, as entered by a clinician.
///
/// Categorical fields hold the human labels shown in the intake form; the
/// encoder maps them onto model codes. Fields absent from a serialized
/// input take the intake form defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInput {
    pub age: f64,
    /// "Male" or "Female"
    pub sex: String,
    /// "Typical Angina", "Atypical Angina", "Non-anginal Pain" or "Asymptomatic"
    pub chest_pain: String,
    /// Resting systolic blood pressure, mmHg
    pub resting_bp: f64,
    /// Serum cholesterol, mg/dL
    pub cholesterol: f64,
    /// Fasting blood glucose, mg/dL
    pub fasting_glucose: f64,
    /// "Normal", "ST-T abnormality" or "LV hypertrophy"
    pub resting_ecg: String,
    /// Maximum heart rate achieved, BPM
    pub max_heart_rate: f64,
    /// "Yes" or "No"
    pub exercise_angina: String,
    /// ST depression induced by exercise relative to rest
    pub st_depression: f64,
    /// "Upsloping", "Flat" or "Downsloping"
    pub st_slope: String,
    /// Number of major vessels coloured by fluoroscopy (0-4)
    pub major_vessels: f64,
    /// "Normal", "Fixed Defect" or "Reversable Defect"
    pub thalassemia: String,
}

impl Default for PatientInput {
    /// Intake form defaults.
    fn default() -> Self {
        Self {
            age: 45.0,
            sex: "Male".to_string(),
            chest_pain: "Asymptomatic".to_string(),
            resting_bp: 120.0,
            cholesterol: 190.0,
            fasting_glucose: 105.0,
            resting_ecg: "Normal".to_string(),
            max_heart_rate: 150.0,
            exercise_angina: "No".to_string(),
            st_depression: 1.0,
            st_slope: "Flat".to_string(),
            major_vessels: 0.0,
            thalassemia: "Normal".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Model kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    DecisionTree,
    #[default]
    RandomForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogisticRegression,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::DecisionTree       => "decision_tree",
            ModelKind::RandomForest       => "random_forest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::DecisionTree       => "Decision Tree",
            ModelKind::RandomForest       => "Random Forest",
        }
    }

    /// Artifact file name inside the model directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = MediriskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MediriskError::Config(format!("unknown model kind: {s}")))
    }
}

/// Evaluation metrics recorded when a model was trained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub roc_auc: Option<f64>,
}

// ---------------------------------------------------------------------------
// Risk assessment
// ---------------------------------------------------------------------------

/// Banding of a risk probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low      => "LOW",
            RiskCategory::Moderate => "MODERATE",
            RiskCategory::High     => "HIGH",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the ranked explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub feature: Feature,
    pub label: String,
    /// Fraction of total importance, in [0, 1].
    pub weight: f64,
}

impl RiskFactor {
    pub fn new(feature: Feature, weight: f64) -> Self {
        Self {
            feature,
            label: feature.label().to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub model: ModelKind,
    /// Probability of the risk class, in [0, 1].
    pub probability: f64,
    pub category: RiskCategory,
    /// At most five factors, highest weight first.
    pub top_factors: Vec<RiskFactor>,
    pub assessed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parse() {
        assert_eq!("random_forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("Logistic Regression".parse::<ModelKind>().unwrap(), ModelKind::LogisticRegression);
        assert_eq!("decision tree".parse::<ModelKind>().unwrap(), ModelKind::DecisionTree);
        assert!("svm".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_default_model_is_random_forest() {
        assert_eq!(ModelKind::default(), ModelKind::RandomForest);
        assert_eq!(ModelKind::default().file_name(), "random_forest.json");
    }

    #[test]
    fn test_category_serializes_uppercase() {
        let json = serde_json::to_string(&RiskCategory::Moderate).unwrap();
        assert_eq!(json, "\"MODERATE\"");
    }

    #[test]
    fn test_cleaned_record_row_order() {
        let mut values = [0.0; 13];
        values[0] = 63.0;
        values[12] = 6.0;
        let record = CleanedRecord { features: FeatureVector::new(values), target: 1 };
        let row = record.to_row();
        assert_eq!(row[0], 63.0);
        assert_eq!(row[12], 6.0);
        assert_eq!(row[13], 1.0);
    }

    #[test]
    fn test_patient_input_from_json() {
        let json = r#"{
            "age": 54, "sex": "Female", "chest_pain": "Asymptomatic",
            "resting_bp": 130, "cholesterol": 250, "fasting_glucose": 90,
            "resting_ecg": "Normal", "max_heart_rate": 160,
            "exercise_angina": "No", "st_depression": 0.5,
            "st_slope": "Upsloping", "major_vessels": 0, "thalassemia": "Normal"
        }"#;
        let input: PatientInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.sex, "Female");
        assert_eq!(input.fasting_glucose, 90.0);
    }

    #[test]
    fn test_partial_patient_input_uses_form_defaults() {
        let input: PatientInput = serde_json::from_str(r#"{"age": 61, "sex": "Female"}"#).unwrap();
        assert_eq!(input.age, 61.0);
        assert_eq!(input.sex, "Female");
        assert_eq!(input.chest_pain, "Asymptomatic");
        assert_eq!(input.resting_bp, 120.0);
    }
}
