//! Feature schema shared by the preprocessor and the scorer.
//!
//! The order of [`Feature::ALL`] is the column order of every record file and
//! the input order of every model. Changing it breaks model compatibility.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{MediriskError, Result};

/// Number of model features.
pub const FEATURE_COUNT: usize = 13;

/// Name of the label column that follows the features in record files.
pub const TARGET_COLUMN: &str = "target";

/// Number of columns in a raw or cleaned record (features + target).
pub const RECORD_WIDTH: usize = FEATURE_COUNT + 1;

/// One clinical input feature, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Age,
    Sex,
    Cp,
    Trestbps,
    Chol,
    Fbs,
    Restecg,
    Thalach,
    Exang,
    Oldpeak,
    Slope,
    Ca,
    Thal,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Sex,
        Feature::Cp,
        Feature::Trestbps,
        Feature::Chol,
        Feature::Fbs,
        Feature::Restecg,
        Feature::Thalach,
        Feature::Exang,
        Feature::Oldpeak,
        Feature::Slope,
        Feature::Ca,
        Feature::Thal,
    ];

    /// Position of this feature in a [`FeatureVector`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used in record files and model artifacts.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Age      => "age",
            Feature::Sex      => "sex",
            Feature::Cp       => "cp",
            Feature::Trestbps => "trestbps",
            Feature::Chol     => "chol",
            Feature::Fbs      => "fbs",
            Feature::Restecg  => "restecg",
            Feature::Thalach  => "thalach",
            Feature::Exang    => "exang",
            Feature::Oldpeak  => "oldpeak",
            Feature::Slope    => "slope",
            Feature::Ca       => "ca",
            Feature::Thal     => "thal",
        }
    }

    /// Human-readable label shown next to explanation weights.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Age      => "Age",
            Feature::Sex      => "Sex",
            Feature::Cp       => "Chest Pain",
            Feature::Trestbps => "Resting BP",
            Feature::Chol     => "Cholesterol",
            Feature::Fbs      => "Fasting Sugar",
            Feature::Restecg  => "Resting ECG",
            Feature::Thalach  => "Max Heart Rate",
            Feature::Exang    => "Exercise Angina",
            Feature::Oldpeak  => "ST Depression",
            Feature::Slope    => "ST Slope",
            Feature::Ca       => "Major Vessels",
            Feature::Thal     => "Thalassemia",
        }
    }

    /// Parse a column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column names of a record file: the features followed by the target.
pub fn record_columns() -> [&'static str; RECORD_WIDTH] {
    let mut columns = [TARGET_COLUMN; RECORD_WIDTH];
    for feature in Feature::ALL {
        columns[feature.index()] = feature.name();
    }
    columns
}

/// Ordered numeric input to a model. Always exactly [`FEATURE_COUNT`] long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Pairs each value with its feature, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().zip(self.0.iter().copied())
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = MediriskError;

    fn try_from(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] = values
            .try_into()
            .map_err(|_| MediriskError::SchemaViolation {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = MediriskError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::try_from(values.as_slice())
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(vector: FeatureVector) -> Self {
        vector.0.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order() {
        let names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg",
                "thalach", "exang", "oldpeak", "slope", "ca", "thal",
            ]
        );
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_record_columns_end_with_target() {
        let columns = record_columns();
        assert_eq!(columns.len(), 14);
        assert_eq!(columns[0], "age");
        assert_eq!(columns[12], "thal");
        assert_eq!(columns[13], "target");
    }

    #[test]
    fn test_from_name_roundtrip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("bmi"), None);
    }

    #[test]
    fn test_wrong_length_is_schema_violation() {
        let err = FeatureVector::try_from(vec![1.0; 12]).unwrap_err();
        assert!(matches!(
            err,
            MediriskError::SchemaViolation { expected: 13, actual: 12 }
        ));
        assert!(FeatureVector::try_from(vec![1.0; 13]).is_ok());
    }

    #[test]
    fn test_serde_rejects_short_vector() {
        let parsed: std::result::Result<FeatureVector, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_index_by_feature() {
        let mut v = FeatureVector::new([0.0; FEATURE_COUNT]);
        v.set(Feature::Chol, 233.0);
        assert_eq!(v[Feature::Chol], 233.0);
        assert_eq!(v.get(Feature::Chol), 233.0);
        assert_eq!(v.as_slice()[4], 233.0);
    }
}
