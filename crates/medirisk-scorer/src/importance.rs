//! Per-feature importance weights and explanation ranking.

use serde::{Deserialize, Serialize};

use medirisk_common::{Feature, MediriskError, Result, RiskFactor, FEATURE_COUNT};

/// Number of factors reported in an explanation.
pub const TOP_K: usize = 5;

/// One weight per feature, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureWeights([f64; FEATURE_COUNT]);

impl FeatureWeights {
    pub fn new(weights: [f64; FEATURE_COUNT]) -> Self {
        Self(weights)
    }

    /// Every feature weighted 1/13. Signals "no information".
    pub fn uniform() -> Self {
        Self([1.0 / FEATURE_COUNT as f64; FEATURE_COUNT])
    }

    /// Absolute values divided by their sum, for linear coefficients.
    /// All-zero input has no direction and falls back to [`Self::uniform`].
    pub fn normalised_abs(&self) -> Self {
        let sum: f64 = self.0.iter().map(|w| w.abs()).sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Self::uniform();
        }
        let mut out = [0.0; FEATURE_COUNT];
        for (o, w) in out.iter_mut().zip(self.0.iter()) {
            *o = w.abs() / sum;
        }
        Self(out)
    }

    /// Values divided by their sum, for importances that do not already add
    /// up to 1. A zero or non-finite sum falls back to [`Self::uniform`].
    pub fn normalised(&self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Self::uniform();
        }
        let mut out = [0.0; FEATURE_COUNT];
        for (o, w) in out.iter_mut().zip(self.0.iter()) {
            *o = w / sum;
        }
        Self(out)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|w| w.is_finite())
    }

    /// The `k` heaviest features, descending. Ties keep schema order.
    pub fn top_k(&self, k: usize) -> Vec<RiskFactor> {
        let mut ranked: Vec<(Feature, f64)> = Feature::ALL
            .into_iter()
            .zip(self.0.iter().copied())
            .collect();

        // `sort_by` is stable, so equal weights stay in schema order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .take(k)
            .map(|(feature, weight)| RiskFactor::new(feature, weight))
            .collect()
    }
}

impl TryFrom<Vec<f64>> for FeatureWeights {
    type Error = MediriskError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] = values
            .as_slice()
            .try_into()
            .map_err(|_| MediriskError::SchemaViolation {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }
}

impl From<FeatureWeights> for Vec<f64> {
    fn from(weights: FeatureWeights) -> Self {
        weights.0.to_vec()
    }
}

/// What a model can say about why it predicted what it did.
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    /// Impurity-based importances from a tree model. Non-negative; rescaled
    /// to sum to 1 when reported.
    TreeImportances(FeatureWeights),
    /// Raw coefficients from a linear model. Any sign, any scale.
    LinearCoefficients(FeatureWeights),
    /// The model exposes neither.
    Unavailable,
}

impl Explanation {
    /// Normalised importance per feature.
    pub fn importances(&self) -> FeatureWeights {
        match self {
            Explanation::TreeImportances(weights) => weights.normalised(),
            Explanation::LinearCoefficients(coefficients) => coefficients.normalised_abs(),
            Explanation::Unavailable => FeatureWeights::uniform(),
        }
    }
}
