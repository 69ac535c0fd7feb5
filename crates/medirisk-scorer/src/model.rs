//! Trait for the pre-trained classifier capability.
//!
//! The scorer only needs two things from a model: a probability for each of
//! the two classes, and whatever explanation the model can offer. Concrete
//! model types stay behind this boundary.

use medirisk_common::{FeatureVector, ModelKind, Result};

use crate::importance::{Explanation, FeatureWeights};

/// Binary classifier over the 13-feature schema.
///
/// Implementations can use:
/// - JSON model artifacts exported by the training pipeline
/// - Fixed outputs (testing)
pub trait RiskModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Class probabilities `[no_risk, risk]`.
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]>;

    /// Per-feature explanation capability.
    fn explanation(&self) -> Explanation {
        Explanation::Unavailable
    }
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// Model with a fixed risk probability and configurable explanation.
#[derive(Debug, Clone)]
pub struct MockRiskModel {
    kind: ModelKind,
    probability: f64,
    explanation: Explanation,
}

impl MockRiskModel {
    pub fn new(probability: f64) -> Self {
        Self {
            kind: ModelKind::default(),
            probability,
            explanation: Explanation::Unavailable,
        }
    }

    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_importances(mut self, importances: [f64; 13]) -> Self {
        self.explanation = Explanation::TreeImportances(FeatureWeights::new(importances));
        self
    }

    pub fn with_coefficients(mut self, coefficients: [f64; 13]) -> Self {
        self.explanation = Explanation::LinearCoefficients(FeatureWeights::new(coefficients));
        self
    }
}

impl RiskModel for MockRiskModel {
    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn predict_proba(&self, _features: &FeatureVector) -> Result<[f64; 2]> {
        Ok([1.0 - self.probability, self.probability])
    }

    fn explanation(&self) -> Explanation {
        self.explanation.clone()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
