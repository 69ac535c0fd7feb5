//! Risk assessment: prediction, risk banding and ranked explanation.

use chrono::Utc;
use uuid::Uuid;

use medirisk_common::{
    FeatureVector, MediriskError, PatientInput, Result, RiskAssessment, RiskCategory, RiskFactor,
};
use tracing::info;

use crate::encoder::encode;
use crate::importance::TOP_K;
use crate::model::RiskModel;

/// Probabilities below this are LOW.
pub const MODERATE_RISK_FLOOR: f64 = 0.4;
/// Probabilities at or above this are HIGH.
pub const HIGH_RISK_FLOOR: f64 = 0.7;

/// Tolerated rounding drift outside [0, 1] before a probability is rejected.
const PROBABILITY_EPSILON: f64 = 1e-9;

/// Band a risk probability.
pub fn categorize(probability: f64) -> RiskCategory {
    if probability < MODERATE_RISK_FLOOR {
        RiskCategory::Low
    } else if probability < HIGH_RISK_FLOOR {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    }
}

/// Top factors behind a model's predictions, normalised to fractions of 1.
pub fn explain(model: &dyn RiskModel) -> Vec<RiskFactor> {
    model.explanation().importances().top_k(TOP_K)
}

fn risk_probability(model: &dyn RiskModel, features: &FeatureVector) -> Result<f64> {
    let [_, risk] = model.predict_proba(features)?;
    if !risk.is_finite() || risk < -PROBABILITY_EPSILON || risk > 1.0 + PROBABILITY_EPSILON {
        return Err(MediriskError::InvalidModel(format!(
            "{} returned risk probability {}",
            model.kind(),
            risk
        )));
    }
    Ok(risk.clamp(0.0, 1.0))
}

/// Score an encoded feature vector.
pub fn score(features: &FeatureVector, model: &dyn RiskModel) -> Result<RiskAssessment> {
    let probability = risk_probability(model, features)?;
    let category = categorize(probability);

    let assessment = RiskAssessment {
        id: Uuid::new_v4(),
        model: model.kind(),
        probability,
        category,
        top_factors: explain(model),
        assessed_at: Utc::now(),
    };

    info!(
        "Assessment {} ({}): p={:.3} → {}",
        assessment.id,
        assessment.model.display_name(),
        probability,
        category
    );
    Ok(assessment)
}

/// Encode a patient and score them.
pub fn assess(input: &PatientInput, model: &dyn RiskModel) -> Result<RiskAssessment> {
    score(&encode(input), model)
}
