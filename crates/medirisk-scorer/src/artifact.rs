//! JSON model artifacts exported by the training pipeline.
//!
//! One file per model, tagged by `kind`:
//!
//! ```json
//! { "kind": "logistic_regression", "coefficients": [13 numbers], "intercept": -0.3,
//!   "scaler": { "mean": [13 numbers], "scale": [13 numbers] } }
//! { "kind": "decision_tree", "root": <node>, "feature_importances": [13 numbers] }
//! { "kind": "random_forest", "trees": [<node>, ...], "feature_importances": [13 numbers] }
//! ```
//!
//! A node is either `{"split": {"feature", "threshold", "left", "right"}}`,
//! where samples with `x[feature] <= threshold` go left, or
//! `{"leaf": {"value": [no_risk, risk]}}` holding class weights.

use std::path::Path;
use std::sync::Arc;

use medirisk_common::{Feature, FeatureVector, MediriskError, ModelKind, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::importance::{Explanation, FeatureWeights};
use crate::model::RiskModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelArtifact::LogisticRegression(_) => ModelKind::LogisticRegression,
            ModelArtifact::DecisionTree(_)       => ModelKind::DecisionTree,
            ModelArtifact::RandomForest(_)       => ModelKind::RandomForest,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::LogisticRegression(m) => m.validate(),
            ModelArtifact::DecisionTree(m)       => m.validate(),
            ModelArtifact::RandomForest(m)       => m.validate(),
        }
    }

    pub fn into_model(self) -> Arc<dyn RiskModel> {
        match self {
            ModelArtifact::LogisticRegression(m) => Arc::new(m),
            ModelArtifact::DecisionTree(m)       => Arc::new(m),
            ModelArtifact::RandomForest(m)       => Arc::new(m),
        }
    }
}

/// Load and validate an artifact file.
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    debug!("Loading model artifact from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    ModelArtifact::from_json(&content)
}

fn invalid(msg: impl Into<String>) -> MediriskError {
    MediriskError::InvalidModel(msg.into())
}

fn validate_importances(importances: &Option<FeatureWeights>) -> Result<()> {
    let Some(weights) = importances else {
        return Ok(());
    };
    if !weights.is_finite() || weights.as_array().iter().any(|w| *w < 0.0) {
        return Err(invalid("feature importances must be finite and non-negative"));
    }
    if (weights.sum() - 1.0).abs() > 1e-6 {
        warn!("Feature importances sum to {:.6}, rescaling to 1.0", weights.sum());
    }
    Ok(())
}

fn tree_explanation(importances: &Option<FeatureWeights>) -> Explanation {
    match importances {
        Some(weights) => Explanation::TreeImportances(*weights),
        None => Explanation::Unavailable,
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

/// Standardisation applied before the linear model: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: FeatureVector,
    pub scale: FeatureVector,
}

impl StandardScaler {
    fn transform(&self, feature: Feature, value: f64) -> f64 {
        let scale = self.scale[feature];
        // Constant columns are exported with a zero scale; leave them unscaled.
        let scale = if scale == 0.0 { 1.0 } else { scale };
        (value - self.mean[feature]) / scale
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: FeatureWeights,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        if !self.coefficients.is_finite() || !self.intercept.is_finite() {
            return Err(invalid("logistic regression parameters must be finite"));
        }
        if let Some(scaler) = &self.scaler {
            if !scaler.mean.is_finite() || !scaler.scale.is_finite() {
                return Err(invalid("scaler parameters must be finite"));
            }
        }
        Ok(())
    }

    /// Linear decision value before the sigmoid.
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        features.iter().fold(self.intercept, |acc, (feature, value)| {
            let x = match &self.scaler {
                Some(scaler) => scaler.transform(feature, value),
                None => value,
            };
            acc + self.coefficients.get(feature) * x
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl RiskModel for LogisticRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::LogisticRegression
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(features));
        Ok([1.0 - p, p])
    }

    fn explanation(&self) -> Explanation {
        Explanation::LinearCoefficients(self.coefficients)
    }
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub feature: Feature,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Class weights `[no_risk, risk]` of the training samples in this leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    pub value: [f64; 2],
}

impl Leaf {
    fn probabilities(&self) -> [f64; 2] {
        let total = self.value[0] + self.value[1];
        [self.value[0] / total, self.value[1] / total]
    }
}

impl TreeNode {
    pub fn validate(&self) -> Result<()> {
        match self {
            TreeNode::Split(split) => {
                if !split.threshold.is_finite() {
                    return Err(invalid(format!("split on '{}' has a non-finite threshold", split.feature)));
                }
                split.left.validate()?;
                split.right.validate()
            }
            TreeNode::Leaf(leaf) => {
                let [a, b] = leaf.value;
                if !(a.is_finite() && b.is_finite()) || a < 0.0 || b < 0.0 || a + b <= 0.0 {
                    return Err(invalid(format!("leaf has invalid class weights {:?}", leaf.value)));
                }
                Ok(())
            }
        }
    }

    /// Walk to the leaf this sample lands in.
    pub fn leaf_for(&self, features: &FeatureVector) -> &Leaf {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf,
                TreeNode::Split(split) => {
                    node = if features[split.feature] <= split.threshold {
                        &split.left
                    } else {
                        &split.right
                    };
                }
            }
        }
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        self.leaf_for(features).probabilities()
    }

    /// Leaves have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
    #[serde(default)]
    pub feature_importances: Option<FeatureWeights>,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<()> {
        self.root.validate()?;
        validate_importances(&self.feature_importances)
    }
}

impl RiskModel for DecisionTree {
    fn kind(&self) -> ModelKind {
        ModelKind::DecisionTree
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]> {
        Ok(self.root.predict_proba(features))
    }

    fn explanation(&self) -> Explanation {
        tree_explanation(&self.feature_importances)
    }
}

/// Ensemble of trees; probabilities are averaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<TreeNode>,
    #[serde(default)]
    pub feature_importances: Option<FeatureWeights>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(invalid("random forest has no trees"));
        }
        for tree in &self.trees {
            tree.validate()?;
        }
        validate_importances(&self.feature_importances)
    }
}

impl RiskModel for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]> {
        if self.trees.is_empty() {
            return Err(invalid("random forest has no trees"));
        }
        let n = self.trees.len() as f64;
        let risk = self
            .trees
            .iter()
            .map(|tree| tree.predict_proba(features)[1])
            .sum::<f64>()
            / n;
        Ok([1.0 - risk, risk])
    }

    fn explanation(&self) -> Explanation {
        tree_explanation(&self.feature_importances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medirisk_test_utils::{
        DECISION_TREE_ARTIFACT, LOGISTIC_ARTIFACT, LOGISTIC_COEFFICIENTS, RANDOM_FOREST_ARTIFACT,
        TREE_IMPORTANCES,
    };

    fn features(cp: f64, ca: f64, thalach: f64) -> FeatureVector {
        let mut v = FeatureVector::new([0.0; 13]);
        v.set(Feature::Cp, cp);
        v.set(Feature::Ca, ca);
        v.set(Feature::Thalach, thalach);
        v
    }

    #[test]
    fn test_parse_logistic() {
        let artifact = ModelArtifact::from_json(LOGISTIC_ARTIFACT).unwrap();
        assert_eq!(artifact.kind(), ModelKind::LogisticRegression);
        let model = artifact.into_model();
        assert_eq!(
            model.explanation(),
            Explanation::LinearCoefficients(FeatureWeights::new(LOGISTIC_COEFFICIENTS))
        );
    }

    #[test]
    fn test_logistic_probability() {
        let model = LogisticRegression {
            coefficients: FeatureWeights::new([0.0; 13]),
            intercept: 0.0,
            scaler: None,
        };
        let [p0, p1] = model.predict_proba(&features(1.0, 0.0, 150.0)).unwrap();
        assert!((p1 - 0.5).abs() < 1e-12);
        assert!((p0 + p1 - 1.0).abs() < 1e-12);

        let mut coef = [0.0; 13];
        coef[Feature::Ca.index()] = 1.0;
        let model = LogisticRegression { coefficients: FeatureWeights::new(coef), intercept: -1.0, scaler: None };
        // z = -1 + 1 * 1 = 0
        assert!((model.predict_proba(&features(1.0, 1.0, 150.0)).unwrap()[1] - 0.5).abs() < 1e-12);
        // z = -1 + 3 = 2
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((model.predict_proba(&features(1.0, 3.0, 150.0)).unwrap()[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_scaler() {
        let mut coef = [0.0; 13];
        coef[Feature::Thalach.index()] = 1.0;
        let mut mean = [0.0; 13];
        mean[Feature::Thalach.index()] = 150.0;
        let mut scale = [0.0; 13];
        scale[Feature::Thalach.index()] = 25.0;
        let model = LogisticRegression {
            coefficients: FeatureWeights::new(coef),
            intercept: 0.0,
            scaler: Some(StandardScaler { mean: FeatureVector::new(mean), scale: FeatureVector::new(scale) }),
        };
        // (175 - 150) / 25 = 1; zero-scale columns are left unscaled
        assert!((model.decision_function(&features(4.0, 2.0, 175.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_extremes() {
        assert!(sigmoid(-800.0).is_finite());
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn test_decision_tree_routing() {
        let tree = match ModelArtifact::from_json(DECISION_TREE_ARTIFACT).unwrap() {
            ModelArtifact::DecisionTree(tree) => tree,
            other => panic!("unexpected artifact {:?}", other.kind()),
        };
        assert_eq!(tree.root.depth(), 2);
        assert!((tree.predict_proba(&features(1.0, 0.0, 150.0)).unwrap()[1] - 0.2).abs() < 1e-12);
        assert!((tree.predict_proba(&features(4.0, 0.0, 150.0)).unwrap()[1] - 0.5).abs() < 1e-12);
        assert!((tree.predict_proba(&features(4.0, 2.0, 150.0)).unwrap()[1] - 0.9).abs() < 1e-12);
        // threshold is inclusive on the left
        assert!((tree.predict_proba(&features(3.5, 2.0, 150.0)).unwrap()[1] - 0.2).abs() < 1e-12);
        assert_eq!(
            tree.explanation(),
            Explanation::TreeImportances(FeatureWeights::new(TREE_IMPORTANCES))
        );
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let model = ModelArtifact::from_json(RANDOM_FOREST_ARTIFACT).unwrap().into_model();
        assert_eq!(model.kind(), ModelKind::RandomForest);
        // tree 1 → 0.9, tree 2 → 0.8
        let p = model.predict_proba(&features(4.0, 2.0, 120.0)).unwrap()[1];
        assert!((p - 0.85).abs() < 1e-12);
        // tree 1 → 0.2, tree 2 → 0.2
        let p = model.predict_proba(&features(1.0, 0.0, 170.0)).unwrap()[1];
        assert!((p - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_tree_without_importances_is_unavailable() {
        let json = r#"{"kind": "decision_tree", "root": {"leaf": {"value": [1, 1]}}}"#;
        let model = ModelArtifact::from_json(json).unwrap().into_model();
        assert_eq!(model.explanation(), Explanation::Unavailable);
    }

    #[test]
    fn test_rejects_wrong_coefficient_count() {
        let json = r#"{"kind": "logistic_regression", "coefficients": [1, 2, 3], "intercept": 0}"#;
        assert!(ModelArtifact::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_empty_forest() {
        let json = r#"{"kind": "random_forest", "trees": []}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(MediriskError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_bad_leaf() {
        let json = r#"{"kind": "decision_tree", "root": {"leaf": {"value": [0, 0]}}}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(MediriskError::InvalidModel(_))));
        let json = r#"{"kind": "decision_tree", "root": {"leaf": {"value": [-1, 2]}}}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(MediriskError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_negative_importance() {
        let json = r#"{"kind": "decision_tree", "root": {"leaf": {"value": [1, 1]}},
            "feature_importances": [-0.1, 0.1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(MediriskError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_unknown_split_feature() {
        let json = r#"{"kind": "decision_tree", "root": {"split": {"feature": "bmi", "threshold": 25,
            "left": {"leaf": {"value": [1, 0]}}, "right": {"leaf": {"value": [0, 1]}}}}}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(MediriskError::Serialization(_))));
    }

    #[test]
    fn test_unnormalised_importances_reported_as_fractions() {
        let json = r#"{"kind": "decision_tree", "root": {"leaf": {"value": [1, 1]}},
            "feature_importances": [1.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]}"#;
        let model = ModelArtifact::from_json(json).unwrap().into_model();
        let weights = model.explanation().importances();
        assert!((weights.sum() - 1.0).abs() < 1e-12);
        assert!((weights.get(Feature::Age) - 0.2).abs() < 1e-12);

        let top = weights.top_k(crate::importance::TOP_K);
        assert_eq!(top[0].feature, Feature::Age);
        assert!(top.iter().all(|f| (0.0..=1.0).contains(&f.weight)));
        assert!(top.iter().map(|f| f.weight).sum::<f64>() <= 1.0);
    }
}
