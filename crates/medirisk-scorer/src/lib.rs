//! medirisk-scorer: patient encoding, risk prediction and explanation.
//!
//! [`encode`] maps a [`PatientInput`](medirisk_common::PatientInput) onto the
//! 13-feature schema, [`score`] runs a [`RiskModel`] over it and ranks the
//! features that drive the model, and [`ModelRegistry`] keeps loaded models
//! around between calls.

pub mod artifact;
pub mod encoder;
pub mod importance;
pub mod model;
pub mod registry;
pub mod scorer;

pub use artifact::{load_artifact, ModelArtifact};
pub use encoder::encode;
pub use importance::{Explanation, FeatureWeights, TOP_K};
pub use model::{MockRiskModel, RiskModel};
pub use registry::ModelRegistry;
pub use scorer::{assess, categorize, explain, score};
