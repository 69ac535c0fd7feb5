//! medirisk-common: feature schema, shared entities and the error type used
//! across all MediRisk crates.

pub mod error;
pub mod entities;
pub mod schema;

pub use entities::{
    CleanedRecord, ModelKind, ModelMetrics, PatientInput, RiskAssessment, RiskCategory, RiskFactor,
};
pub use error::{MediriskError, Result};
pub use schema::{Feature, FeatureVector, FEATURE_COUNT, RECORD_WIDTH, TARGET_COLUMN};
