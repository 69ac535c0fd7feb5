//! Subcommand bodies, kept free of argument parsing and printing.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use medirisk_common::{ModelKind, ModelMetrics, PatientInput, RiskAssessment};
use medirisk_preprocess::{PreprocessReport, Preprocessor};
use medirisk_scorer::{assess, ModelRegistry};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;

/// Clean the raw record file, falling back to the configured paths.
pub fn preprocess(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<PreprocessReport> {
    let input = input.unwrap_or_else(|| config.data.raw_path.clone());
    let output = output.unwrap_or_else(|| config.data.cleaned_path.clone());

    let preprocessor = Preprocessor::new(config.data.preprocess.clone())?;
    let report = preprocessor
        .run(&input, &output)
        .with_context(|| format!("Preprocessing {} failed", input.display()))?;

    for column in &report.empty_columns {
        warn!("Column '{}' had no usable values", column);
    }
    Ok(report)
}

/// Read a patient from a JSON file, or from stdin when `path` is `-`.
pub fn read_patient(path: &Path) -> anyhow::Result<PatientInput> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read patient from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read patient file {}", path.display()))?
    };
    serde_json::from_str(&content).context("Patient input is not valid JSON")
}

pub fn assess_patient(
    registry: &ModelRegistry,
    patient: &PatientInput,
    kind: ModelKind,
) -> anyhow::Result<RiskAssessment> {
    let model = registry.get_or_load(kind)?;
    Ok(assess(patient, model.as_ref())?)
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub kind: ModelKind,
    pub name: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
}

/// Try every model kind and report which ones can be served.
pub fn model_statuses(registry: &ModelRegistry) -> Vec<ModelStatus> {
    let metrics = registry.metrics();
    let statuses: Vec<ModelStatus> = ModelKind::ALL
        .iter()
        .map(|&kind| {
            let error = registry.get_or_load(kind).err().map(|e| e.to_string());
            ModelStatus {
                kind,
                name: kind.display_name(),
                available: error.is_none(),
                error,
                metrics: metrics.get(&kind).cloned(),
            }
        })
        .collect();

    let available = statuses.iter().filter(|s| s.available).count();
    info!("{}/{} models available in {:?}", available, statuses.len(), registry.dir());
    statuses
}
