//! Model registry with load-once caching.
//!
//! Models are read from disk the first time they are requested and shared
//! behind `Arc` afterwards. Tests and operators can drop or reload entries
//! explicitly.
//!
//! # Example
//!
//! ```rust,no_run
//! use medirisk_common::{ModelKind, PatientInput};
//! use medirisk_scorer::{assess, ModelRegistry};
//!
//! fn main() -> medirisk_common::Result<()> {
//!     let registry = ModelRegistry::init_global("models");
//!     let model = registry.get_or_load(ModelKind::RandomForest)?;
//!     let assessment = assess(&PatientInput::default(), model.as_ref())?;
//!     println!("{} ({:.2})", assessment.category, assessment.probability);
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use medirisk_common::{MediriskError, ModelKind, ModelMetrics, Result};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::artifact::load_artifact;
use crate::model::RiskModel;

/// Metrics file name inside the model directory.
pub const METRICS_FILE: &str = "model_metrics.json";

pub struct ModelRegistry {
    dir: PathBuf,
    models: RwLock<HashMap<ModelKind, Arc<dyn RiskModel>>>,
    metrics: OnceCell<HashMap<ModelKind, ModelMetrics>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("dir", &self.dir)
            .field("models", &self.models.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModelRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            models: RwLock::new(HashMap::new()),
            metrics: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, kind: ModelKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Return the cached model, loading it on first use.
    ///
    /// Any load failure is reported as [`MediriskError::ModelUnavailable`].
    pub fn get_or_load(&self, kind: ModelKind) -> Result<Arc<dyn RiskModel>> {
        if let Some(model) = self.models.read().get(&kind) {
            debug!("Model cache hit: {}", kind);
            return Ok(Arc::clone(model));
        }

        let mut models = self.models.write();
        // Another caller may have loaded it while we waited for the lock.
        if let Some(model) = models.get(&kind) {
            return Ok(Arc::clone(model));
        }

        let model = self.load(kind)?;
        models.insert(kind, Arc::clone(&model));
        info!("Model cached: {} ({} models in cache)", kind, models.len());
        Ok(model)
    }

    fn load(&self, kind: ModelKind) -> Result<Arc<dyn RiskModel>> {
        let path = self.artifact_path(kind);
        info!("Loading {} from {:?}", kind.display_name(), path);

        let unavailable = |reason: String| MediriskError::ModelUnavailable {
            model: kind.to_string(),
            reason,
        };

        let artifact = load_artifact(&path).map_err(|e| unavailable(e.to_string()))?;
        if artifact.kind() != kind {
            return Err(unavailable(format!(
                "{:?} contains a {} model",
                path,
                artifact.kind()
            )));
        }
        Ok(artifact.into_model())
    }

    /// Register an already-built model, replacing any cached one.
    pub fn insert(&self, kind: ModelKind, model: Arc<dyn RiskModel>) {
        self.models.write().insert(kind, model);
    }

    pub fn is_cached(&self, kind: ModelKind) -> bool {
        self.models.read().contains_key(&kind)
    }

    pub fn cached_count(&self) -> usize {
        self.models.read().len()
    }

    /// Drop one cached model; the next request reloads it from disk.
    pub fn invalidate(&self, kind: ModelKind) -> bool {
        let removed = self.models.write().remove(&kind).is_some();
        if removed {
            info!("Invalidated cached model: {}", kind);
        }
        removed
    }

    pub fn clear(&self) {
        let mut models = self.models.write();
        let count = models.len();
        models.clear();
        info!("Cleared {} models from cache", count);
    }

    /// Invalidate and load again.
    pub fn reload(&self, kind: ModelKind) -> Result<Arc<dyn RiskModel>> {
        self.invalidate(kind);
        self.get_or_load(kind)
    }

    /// Training metrics per model, read once. A missing or unreadable file
    /// yields no metrics.
    pub fn metrics(&self) -> &HashMap<ModelKind, ModelMetrics> {
        self.metrics.get_or_init(|| {
            let path = self.dir.join(METRICS_FILE);
            if !path.exists() {
                debug!("No metrics file at {:?}", path);
                return HashMap::new();
            }
            match std::fs::read_to_string(&path)
                .map_err(MediriskError::from)
                .and_then(|s| serde_json::from_str(&s).map_err(MediriskError::from))
            {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!("Could not read model metrics from {:?}: {}", path, e);
                    HashMap::new()
                }
            }
        })
    }
}

// Global registry instance
static GLOBAL_REGISTRY: OnceCell<Arc<ModelRegistry>> = OnceCell::new();

impl ModelRegistry {
    /// Initialise the global registry. Later calls return the first instance
    /// regardless of `dir`.
    pub fn init_global(dir: impl Into<PathBuf>) -> Arc<ModelRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| {
                let registry = ModelRegistry::new(dir);
                info!("Initializing global model registry at {:?}", registry.dir);
                Arc::new(registry)
            })
            .clone()
    }

    /// The global registry, if initialised.
    pub fn global() -> Option<Arc<ModelRegistry>> {
        GLOBAL_REGISTRY.get().cloned()
    }
}
