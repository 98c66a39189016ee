//! Model registry access and the model provider.
//!
//! The registry is an external service holding versioned, already-trained
//! models. This module only resolves the latest version of one named model and
//! loads it as a `Predictor`; it never registers, trains, or promotes models.
//!
//! - `ModelRegistry`: the registry seam (MLflow over HTTP in production,
//!   in-memory fakes in tests)
//! - `Predictor`: a loaded model with a declared input schema
//! - `ModelProvider`: latest-version resolution behind a `TtlCache`

use std::sync::Arc;

use serde::Deserialize;

use crate::cache::TtlCache;
use crate::domain::FeatureValue;

pub mod mlflow;
pub mod signature;

pub use mlflow::{MlflowClient, ServedModel};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Modelo '{name}' não encontrado no MLflow")]
    ModelNotFound { name: String },

    #[error("model '{name}' has no numeric version")]
    NoVersions { name: String },

    #[error("registry request to {url} failed: {detail}")]
    Request { url: String, detail: String },

    #[error("registry request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected registry response from {url}: {detail}")]
    Decode { url: String, detail: String },

    #[error("model at '{artifact_uri}' has no column-based input signature")]
    MissingSignature { artifact_uri: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("scoring request failed: {0}")]
    Request(String),

    #[error("scoring server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected scoring response: {0}")]
    Decode(String),

    #[error("model returned no prediction")]
    Empty,
}

/// A registered model as listed by the registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredModel {
    pub name: String,
    #[serde(default)]
    pub latest_versions: Vec<ModelVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelVersion {
    pub version: String,
}

impl RegisteredModel {
    /// Highest integer version among `latest_versions`.
    pub fn latest_version(&self) -> Option<u64> {
        self.latest_versions
            .iter()
            .filter_map(|v| v.version.trim().parse::<u64>().ok())
            .max()
    }
}

/// A single model input row: column names paired with values, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub columns: Vec<String>,
    pub values: Vec<FeatureValue>,
}

/// A loaded model.
pub trait Predictor: Send + Sync {
    /// Input columns the model was trained on, in training order.
    fn feature_names(&self) -> &[String];

    /// Raw label predicted for a single row.
    fn predict(&self, frame: &FeatureFrame) -> Result<String, PredictorError>;
}

pub trait ModelRegistry: Send + Sync {
    fn search_registered_models(&self) -> Result<Vec<RegisteredModel>, RegistryError>;

    fn load_model(&self, name: &str, version: u64) -> Result<Box<dyn Predictor>, RegistryError>;
}

/// A predictor together with the registry version it was loaded from.
pub struct LoadedModel {
    pub predictor: Box<dyn Predictor>,
    pub version: u64,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("version", &self.version)
            .field("features", &self.predictor.feature_names())
            .finish()
    }
}

/// Resolve the latest version of `name` and load it.
pub fn load_latest(registry: &dyn ModelRegistry, name: &str) -> Result<LoadedModel, RegistryError> {
    let result = resolve_and_load(registry, name);
    match &result {
        Ok(model) => tracing::info!(model = name, version = model.version, "model loaded"),
        Err(err) => tracing::error!(model = name, error = %err, "model load failed"),
    }
    result
}

fn resolve_and_load(registry: &dyn ModelRegistry, name: &str) -> Result<LoadedModel, RegistryError> {
    let models = registry.search_registered_models()?;
    let model = models
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| RegistryError::ModelNotFound {
            name: name.to_string(),
        })?;

    let version = model.latest_version().ok_or_else(|| RegistryError::NoVersions {
        name: name.to_string(),
    })?;

    let predictor = registry.load_model(name, version)?;
    Ok(LoadedModel { predictor, version })
}

/// Latest-version model handle, cached for a fixed time window.
pub struct ModelProvider {
    registry: Box<dyn ModelRegistry>,
    model_name: String,
    cache: TtlCache<LoadedModel>,
}

impl ModelProvider {
    pub fn new(registry: Box<dyn ModelRegistry>, model_name: impl Into<String>, ttl: std::time::Duration) -> Self {
        Self {
            registry,
            model_name: model_name.into(),
            cache: TtlCache::new(ttl),
        }
    }

    /// Cached model, reloading from the registry once the TTL has elapsed.
    pub fn load(&self) -> Result<Arc<LoadedModel>, RegistryError> {
        self.cache
            .get_or_reload(|| load_latest(self.registry.as_ref(), &self.model_name))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory registry and predictor doubles.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    pub struct FixedPredictor {
        pub features: Vec<String>,
        pub label: Result<String, String>,
        pub seen: Mutex<Vec<FeatureFrame>>,
    }

    impl FixedPredictor {
        pub fn returning(features: &[&str], label: &str) -> Self {
            Self {
                features: features.iter().map(|s| s.to_string()).collect(),
                label: Ok(label.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(features: &[&str], message: &str) -> Self {
            Self {
                features: features.iter().map(|s| s.to_string()).collect(),
                label: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Predictor for FixedPredictor {
        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn predict(&self, frame: &FeatureFrame) -> Result<String, PredictorError> {
            self.seen.lock().unwrap().push(frame.clone());
            self.label.clone().map_err(PredictorError::Request)
        }
    }

    pub struct FakeRegistry {
        pub models: Vec<RegisteredModel>,
        pub loads: Arc<AtomicUsize>,
        pub loaded_versions: Mutex<Vec<u64>>,
    }

    impl FakeRegistry {
        pub fn with(name: &str, versions: &[&str]) -> Self {
            Self {
                models: vec![RegisteredModel {
                    name: name.to_string(),
                    latest_versions: versions
                        .iter()
                        .map(|v| ModelVersion { version: v.to_string() })
                        .collect(),
                }],
                loads: Arc::new(AtomicUsize::new(0)),
                loaded_versions: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelRegistry for FakeRegistry {
        fn search_registered_models(&self) -> Result<Vec<RegisteredModel>, RegistryError> {
            Ok(self.models.clone())
        }

        fn load_model(&self, _name: &str, version: u64) -> Result<Box<dyn Predictor>, RegistryError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.loaded_versions.lock().unwrap().push(version);
            Ok(Box::new(FixedPredictor::returning(&["idade"], "Faixa - Pleno")))
        }
    }
}
