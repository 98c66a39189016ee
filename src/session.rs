//! One user session: settings plus the two cached, read-only resources.
//!
//! Both the model handle and the reference dataset are loaded lazily through
//! their caches and handed out as `Arc`s. Front-ends ask the session again on
//! every submission, so expired entries are reloaded transparently.

use std::sync::Arc;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::data::{ReferenceTable, load_reference};
use crate::error::AppError;
use crate::registry::{LoadedModel, MlflowClient, ModelProvider, ModelRegistry};

pub struct Session {
    settings: Settings,
    models: ModelProvider,
    dataset: TtlCache<ReferenceTable>,
}

impl Session {
    /// Session backed by the MLflow server named in `settings`.
    pub fn connect(settings: Settings) -> Self {
        let registry = MlflowClient::new(settings.tracking_uri.clone(), settings.scoring_uri.clone());
        Self::with_registry(settings, Box::new(registry))
    }

    pub fn with_registry(settings: Settings, registry: Box<dyn ModelRegistry>) -> Self {
        let models = ModelProvider::new(registry, settings.model_name.clone(), settings.model_ttl);
        let dataset = TtlCache::new(settings.data_ttl);
        Self {
            settings,
            models,
            dataset,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reference dataset; a missing or corrupt file ends the session.
    pub fn dataset(&self) -> Result<Arc<ReferenceTable>, AppError> {
        self.dataset
            .get_or_reload(|| load_reference(&self.settings.data_path))
            .inspect_err(|err| tracing::error!(error = %err, "reference dataset unavailable"))
    }

    /// Latest registered model; a registry failure ends the session.
    pub fn model(&self) -> Result<Arc<LoadedModel>, AppError> {
        self.models.load().map_err(|err| {
            let app_err = AppError::from(err);
            AppError::new(
                app_err.exit_code(),
                format!(
                    "{}\nVerifique se o MLflow está rodando em {}",
                    app_err.message(),
                    self.settings.tracking_uri
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::registry::testing::FakeRegistry;

    fn temp_csv(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("salary-predictor-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_dataset_once_per_window() {
        let path = temp_csv(
            "session.csv",
            "idade,genero,pcd,ufOndeMora,cargoAtual,nivel,tempoDeExperienciaDados,tempoDeExperienciaEmTi\n\
             30,M,Não,SP,A,Pleno,x,y\n",
        );
        let settings = Settings {
            data_path: path.clone(),
            ..Settings::default()
        };
        let session = Session::with_registry(settings, Box::new(FakeRegistry::with("salario-model", &["1"])));

        let a = session.dataset().unwrap();
        std::fs::remove_file(&path).unwrap();
        // Still served from the cache after the file is gone.
        let b = session.dataset().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn missing_model_mentions_tracking_server() {
        let session = Session::with_registry(
            Settings::default(),
            Box::new(FakeRegistry::with("other-model", &["1"])),
        );
        let err = session.model().unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("salario-model"));
        assert!(err.message().contains("http://127.0.0.1:5000"));
    }

    #[test]
    fn model_version_is_exposed() {
        let session = Session::with_registry(
            Settings::default(),
            Box::new(FakeRegistry::with("salario-model", &["1", "5"])),
        );
        assert_eq!(session.model().unwrap().version, 5);
    }
}
