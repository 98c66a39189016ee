//! MLflow tracking-server integration (model registry REST API) and the
//! model-server backed predictor.
//!
//! Registry calls go to the tracking server; predictions go to a model server
//! started with `mlflow models serve`, which exposes `POST /invocations`.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{FeatureFrame, ModelRegistry, Predictor, PredictorError, RegisteredModel, RegistryError};

const SEARCH_PATH: &str = "/api/2.0/mlflow/registered-models/search";
const DOWNLOAD_URI_PATH: &str = "/api/2.0/mlflow/model-versions/get-download-uri";
const ARTIFACTS_PATH: &str = "/api/2.0/mlflow-artifacts/artifacts";
const SEARCH_LIMIT: usize = 1000;

pub struct MlflowClient {
    client: Client,
    tracking_uri: String,
    scoring_uri: String,
}

impl MlflowClient {
    pub fn new(tracking_uri: impl Into<String>, scoring_uri: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            tracking_uri: trim_slash(tracking_uri.into()),
            scoring_uri: trim_slash(scoring_uri.into()),
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RegistryError> {
        let url = format!("{}{path}", self.tracking_uri);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| RegistryError::Request {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(RegistryError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        resp.json().map_err(|e| RegistryError::Decode {
            url,
            detail: e.to_string(),
        })
    }

    fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        let resp = self.client.get(url).send().map_err(|e| RegistryError::Request {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        resp.text().map_err(|e| RegistryError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    fn download_uri(&self, name: &str, version: u64) -> Result<String, RegistryError> {
        let version = version.to_string();
        let body: DownloadUriResponse =
            self.get_json(DOWNLOAD_URI_PATH, &[("name", name), ("version", &version)])?;
        Ok(body.artifact_uri)
    }
}

impl ModelRegistry for MlflowClient {
    fn search_registered_models(&self) -> Result<Vec<RegisteredModel>, RegistryError> {
        let limit = SEARCH_LIMIT.to_string();
        let body: SearchResponse = self.get_json(SEARCH_PATH, &[("max_results", &limit)])?;
        Ok(body.registered_models)
    }

    fn load_model(&self, name: &str, version: u64) -> Result<Box<dyn Predictor>, RegistryError> {
        let artifact_uri = self.download_uri(name, version)?;
        let mlmodel_url = mlmodel_url(&self.tracking_uri, &artifact_uri);
        tracing::debug!(model = name, version, url = %mlmodel_url, "fetching MLmodel");

        let mlmodel = self.fetch_text(&mlmodel_url)?;
        let features = super::signature::input_columns(&mlmodel)
            .ok_or_else(|| RegistryError::MissingSignature { artifact_uri })?;

        let served = self.served_model(features);
        tracing::info!(
            model = name,
            version,
            tracking = %self.tracking_uri,
            scoring = %served.invocations_url,
            "schema read from registry; predictions go to the scoring endpoint"
        );
        Ok(Box::new(served))
    }
}

impl MlflowClient {
    fn served_model(&self, features: Vec<String>) -> ServedModel {
        ServedModel {
            client: self.client.clone(),
            invocations_url: format!("{}/invocations", self.scoring_uri),
            features,
        }
    }
}

/// URL of the `MLmodel` file for an artifact URI.
///
/// `mlflow-artifacts:` URIs are resolved through the tracking server's
/// artifact proxy; plain HTTP(S) URIs are used directly.
pub fn mlmodel_url(tracking_uri: &str, artifact_uri: &str) -> String {
    let artifact_uri = artifact_uri.trim_end_matches('/');
    if let Some(path) = artifact_uri.strip_prefix("mlflow-artifacts:") {
        // Either `mlflow-artifacts:/path` or `mlflow-artifacts://host/path`.
        let path = match path.strip_prefix("//") {
            Some(rest) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => path.trim_start_matches('/'),
        };
        return format!("{tracking_uri}{ARTIFACTS_PATH}/{path}/MLmodel");
    }
    format!("{artifact_uri}/MLmodel")
}

fn trim_slash(s: String) -> String {
    s.trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    registered_models: Vec<RegisteredModel>,
}

#[derive(Debug, Deserialize)]
struct DownloadUriResponse {
    artifact_uri: String,
}

/// A registered model version served behind an MLflow scoring endpoint.
///
/// The input schema comes from the resolved registry version, but requests
/// always go to the configured scoring URI. That server must be serving the
/// same version (`mlflow models serve -m models:/<name>/latest`) for the
/// reported version to match the one that scores.
pub struct ServedModel {
    client: Client,
    invocations_url: String,
    features: Vec<String>,
}

impl Predictor for ServedModel {
    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<String, PredictorError> {
        let body = json!({
            "dataframe_split": {
                "columns": frame.columns,
                "data": [frame.values],
            }
        });

        let resp = self
            .client
            .post(&self.invocations_url)
            .json(&body)
            .send()
            .map_err(|e| PredictorError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(PredictorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = resp.json().map_err(|e| PredictorError::Decode(e.to_string()))?;
        first_prediction(&value)
    }
}

/// First prediction of a scoring response.
///
/// MLflow 2.x answers `{"predictions": [...]}`; older servers answer a bare
/// JSON array.
pub fn first_prediction(value: &serde_json::Value) -> Result<String, PredictorError> {
    let list = match value {
        serde_json::Value::Object(map) => map
            .get("predictions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| PredictorError::Decode("missing 'predictions' array".to_string()))?,
        serde_json::Value::Array(items) => items,
        other => return Err(PredictorError::Decode(format!("unexpected payload: {other}"))),
    };

    match list.first() {
        None => Err(PredictorError::Empty),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Null) => Err(PredictorError::Empty),
        Some(other) => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_proxied_artifact_uris() {
        let tracking = "http://127.0.0.1:5000";
        assert_eq!(
            mlmodel_url(tracking, "mlflow-artifacts:/1/abc/artifacts/model"),
            "http://127.0.0.1:5000/api/2.0/mlflow-artifacts/artifacts/1/abc/artifacts/model/MLmodel"
        );
        assert_eq!(
            mlmodel_url(tracking, "mlflow-artifacts://server:5000/1/abc/artifacts/model/"),
            "http://127.0.0.1:5000/api/2.0/mlflow-artifacts/artifacts/1/abc/artifacts/model/MLmodel"
        );
        assert_eq!(
            mlmodel_url(tracking, "https://store.example/models/7"),
            "https://store.example/models/7/MLmodel"
        );
    }

    #[test]
    fn served_model_posts_to_scoring_endpoint() {
        let client = MlflowClient::new("http://127.0.0.1:5000/", "http://scoring:5001/");
        let served = client.served_model(vec!["idade".to_string()]);
        assert_eq!(served.invocations_url, "http://scoring:5001/invocations");
        assert_eq!(served.feature_names(), ["idade".to_string()]);
    }

    #[test]
    fn parses_search_response() {
        let body = r#"{"registered_models": [{"name": "salario-model",
            "latest_versions": [{"version": "4", "current_stage": "None"}]}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.registered_models[0].latest_version(), Some(4));

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.registered_models.is_empty());
    }

    #[test]
    fn reads_first_prediction_in_both_shapes() {
        let wrapped = json!({"predictions": ["03 - R$ 6.001 a R$ 8.000"]});
        assert_eq!(first_prediction(&wrapped).unwrap(), "03 - R$ 6.001 a R$ 8.000");

        let bare = json!(["Pleno"]);
        assert_eq!(first_prediction(&bare).unwrap(), "Pleno");

        assert!(matches!(first_prediction(&json!({"predictions": []})), Err(PredictorError::Empty)));
        assert!(matches!(first_prediction(&json!({"error": "x"})), Err(PredictorError::Decode(_))));
    }

    #[test]
    fn frame_serializes_as_dataframe_split() {
        use crate::domain::FeatureValue;
        let frame = FeatureFrame {
            columns: vec!["idade".to_string(), "genero".to_string()],
            values: vec![FeatureValue::Int(30), FeatureValue::Text("Feminino".to_string())],
        };
        let body = json!({"dataframe_split": {"columns": frame.columns, "data": [frame.values]}});
        assert_eq!(
            body.to_string(),
            r#"{"dataframe_split":{"columns":["idade","genero"],"data":[[30,"Feminino"]]}}"#
        );
    }
}
