//! Input signature extraction from an MLflow `MLmodel` file.
//!
//! `MLmodel` is YAML. The part we need looks like:
//!
//! ```text
//! signature:
//!   inputs: '[{"type": "long", "name": "idade", "required": true}, {"type": "string",
//!     "name": "genero", "required": true}]'
//!   outputs: '[{"type": "string", "required": true}]'
//! ```
//!
//! The `inputs` value is a JSON document stored in a YAML string scalar.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MlModel {
    signature: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    inputs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ColumnSpec {
    name: Option<String>,
}

/// Ordered input column names, or `None` when the file carries no
/// column-based input signature.
pub fn input_columns(mlmodel: &str) -> Option<Vec<String>> {
    let model: MlModel = serde_yaml::from_str(mlmodel)
        .inspect_err(|err| tracing::warn!(error = %err, "MLmodel is not valid YAML"))
        .ok()?;
    let raw = model.signature?.inputs?;
    let specs: Vec<ColumnSpec> = serde_json::from_str(&raw).ok()?;
    let names: Option<Vec<String>> = specs.into_iter().map(|s| s.name).collect();
    names.filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDED: &str = "artifact_path: model
flavors:
  python_function:
    loader_module: mlflow.sklearn
signature:
  inputs: '[{\"type\": \"long\", \"name\": \"idade\", \"required\": true}, {\"type\": \"string\",
    \"name\": \"genero\", \"required\": true}, {\"type\": \"string\", \"name\": \"ufOndeMora\",
    \"required\": true}]'
  outputs: '[{\"type\": \"string\", \"required\": true}]'
  params: null
utc_time_created: '2024-05-01 12:00:00.000000'
";

    #[test]
    fn reads_folded_single_quoted_inputs() {
        let cols = input_columns(FOLDED).unwrap();
        assert_eq!(cols, vec!["idade", "genero", "ufOndeMora"]);
    }

    #[test]
    fn unescapes_doubled_quotes() {
        let text = "signature:\n  inputs: '[{\"name\": \"it''s\", \"type\": \"string\"}]'\n";
        assert_eq!(input_columns(text).unwrap(), vec!["it's"]);
    }

    #[test]
    fn reads_double_quoted_and_flow_style_inputs() {
        let double = "signature:\n  inputs: \"[{\\\"name\\\": \\\"idade\\\", \\\"type\\\": \\\"long\\\"}]\"\n";
        assert_eq!(input_columns(double).unwrap(), vec!["idade"]);

        let flow = "signature: {inputs: '[{\"name\": \"idade\", \"type\": \"long\"}]'}\n";
        assert_eq!(input_columns(flow).unwrap(), vec!["idade"]);
    }

    #[test]
    fn missing_or_tensor_signature_yields_none() {
        assert!(input_columns("flavors:\n  sklearn: {}\n").is_none());
        assert!(input_columns("signature:\n  inputs: null\n").is_none());
        assert!(input_columns("signature: [unclosed\n").is_none());
        // Tensor-based signatures have no column names.
        let tensor = "signature:\n  inputs: '[{\"type\": \"tensor\", \"tensor-spec\": {\"dtype\": \"float64\"}}]'\n";
        assert!(input_columns(tensor).is_none());
    }
}
