//! Shared prediction pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! profile -> feature frame (model schema order) -> predict -> bracket -> context stats
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::ReferenceTable;
use crate::domain::{Bracket, Field, PredictionOutcome, Profile};
use crate::registry::{FeatureFrame, Predictor, PredictorError};

/// Separator between the ordinal prefix and the bracket in model labels
/// (`"05 - R$ 6.001 a R$ 8.000"`).
pub const LABEL_SEPARATOR: &str = "- ";

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("o modelo espera a coluna '{0}', que não existe no formulário")]
    UnknownFeature(String),

    #[error(transparent)]
    Predictor(#[from] PredictorError),

    #[error("rótulo inesperado do modelo: '{0}'")]
    MalformedLabel(String),
}

/// Select the profile fields named by the model schema, in schema order.
pub fn assemble_features(profile: &Profile, feature_names: &[String]) -> Result<FeatureFrame, PredictionError> {
    let mut columns = Vec::with_capacity(feature_names.len());
    let mut values = Vec::with_capacity(feature_names.len());
    for name in feature_names {
        let field = Field::from_column(name).ok_or_else(|| PredictionError::UnknownFeature(name.clone()))?;
        columns.push(name.clone());
        values.push(profile.value(field));
    }
    Ok(FeatureFrame { columns, values })
}

/// Strip the label prefix: keep what follows the last `"- "`.
///
/// A label without the separator is used as-is. A label that is empty after
/// stripping is rejected, so a returned bracket is never empty and never
/// contains the separator.
pub fn extract_bracket(raw: &str) -> Result<Bracket, PredictionError> {
    let tail = match raw.rfind(LABEL_SEPARATOR) {
        Some(idx) => &raw[idx + LABEL_SEPARATOR.len()..],
        None => raw,
    };
    let tail = tail.trim();
    if tail.is_empty() {
        return Err(PredictionError::MalformedLabel(raw.to_string()));
    }
    Ok(Bracket::new(tail))
}

/// Run the model on one profile and return the displayed bracket.
///
/// Failures are logged and returned; they never abort the session.
pub fn predict_bracket(profile: &Profile, predictor: &dyn Predictor) -> Result<Bracket, PredictionError> {
    let result = assemble_features(profile, predictor.feature_names())
        .and_then(|frame| predictor.predict(&frame).map_err(PredictionError::from))
        .and_then(|raw| {
            tracing::debug!(label = %raw, "raw model label");
            extract_bracket(&raw)
        });

    if let Err(err) = &result {
        tracing::error!(error = %err, "prediction failed");
    }
    result
}

/// Predict and attach the reference-dataset context for the same profile.
pub fn run_prediction(
    profile: &Profile,
    predictor: &dyn Predictor,
    table: &ReferenceTable,
) -> Result<PredictionOutcome, PredictionError> {
    let bracket = predict_bracket(profile, predictor)?;
    let context = crate::report::profile_context(profile, table);
    tracing::info!(
        bracket = %bracket,
        similar = context.similar_count,
        job_share = context.job_share,
        "prediction served"
    );
    Ok(PredictionOutcome { bracket, context })
}

/// Categorical fields whose value never occurs in the reference dataset.
pub fn unknown_values(profile: &Profile, table: &ReferenceTable) -> Vec<Field> {
    Field::CATEGORICAL
        .into_iter()
        .filter(|&f| {
            profile
                .text(f)
                .map(|value| !table.contains(f, value))
                .unwrap_or(false)
        })
        .collect()
}
