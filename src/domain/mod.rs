//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model input columns (`Field`) and a submitted `Profile`
//! - prediction outputs (`Bracket`, `ProfileContext`, `PredictionOutcome`)
//! - the reference salary bands shown in the context chart

pub mod types;

pub use types::*;
