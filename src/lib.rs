//! `salary-predictor` library crate.
//!
//! The binary (`salary`) is a thin wrapper around this library so that:
//!
//! - the prediction pipeline is testable without spawning processes
//! - the registry, dataset, and presentation layers stay separately reusable
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod registry;
pub mod report;
pub mod session;
pub mod tui;
