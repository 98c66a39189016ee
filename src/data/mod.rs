//! Data sources.
//!
//! - `reference`: the historical profile table behind the form options and
//!   descriptive statistics

pub mod reference;

pub use reference::{DEFAULT_AGE, MAX_AGE, ReferenceRow, ReferenceTable, load_reference, read_reference};
