//! Terminal plotting for the CLI.

pub mod ascii;

pub use ascii::render_band_chart;
