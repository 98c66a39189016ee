//! Reporting utilities: contextual statistics and formatted terminal output.

use crate::data::ReferenceTable;
use crate::domain::{Field, Profile, ProfileContext};

pub mod format;

pub use format::*;

/// Rows sharing the profile's seniority and state.
pub fn similar_count(table: &ReferenceTable, seniority: &str, state: &str) -> usize {
    table.count_where(|r| r.seniority == seniority && r.state == state)
}

/// Percentage of rows with the given job title; `0.0` for an empty table.
pub fn job_share(table: &ReferenceTable, job_title: &str) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let count = table.count_where(|r| r.job_title == job_title);
    count as f64 / table.len() as f64 * 100.0
}

pub fn profile_context(profile: &Profile, table: &ReferenceTable) -> ProfileContext {
    ProfileContext {
        similar_count: similar_count(table, &profile.seniority, &profile.state),
        job_share: job_share(table, &profile.job_title),
    }
}

/// Dataset-level metrics shown next to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub unique_job_titles: usize,
    pub unique_states: usize,
}

impl DatasetSummary {
    pub fn of(table: &ReferenceTable) -> Self {
        Self {
            total_rows: table.len(),
            unique_job_titles: table.unique_count(Field::JobTitle),
            unique_states: table.unique_count(Field::State),
        }
    }
}
