//! Reference dataset loading and querying.
//!
//! The reference dataset is the historical profile table the model was trained
//! on. Here it is only used to:
//!
//! - populate the valid options for each form field
//! - compute descriptive counts for the sidebar and the result panel
//!
//! Rows are parsed into typed `ReferenceRow`s. Columns not used by the form
//! (e.g. the salary bracket label) are ignored.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Field;
use crate::error::AppError;

pub const MAX_AGE: i64 = 100;
pub const DEFAULT_AGE: i64 = 30;

/// One historical observation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceRow {
    /// `None` when the source cell is empty.
    pub age: Option<i64>,
    pub gender: String,
    pub disability: String,
    pub state: String,
    pub job_title: String,
    pub seniority: String,
    pub experience_data: String,
    pub experience_it: String,
}

impl ReferenceRow {
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Age => None,
            Field::Gender => Some(&self.gender),
            Field::Disability => Some(&self.disability),
            Field::State => Some(&self.state),
            Field::JobTitle => Some(&self.job_title),
            Field::Seniority => Some(&self.seniority),
            Field::ExperienceData => Some(&self.experience_data),
            Field::ExperienceIt => Some(&self.experience_it),
        }
    }
}

/// Immutable in-memory reference table.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted distinct values of a categorical column.
    ///
    /// Every option offered by the form comes from here, so a value is only
    /// ever selectable if it occurs in at least one row.
    pub fn distinct(&self, field: Field) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().filter_map(|r| r.text(field)).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn unique_count(&self, field: Field) -> usize {
        match field {
            Field::Age => self
                .rows
                .iter()
                .filter_map(|r| r.age)
                .collect::<BTreeSet<_>>()
                .len(),
            _ => self
                .rows
                .iter()
                .filter_map(|r| r.text(field))
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }

    pub fn min_age(&self) -> Option<i64> {
        self.rows.iter().filter_map(|r| r.age).min()
    }

    /// Inclusive range accepted by the age input: dataset minimum up to
    /// `MAX_AGE` (0 when the dataset has no ages).
    pub fn age_bounds(&self) -> (i64, i64) {
        let min = self.min_age().unwrap_or(0).clamp(0, MAX_AGE);
        (min, MAX_AGE)
    }

    pub fn count_where(&self, predicate: impl Fn(&ReferenceRow) -> bool) -> usize {
        self.rows.iter().filter(|r| predicate(r)).count()
    }

    /// Whether `value` occurs in the given categorical column.
    pub fn contains(&self, field: Field, value: &str) -> bool {
        self.rows.iter().any(|r| r.text(field) == Some(value))
    }
}

/// Load the reference CSV from disk.
pub fn load_reference(path: &Path) -> Result<ReferenceTable, AppError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::new(2, format!("Arquivo '{}' não encontrado", path.display()))
        } else {
            AppError::new(
                2,
                format!("Erro ao carregar dados '{}': {e}", path.display()),
            )
        }
    })?;

    let table = read_reference(file)
        .map_err(|e| AppError::new(2, format!("Erro ao carregar dados '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), rows = table.len(), "reference dataset loaded");
    Ok(table)
}

/// Parse a reference table from any reader (CSV with a header row).
pub fn read_reference<R: Read>(reader: R) -> Result<ReferenceTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| format!("failed to read CSV headers: {e}"))?
        .clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<&str> = Field::ALL
        .iter()
        .map(|f| f.column())
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required column(s): {}", missing.join(", ")));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| format!("line {line}: CSV parse error: {e}"))?;
        let row = parse_row(&record, &header_map).map_err(|e| format!("line {line}: {e}"))?;
        rows.push(row);
    }

    Ok(ReferenceTable::from_rows(rows))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ReferenceRow, String> {
    let get = |field: Field| -> String {
        header_map
            .get(field.column())
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .to_string()
    };

    let age = parse_age(&get(Field::Age))?;

    Ok(ReferenceRow {
        age,
        gender: get(Field::Gender),
        disability: get(Field::Disability),
        state: get(Field::State),
        job_title: get(Field::JobTitle),
        seniority: get(Field::Seniority),
        experience_data: get(Field::ExperienceData),
        experience_it: get(Field::ExperienceIt),
    })
}

/// Ages may be exported as floats (`"30.0"`); empty cells are missing values.
fn parse_age(raw: &str) -> Result<Option<i64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(Some(v));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v.trunc() as i64)),
        _ => Err(format!("invalid idade '{trimmed}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "idade,genero,pcd,ufOndeMora,cargoAtual,nivel,tempoDeExperienciaDados,tempoDeExperienciaEmTi,faixaSalarial";

    fn csv_text(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out
    }

    #[test]
    fn reads_rows_and_ignores_extra_columns() {
        let text = csv_text(&[
            "30,Masculino,Não,SP,Data Engineer,Pleno,de 1 a 2 anos,de 3 a 4 anos,05 - R$ 6.000",
            "25.0,Feminino,Não,RJ,Cientista de Dados,Júnior,Menos de 1 ano,de 1 a 2 anos,03 - R$ 3.000",
        ]);
        let table = read_reference(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.min_age(), Some(25));
        assert_eq!(table.age_bounds(), (25, MAX_AGE));
        assert!(table.contains(Field::JobTitle, "Data Engineer"));
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let text = csv_text(&[
            "30,M,Não,SP,A,Pleno,x,y,z",
            "31,M,Não,MG,B,Pleno,x,y,z",
            "32,F,Não,SP,A,Sênior,x,y,z",
        ]);
        let table = read_reference(text.as_bytes()).unwrap();
        assert_eq!(table.distinct(Field::State), vec!["MG", "SP"]);
        assert_eq!(table.unique_count(Field::JobTitle), 2);
        assert!(table.contains(Field::Seniority, "Sênior"));
        assert!(!table.contains(Field::Seniority, "Gerente"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let text = "idade,genero\n30,M";
        let err = read_reference(text.as_bytes()).unwrap_err();
        assert!(err.contains("pcd"), "unexpected error: {err}");
    }

    #[test]
    fn bom_prefixed_header_is_accepted() {
        let text = format!("\u{feff}{}", csv_text(&["40,M,Não,SP,A,Pleno,x,y,z"]));
        let table = read_reference(text.as_bytes()).unwrap();
        assert_eq!(table.min_age(), Some(40));
    }

    #[test]
    fn empty_age_is_missing_but_garbage_fails() {
        let ok = csv_text(&[",M,Não,SP,A,Pleno,x,y,z"]);
        let table = read_reference(ok.as_bytes()).unwrap();
        assert_eq!(table.min_age(), None);
        assert_eq!(table.age_bounds(), (0, MAX_AGE));

        let bad = csv_text(&["trinta,M,Não,SP,A,Pleno,x,y,z"]);
        let err = read_reference(bad.as_bytes()).unwrap_err();
        assert!(err.starts_with("line 2"), "unexpected error: {err}");
    }

    #[test]
    fn missing_file_reports_not_found() {
        let path = std::env::temp_dir().join("salary-predictor-does-not-exist.csv");
        let err = load_reference(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("não encontrado"));
    }
}
