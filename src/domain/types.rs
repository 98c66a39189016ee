//! Shared domain types.
//!
//! Column names of the reference dataset and of the model's input schema are
//! modeled as a closed `Field` enum so that lookups are checked at compile
//! time instead of going through free-form strings.

use serde::{Deserialize, Serialize};

/// One input column of the salary model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Age,
    Gender,
    Disability,
    State,
    JobTitle,
    Seniority,
    ExperienceData,
    ExperienceIt,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 8] = [
        Field::Age,
        Field::Gender,
        Field::Disability,
        Field::State,
        Field::JobTitle,
        Field::Seniority,
        Field::ExperienceData,
        Field::ExperienceIt,
    ];

    /// Categorical fields (everything but age).
    pub const CATEGORICAL: [Field; 7] = [
        Field::Gender,
        Field::Disability,
        Field::State,
        Field::JobTitle,
        Field::Seniority,
        Field::ExperienceData,
        Field::ExperienceIt,
    ];

    /// Column name used in the CSV and in the model signature.
    pub fn column(self) -> &'static str {
        match self {
            Field::Age => "idade",
            Field::Gender => "genero",
            Field::Disability => "pcd",
            Field::State => "ufOndeMora",
            Field::JobTitle => "cargoAtual",
            Field::Seniority => "nivel",
            Field::ExperienceData => "tempoDeExperienciaDados",
            Field::ExperienceIt => "tempoDeExperienciaEmTi",
        }
    }

    pub fn from_column(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Idade",
            Field::Gender => "Gênero",
            Field::Disability => "Pessoa com Deficiência (PcD)",
            Field::State => "Estado (UF)",
            Field::JobTitle => "Cargo Atual",
            Field::Seniority => "Nível",
            Field::ExperienceData => "Tempo de Experiência em Dados",
            Field::ExperienceIt => "Tempo de Experiência em TI",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Field::Age => "Sua idade atual",
            Field::Gender => "Seu gênero",
            Field::Disability => "Você é uma pessoa com deficiência?",
            Field::State => "Estado onde você mora/trabalha",
            Field::JobTitle => "Seu cargo/função atual",
            Field::Seniority => "Seu nível de senioridade",
            Field::ExperienceData => "Há quanto tempo trabalha com dados?",
            Field::ExperienceIt => "Há quanto tempo trabalha com TI em geral?",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A single feature value as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Text(String),
}

/// A submitted professional profile (one row of model input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "idade")]
    pub age: i64,
    #[serde(rename = "genero")]
    pub gender: String,
    #[serde(rename = "pcd")]
    pub disability: String,
    #[serde(rename = "ufOndeMora")]
    pub state: String,
    #[serde(rename = "cargoAtual")]
    pub job_title: String,
    #[serde(rename = "nivel")]
    pub seniority: String,
    #[serde(rename = "tempoDeExperienciaDados")]
    pub experience_data: String,
    #[serde(rename = "tempoDeExperienciaEmTi")]
    pub experience_it: String,
}

impl Profile {
    /// Value of a categorical field; `None` for age.
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

    pub fn value(&self, field: Field) -> FeatureValue {
        match self.text(field) {
            Some(text) => FeatureValue::Text(text.to_string()),
            None => FeatureValue::Int(self.age),
        }
    }
}

/// A predicted salary bracket, already stripped of the label prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket(String);

impl Bracket {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Bracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statistics about the submitted profile relative to the reference dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileContext {
    /// Rows with the same seniority and state.
    pub similar_count: usize,
    /// Share (percent) of rows with the same job title.
    pub job_share: f64,
}

/// Full outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub bracket: Bracket,
    pub context: ProfileContext,
}

/// A reference salary band displayed in the context chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryBand {
    pub level: &'static str,
    pub range: &'static str,
    /// Bar height in R$.
    pub ceiling: f64,
}

pub const SALARY_BANDS: [SalaryBand; 4] = [
    SalaryBand {
        level: "Júnior",
        range: "R$ 3.000 - R$ 6.000",
        ceiling: 6000.0,
    },
    SalaryBand {
        level: "Pleno",
        range: "R$ 6.000 - R$ 12.000",
        ceiling: 12000.0,
    },
    SalaryBand {
        level: "Sênior",
        range: "R$ 12.000 - R$ 20.000",
        ceiling: 20000.0,
    },
    SalaryBand {
        level: "Especialista",
        range: "R$ 20.000+",
        ceiling: 30000.0,
    },
];

/// Index of the band whose level name appears in the bracket label, if any.
pub fn matching_band(bracket: &Bracket) -> Option<usize> {
    let label = bracket.as_str().to_lowercase();
    SALARY_BANDS
        .iter()
        .position(|band| label.contains(&band.level.to_lowercase()))
}
