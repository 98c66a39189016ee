//! Formatted terminal output for the CLI subcommands.
//!
//! The TUI renders the same texts through widgets, so the static copy
//! (basis bullets, disclaimer) lives here once.

use crate::data::ReferenceTable;
use crate::domain::{Field, PredictionOutcome};
use crate::report::DatasetSummary;

pub const TITLE: &str = "Preditor de Salário - Área de Dados";
pub const TAGLINE: &str = "Descubra sua faixa salarial baseada no mercado atual de dados";

pub const BASIS_LINES: [&str; 3] = [
    "Dados do mercado brasileiro de tecnologia",
    "Seu perfil profissional informado",
    "Análise de salários por região e senioridade",
];

pub const DISCLAIMER_INTRO: &str = "Importante: Esta é uma estimativa baseada em dados históricos. \
Salários podem variar significativamente baseado em:";

pub const DISCLAIMER_LINES: [&str; 4] = [
    "Empresa e setor",
    "Benefícios oferecidos",
    "Negociação individual",
    "Conjuntura econômica atual",
];

pub const FOOTER_CREDIT: &str = "Desenvolvido com Rust e MLflow | Dados baseados no mercado brasileiro de tecnologia";

/// Job share as displayed: one decimal place.
pub fn fmt_share(share: f64) -> String {
    format!("{share:.1}%")
}

/// Format a prediction outcome with its context and disclaimer.
pub fn format_outcome(outcome: &PredictionOutcome) -> String {
    let mut out = String::new();

    out.push_str("=== Estimativa Salarial ===\n");
    out.push_str(&format!("Sua faixa salarial estimada: {}\n", outcome.bracket));

    out.push_str("\nEsta predição foi baseada em:\n");
    for line in BASIS_LINES {
        out.push_str(&format!("- {line}\n"));
    }

    out.push_str("\nInformações Adicionais:\n");
    out.push_str(&format!(
        "  Perfis Similares na Base:    {}\n",
        outcome.context.similar_count
    ));
    out.push_str(&format!(
        "  Representatividade do Cargo: {}\n",
        fmt_share(outcome.context.job_share)
    ));

    out.push('\n');
    out.push_str(DISCLAIMER_INTRO);
    out.push('\n');
    for line in DISCLAIMER_LINES {
        out.push_str(&format!("- {line}\n"));
    }

    out.push('\n');
    out.push_str(FOOTER_CREDIT);
    out.push('\n');
    out
}

/// Format the dataset metrics block.
pub fn format_summary(summary: &DatasetSummary, model_version: Option<u64>) -> String {
    let mut out = String::new();
    if let Some(version) = model_version {
        out.push_str("Informações do Modelo:\n");
        out.push_str(&format!("  Versão: {version}\n"));
        out.push_str(&format!(
            "  Última atualização: {}\n\n",
            chrono::Local::now().format("%d/%m/%Y")
        ));
    }
    out.push_str("Estatísticas dos Dados:\n");
    out.push_str(&format!("  Total de Registros: {}\n", summary.total_rows));
    out.push_str(&format!("  Cargos Únicos:      {}\n", summary.unique_job_titles));
    out.push_str(&format!("  UFs Representadas:  {}\n", summary.unique_states));
    out
}

/// Format the valid options of every form field.
pub fn format_options(table: &ReferenceTable) -> String {
    let mut out = String::new();
    let min_age = table
        .min_age()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("{} ({}): {min_age}..100\n", Field::Age.label(), Field::Age.column()));

    for field in Field::CATEGORICAL {
        out.push_str(&format!("\n{} ({}):\n", field.label(), field.column()));
        for value in table.distinct(field) {
            out.push_str(&format!("  - {value}\n"));
        }
    }
    out
}
