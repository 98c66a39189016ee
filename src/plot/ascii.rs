//! ASCII bar chart of the reference salary bands for terminal output.
//!
//! This is intentionally "dumb" (fixed-width rows), optimized for:
//! - quick visual context in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - band bar: `=`
//! - band matching the predicted bracket: `#`

use crate::domain::SalaryBand;

pub const CHART_TITLE: &str = "Contexto Salarial por Nível";

/// Render one horizontal bar per band, scaled to `width` columns.
pub fn render_band_chart(bands: &[SalaryBand], highlight: Option<usize>, width: usize) -> String {
    let width = width.max(10);
    let max = bands.iter().map(|b| b.ceiling).fold(0.0_f64, f64::max);
    let label_width = bands.iter().map(|b| b.level.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{CHART_TITLE} (R$)\n"));

    for (idx, band) in bands.iter().enumerate() {
        let len = bar_len(band.ceiling, max, width);
        let ch = if highlight == Some(idx) { '#' } else { '=' };
        let bar: String = std::iter::repeat_n(ch, len)
            .chain(std::iter::repeat_n(' ', width - len))
            .collect();
        out.push_str(&format!(
            "{:<label_width$} |{bar}| {}\n",
            band.level, band.range
        ));
    }

    out
}

fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if !(max.is_finite() && max > 0.0 && value.is_finite()) {
        return 0;
    }
    let u = (value / max).clamp(0.0, 1.0);
    (u * width as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SALARY_BANDS;

    #[test]
    fn chart_golden_snapshot_small() {
        let txt = render_band_chart(&SALARY_BANDS, Some(1), 10);
        let expected = concat!(
            "Contexto Salarial por Nível (R$)\n",
            "Júnior       |==        | R$ 3.000 - R$ 6.000\n",
            "Pleno        |####      | R$ 6.000 - R$ 12.000\n",
            "Sênior       |=======   | R$ 12.000 - R$ 20.000\n",
            "Especialista |==========| R$ 20.000+\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_band_list_renders_title_only() {
        assert_eq!(render_band_chart(&[], None, 20), "Contexto Salarial por Nível (R$)\n");
    }
}
