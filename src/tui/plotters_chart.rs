//! Plotters-powered salary band chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! Band names and ranges are drawn by Ratatui underneath the chart (see
//! `tui::draw_band_legend`), because Plotters places x tick labels by value,
//! not by category.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::SalaryBand;

/// Bar fill per band, in `SALARY_BANDS` order.
pub const BAND_COLORS: [RGBColor; 4] = [
    RGBColor(0xff, 0x99, 0x99),
    RGBColor(0x66, 0xb3, 0xff),
    RGBColor(0x99, 0xff, 0x99),
    RGBColor(0xff, 0xcc, 0x99),
];

/// A lightweight, render-only chart description.
pub struct SalaryBandsChart<'a> {
    pub bands: &'a [SalaryBand],
    /// Band matching the predicted bracket, outlined in white.
    pub highlight: Option<usize>,
    /// Y upper bound (R$).
    pub y_max: f64,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SalaryBandsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.bands.len();
        if n == 0 || !(self.y_max.is_finite() && self.y_max > 0.0) {
            return;
        }
        let x1 = n as f64;
        let y1 = self.y_max;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 1)
                .build_cartesian_2d(0.0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(5)
                .y_desc("Salário (R$)")
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            for (idx, band) in self.bands.iter().enumerate() {
                let x0 = idx as f64 + 0.15;
                let x1 = idx as f64 + 0.85;
                let color = BAND_COLORS[idx % BAND_COLORS.len()];
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x0, 0.0), (x1, band.ceiling)],
                    color.filled(),
                )))?;
                if self.highlight == Some(idx) {
                    chart.draw_series(std::iter::once(Rectangle::new(
                        [(x0, 0.0), (x1, band.ceiling)],
                        WHITE.stroke_width(1),
                    )))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Y bound with headroom above the tallest band.
pub fn y_max_for(bands: &[SalaryBand]) -> f64 {
    let max = bands.iter().map(|b| b.ceiling).fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SALARY_BANDS;

    #[test]
    fn y_bound_leaves_headroom() {
        assert!((y_max_for(&SALARY_BANDS) - 33000.0).abs() < 1e-6);
        assert_eq!(y_max_for(&[]), 1.0);
    }

    fn chart(highlight: Option<usize>) -> SalaryBandsChart<'static> {
        SalaryBandsChart {
            bands: &SALARY_BANDS,
            highlight,
            y_max: y_max_for(&SALARY_BANDS),
            fmt_y: |v| format!("{v:.0}"),
        }
    }

    #[test]
    fn renders_bands_into_buffer() {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        chart(Some(1)).render(area, &mut buf);
        assert!(
            buf.content()
                .iter()
                .any(|c| c.symbol() != " " || c.bg != Color::Reset || c.fg != Color::Reset)
        );
    }

    #[test]
    fn tiny_area_shows_hint() {
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        chart(None).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Chart area too small"));
    }

    #[test]
    fn one_color_per_band() {
        assert_eq!(BAND_COLORS.len(), SALARY_BANDS.len());
    }
}
