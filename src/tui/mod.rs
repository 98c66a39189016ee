//! Ratatui-based terminal UI.
//!
//! The TUI shows model and dataset information in a sidebar, the profile form
//! in three groups, and, after a submission, the estimated salary bracket with
//! its context metrics and an optional chart of reference salary bands.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::pipeline;
use crate::data::ReferenceTable;
use crate::domain::{Field, PredictionOutcome, SALARY_BANDS, matching_band};
use crate::error::AppError;
use crate::registry::LoadedModel;
use crate::report::{self, DatasetSummary};
use crate::session::Session;

mod form;
mod plotters_chart;

use form::{FormState, GROUPS};
use plotters_chart::{SalaryBandsChart, y_max_for};

/// Start the TUI.
pub fn run(session: Session) -> Result<(), AppError> {
    // Load both resources before touching the terminal so fatal errors print
    // normally.
    let mut app = App::new(session)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Result of the last submission.
enum Submission {
    Done(PredictionOutcome),
    Failed(String),
}

struct App {
    session: Session,
    table: Arc<ReferenceTable>,
    model: Arc<LoadedModel>,
    summary: DatasetSummary,
    form: FormState,
    submission: Option<Submission>,
    show_chart: bool,
    status: String,
}

impl App {
    fn new(session: Session) -> Result<Self, AppError> {
        let table = session.dataset()?;
        let model = session.model()?;
        let summary = DatasetSummary::of(&table);
        let form = FormState::new(&table);
        let status = format!("Modelo versão {} carregado.", model.version);
        Ok(Self {
            session,
            table,
            model,
            summary,
            form,
            submission: None,
            show_chart: false,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::BackTab => {
                self.form.focus_prev();
                self.status = self.form.focused().help().to_string();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form.focus_next();
                self.status = self.form.focused().help().to_string();
            }
            KeyCode::Left => self.form.step(-1),
            KeyCode::Right => self.form.step(1),
            KeyCode::PageDown => self.form.step(-10),
            KeyCode::PageUp => self.form.step(10),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) if c.is_ascii_digit() => self.form.type_digit(c),
            KeyCode::Char('c') => {
                self.show_chart = !self.show_chart;
            }
            KeyCode::Enter | KeyCode::Char('p') => self.submit()?,
            _ => {}
        }
        Ok(false)
    }

    /// Run one prediction. Cache reload failures are fatal; prediction
    /// failures are shown and the form stays usable.
    fn submit(&mut self) -> Result<(), AppError> {
        self.refresh_resources()?;

        let profile = match self.form.to_profile() {
            Ok(profile) => profile,
            Err(field) => {
                let msg = format!("Sem opções para {} na base de referência.", field.label());
                self.status = msg.clone();
                self.submission = Some(Submission::Failed(msg));
                return Ok(());
            }
        };

        match pipeline::run_prediction(&profile, self.model.predictor.as_ref(), &self.table) {
            Ok(outcome) => {
                self.status = format!("Faixa estimada: {}", outcome.bracket);
                self.submission = Some(Submission::Done(outcome));
            }
            Err(err) => {
                let msg = format!("Erro na predição: {err}");
                self.status = msg.clone();
                self.submission = Some(Submission::Failed(msg));
            }
        }
        Ok(())
    }

    fn refresh_resources(&mut self) -> Result<(), AppError> {
        let table = self.session.dataset()?;
        if !Arc::ptr_eq(&table, &self.table) {
            self.form.refresh(&table);
            self.summary = DatasetSummary::of(&table);
            self.table = table;
        }

        let model = self.session.model()?;
        if !Arc::ptr_eq(&model, &self.model) {
            tracing::info!(version = model.version, "model handle refreshed");
            self.model = model;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(4)])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_sidebar(frame, body[0]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(body[1]);
        self.draw_form(frame, main[0]);
        self.draw_result(frame, main[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                report::TITLE,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(report::TAGLINE, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let today = chrono::Local::now().format("%d/%m/%Y").to_string();

        let metric = |name: &'static str, v: String| {
            vec![Line::from(Span::styled(name, label)), Line::from(Span::styled(v, value))]
        };

        let mut lines = vec![Line::from(Span::styled(
            "Informações do Modelo",
            Style::default().fg(Color::Cyan),
        ))];
        lines.extend(metric("Versão", self.model.version.to_string()));
        lines.extend(metric("Última atualização", today));
        lines.extend(metric("Servidor MLflow", self.session.settings().tracking_uri.clone()));
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Estatísticas dos Dados",
            Style::default().fg(Color::Cyan),
        )));
        lines.extend(metric("Total de Registros", self.summary.total_rows.to_string()));
        lines.extend(metric("Cargos Únicos", self.summary.unique_job_titles.to_string()));
        lines.extend(metric("UFs Representadas", self.summary.unique_states.to_string()));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Seus Dados Profissionais").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(inner);

        let focused = self.form.focused();
        for (col, (title, fields)) in columns.iter().zip(GROUPS.iter()) {
            let mut lines = Vec::new();
            for &field in fields.iter() {
                let is_focused = field == focused;
                let marker = if is_focused { "» " } else { "  " };
                let label_style = if is_focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let label = match field {
                    Field::Age => {
                        let (lo, hi) = self.form.age_bounds();
                        format!("{} ({lo}-{hi})", field.label())
                    }
                    _ => field.label().to_string(),
                };
                lines.push(Line::from(Span::styled(format!("{marker}{label}"), label_style)));

                let value = self.form.display(field);
                let value_line = if is_focused {
                    Span::styled(
                        format!("  ‹ {value} ›"),
                        Style::default().fg(Color::Black).bg(Color::White),
                    )
                } else {
                    Span::raw(format!("    {value}"))
                };
                lines.push(Line::from(value_line));
            }

            let p = Paragraph::new(Text::from(lines))
                .block(Block::default().title(*title).borders(Borders::TOP));
            frame.render_widget(p, *col);
        }
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Estimativa Salarial").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let outcome = match &self.submission {
            None => {
                let msg = Paragraph::new("Preencha o formulário e pressione Enter para a previsão salarial.")
                    .style(Style::default().fg(Color::Gray));
                frame.render_widget(msg, inner);
                return;
            }
            Some(Submission::Failed(msg)) => {
                let p = Paragraph::new(msg.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                frame.render_widget(p, inner);
                return;
            }
            Some(Submission::Done(outcome)) => outcome,
        };

        let text_area = if self.show_chart {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(inner);
            self.draw_chart(frame, split[1], outcome);
            split[0]
        } else {
            inner
        };

        frame.render_widget(outcome_paragraph(outcome), text_area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, outcome: &PredictionOutcome) {
        let block = Block::default().title("Contexto Salarial por Nível").borders(Borders::LEFT);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let legend_height = SALARY_BANDS.len() as u16;
        if inner.height <= legend_height + 1 {
            return;
        }
        let chart_rect = Rect {
            height: inner.height - legend_height,
            ..inner
        };
        let legend_rect = Rect {
            y: inner.y + chart_rect.height,
            height: legend_height,
            ..inner
        };

        let highlight = matching_band(&outcome.bracket);
        let widget = SalaryBandsChart {
            bands: &SALARY_BANDS,
            highlight,
            y_max: y_max_for(&SALARY_BANDS),
            fmt_y: fmt_axis_brl,
        };
        frame.render_widget(widget, chart_rect);
        draw_band_legend(frame, legend_rect, highlight);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ campo  ←/→ valor  0-9 idade  Enter prever  c gráfico  q sair";
        let lines = vec![
            Line::from(vec![
                Span::styled(help, Style::default().fg(Color::Gray)),
                Span::raw(" | "),
                Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            ]),
            footer_credit(),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn footer_credit() -> Line<'static> {
    Line::from(Span::styled(report::FOOTER_CREDIT, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center)
}

fn outcome_paragraph(outcome: &PredictionOutcome) -> Paragraph<'static> {
    let heading = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Sua faixa salarial estimada: "),
            Span::styled(
                outcome.bracket.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::raw(""),
        Line::from(Span::styled("Informações Adicionais", heading)),
        Line::raw(format!(
            "  Perfis Similares na Base:    {}",
            outcome.context.similar_count
        )),
        Line::raw(format!(
            "  Representatividade do Cargo: {}",
            report::fmt_share(outcome.context.job_share)
        )),
        Line::raw(""),
        Line::from(Span::styled("Esta predição foi baseada em:", heading)),
    ];
    lines.extend(report::BASIS_LINES.iter().map(|l| Line::raw(format!("- {l}"))));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        report::DISCLAIMER_INTRO,
        Style::default().fg(Color::Yellow),
    )));
    lines.extend(report::DISCLAIMER_LINES.iter().map(|l| Line::raw(format!("- {l}"))));

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true })
}

fn draw_band_legend(frame: &mut ratatui::Frame<'_>, area: Rect, highlight: Option<usize>) {
    for (idx, band) in SALARY_BANDS.iter().enumerate() {
        let mut style = Style::default().fg(band_color(idx));
        if highlight == Some(idx) {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let line = Line::from(vec![
            Span::styled("■ ", style),
            Span::styled(format!("{:<13}", band.level), style),
            Span::styled(band.range, Style::default().fg(Color::Gray)),
        ]);
        let rect = Rect {
            y: area.y + idx as u16,
            height: 1,
            ..area
        };
        if rect.y < area.y + area.height {
            frame.render_widget(Paragraph::new(line), rect);
        }
    }
}

fn band_color(idx: usize) -> Color {
    let c = plotters_chart::BAND_COLORS[idx % plotters_chart::BAND_COLORS.len()];
    Color::Rgb(c.0, c.1, c.2)
}

fn fmt_axis_brl(v: f64) -> String {
    format!("{:.0}", v)
}
