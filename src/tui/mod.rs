//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a start date, end date and
//! region, then renders four panels for the loaded period: consumption over
//! time, the peak-day summary, stacked production by source, and the
//! production mix as a pie.

use std::io;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::info;

use crate::app::pipeline::{self, RunOutput};
use crate::cli::{TuiArgs, parse_date};
use crate::data::{Eco2mixClient, PageSource, fetch_regions};
use crate::domain::ProductionSource;
use crate::error::{AppError, EXIT_RUNTIME};
use crate::query::Query;

mod plotters_chart;
pub mod series;

use plotters_chart::{Layer, MixPie, SeriesChart};
use series::TimeAxis;

const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_REGION: usize = 2;

/// Start the TUI.
pub fn run(client: Eco2mixClient, args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(client, args);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_RUNTIME, format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Warn,
    Error,
}

impl StatusKind {
    fn color(self) -> Color {
        match self {
            StatusKind::Info => Color::Yellow,
            StatusKind::Warn => Color::LightRed,
            StatusKind::Error => Color::Red,
        }
    }
}

/// Shell state. Owned here and passed explicitly into the pipeline.
struct App<S> {
    source: S,
    regions: Vec<String>,
    region_idx: usize,
    start_input: String,
    end_input: String,
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    status: String,
    status_kind: StatusKind,
    /// Set by the load key; the load runs after the "Loading…" frame is drawn.
    pending_load: bool,
    run: Option<RunOutput>,
    load_error: Option<String>,
}

impl<S: PageSource> App<S> {
    fn new(source: S, args: TuiArgs) -> Self {
        let today = Local::now().date_naive();
        let start = args
            .start
            .unwrap_or_else(|| today.checked_sub_days(Days::new(1)).unwrap_or(today));
        let end = args.end.unwrap_or(today);

        let mut app = Self {
            source,
            regions: Vec::new(),
            region_idx: 0,
            start_input: fmt_date(start),
            end_input: fmt_date(end),
            selected_field: FIELD_START,
            editing: false,
            edit_buffer: String::new(),
            status: String::new(),
            status_kind: StatusKind::Info,
            pending_load: false,
            run: None,
            load_error: None,
        };
        app.refresh_regions();

        if let Some(wanted) = &args.region {
            match app.regions.iter().position(|r| r == wanted) {
                Some(idx) => app.region_idx = idx,
                None if !app.regions.is_empty() => {
                    app.set_status(StatusKind::Warn, format!("Unknown region '{wanted}', using {}.", app.regions[0]));
                }
                None => {}
            }
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if self.pending_load {
                self.pending_load = false;
                self.load();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_REGION {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter if self.selected_field != FIELD_REGION => {
                self.editing = true;
                self.edit_buffer.clear();
                self.set_status(StatusKind::Info, "Editing date (DD/MM/YYYY). Enter to apply, Esc to cancel.");
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                self.set_status(StatusKind::Info, "Loading data…");
                self.pending_load = true;
            }
            KeyCode::Char('g') => self.refresh_regions(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.set_status(StatusKind::Info, "Date edit canceled.");
            }
            KeyCode::Enter => {
                self.editing = false;
                match parse_date(&self.edit_buffer) {
                    Ok(date) => {
                        *self.date_input_mut() = fmt_date(date);
                        self.set_status(StatusKind::Info, "Press l to load.");
                    }
                    Err(msg) => self.set_status(StatusKind::Error, msg),
                }
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '/' || c == '-' {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_START | FIELD_END => {
                let Ok(date) = parse_date(self.date_input_mut()) else {
                    return;
                };
                let shifted = if delta >= 0 {
                    date.checked_add_days(Days::new(1))
                } else {
                    date.checked_sub_days(Days::new(1))
                };
                if let Some(d) = shifted {
                    *self.date_input_mut() = fmt_date(d);
                }
            }
            FIELD_REGION => {
                let n = self.regions.len();
                if n == 0 {
                    return;
                }
                self.region_idx = if delta >= 0 {
                    (self.region_idx + 1) % n
                } else {
                    (self.region_idx + n - 1) % n
                };
            }
            _ => {}
        }
    }

    fn date_input_mut(&mut self) -> &mut String {
        if self.selected_field == FIELD_END {
            &mut self.end_input
        } else {
            &mut self.start_input
        }
    }

    fn refresh_regions(&mut self) {
        match fetch_regions(&self.source) {
            Ok(regions) if regions.is_empty() => {
                self.set_status(StatusKind::Error, "The API returned no regions. Press g to retry.");
            }
            Ok(regions) => {
                info!(count = regions.len(), "loaded region list");
                let current = self.regions.get(self.region_idx).cloned();
                self.region_idx = current
                    .and_then(|c| regions.iter().position(|r| *r == c))
                    .unwrap_or(0);
                self.regions = regions;
                self.set_status(StatusKind::Info, "Select a period and a region, then press l to load.");
            }
            Err(e) => {
                self.set_status(StatusKind::Error, format!("Could not load regions: {e} Press g to retry."));
            }
        }
    }

    fn current_query(&self) -> Result<Query, String> {
        let start = parse_date(&self.start_input)?;
        let end = parse_date(&self.end_input)?;
        let region = self
            .regions
            .get(self.region_idx)
            .ok_or_else(|| "No region selected (region list unavailable).".to_string())?;
        Query::new(start, end, region.clone()).map_err(|e| e.to_string())
    }

    fn load(&mut self) {
        let query = match self.current_query() {
            Ok(q) => q,
            Err(msg) => {
                self.set_status(StatusKind::Error, msg);
                return;
            }
        };

        match pipeline::run_query(&self.source, &query) {
            Ok(run) => {
                match crate::report::partial_warning(&run.status) {
                    Some(warning) => self.set_status(StatusKind::Warn, warning),
                    None => self.set_status(
                        StatusKind::Info,
                        format!("Loaded {} records for {}.", run.records_fetched, query.region),
                    ),
                }
                self.run = Some(run);
                self.load_error = None;
            }
            Err(err) => {
                // Never leave the previous period's charts up after a failed load.
                self.run = None;
                self.load_error = Some(err.message().to_string());
                self.set_status(StatusKind::Error, err.message().to_string());
            }
        }
    }

    fn set_status(&mut self, kind: StatusKind, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_kind = kind;
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("eco2mix", Style::default().fg(Color::Cyan)),
            Span::raw(" - regional consumption & production"),
        ]));

        let loaded = match &self.run {
            Some(run) => format!(
                "loaded: {} | {} → {} | n={}{}",
                run.query.region,
                fmt_date(run.query.start),
                fmt_date(run.query.end),
                run.records_fetched,
                if run.is_partial() { " (PARTIAL)" } else { "" },
            ),
            None => "loaded: -".to_string(),
        };
        lines.push(Line::from(Span::styled(loaded, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(32)])
            .split(area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cols[0]);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        self.draw_consumption(frame, top[0]);
        self.draw_summary(frame, top[1]);
        self.draw_production(frame, bottom[0]);
        self.draw_mix(frame, bottom[1]);
        self.draw_settings(frame, cols[1]);
    }

    /// Draws the panel frame; returns the inner area when data is available.
    fn panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str) -> Option<(Rect, &RunOutput)> {
        let title = match &self.run {
            Some(run) if run.is_partial() => format!("{title} [PARTIAL DATA]"),
            _ => title.to_string(),
        };
        let border = if self.run.as_ref().is_some_and(RunOutput::is_partial) {
            Style::default().fg(Color::LightRed)
        } else {
            Style::default()
        };
        let block = Block::default().title(title).borders(Borders::ALL).border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match (&self.run, &self.load_error) {
            (Some(run), _) => Some((inner, run)),
            (None, Some(err)) => {
                let msg = Paragraph::new(format!("Load failed: {err}"))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                frame.render_widget(msg, inner);
                None
            }
            (None, None) => {
                let msg = Paragraph::new("No data loaded").style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
                None
            }
        }
    }

    fn draw_consumption(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, run)) = self.panel(frame, area, "Consumption (MW)") else {
            return;
        };
        let Some(axis) = TimeAxis::from_series(&run.aggregate.series) else {
            return;
        };

        let points = series::consumption_points(&run.aggregate, &axis);
        let layers = [Layer {
            points: &points,
            color: RGBColor(80, 140, 255),
            filled: false,
        }];
        let fmt_x = |x: f64| axis.label(x);
        let widget = SeriesChart {
            layers: &layers,
            x_bounds: axis.bounds,
            y_bounds: series::y_bounds([points.as_slice()], false),
            fmt_x: &fmt_x,
            fmt_y: fmt_axis_mw,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_summary(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, run)) = self.panel(frame, area, "Peak consumption") else {
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        if let Some(warning) = crate::report::partial_warning(&run.status) {
            lines.push(Line::from(Span::styled(
                warning,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::raw(""));
        }
        for line in crate::report::summary_lines(&run.aggregate) {
            lines.push(Line::from(Span::styled(line, Style::default().add_modifier(Modifier::BOLD))));
        }
        if let Some(note) = crate::report::quality_note(&run.aggregate) {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(note, Style::default().fg(Color::Gray))));
        }

        frame.render_widget(Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }), inner);
    }

    fn draw_production(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, run)) = self.panel(frame, area, "Production by source (MW)") else {
            return;
        };
        let Some(axis) = TimeAxis::from_series(&run.aggregate.series) else {
            return;
        };

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let stacked = series::stacked_layers(&run.aggregate, &axis);
        // Tallest cumulative layer first so each lower layer paints over it.
        let layers: Vec<Layer> = ProductionSource::ALL
            .iter()
            .zip(&stacked)
            .rev()
            .map(|(&source, points)| {
                let (r, g, b) = source_rgb(source);
                Layer {
                    points,
                    color: RGBColor(r, g, b),
                    filled: true,
                }
            })
            .collect();

        let fmt_x = |x: f64| axis.label(x);
        let widget = SeriesChart {
            layers: &layers,
            x_bounds: axis.bounds,
            y_bounds: series::y_bounds(stacked.iter().map(Vec::as_slice), true),
            fmt_x: &fmt_x,
            fmt_y: fmt_axis_mw,
        };
        frame.render_widget(widget, parts[0]);
        frame.render_widget(Paragraph::new(legend()), parts[1]);
    }

    fn draw_mix(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, run)) = self.panel(frame, area, "Share of total production (%)") else {
            return;
        };

        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let shares = &run.aggregate.production;
        if run.aggregate.production_total > 0.0 {
            let sizes: Vec<f64> = shares.iter().map(|s| s.total.max(0.0)).collect();
            let colors: Vec<RGBColor> = shares
                .iter()
                .map(|s| {
                    let (r, g, b) = source_rgb(s.source);
                    RGBColor(r, g, b)
                })
                .collect();
            frame.render_widget(MixPie { sizes: &sizes, colors: &colors }, parts[0]);
        } else {
            frame.render_widget(
                Paragraph::new("No production recorded").style(Style::default().fg(Color::Yellow)),
                parts[0],
            );
        }

        let lines: Vec<Line> = shares
            .iter()
            .map(|s| {
                let (r, g, b) = source_rgb(s.source);
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(Color::Rgb(r, g, b))),
                    Span::raw(format!("{:<11}{:>7.2}%", s.source.display_name(), s.share_pct)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(Text::from(lines)), parts[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let region = self
            .regions
            .get(self.region_idx)
            .map(String::as_str)
            .unwrap_or("-");

        let start = if self.editing && self.selected_field == FIELD_START {
            format!("{}_", self.edit_buffer)
        } else {
            self.start_input.clone()
        };
        let end = if self.editing && self.selected_field == FIELD_END {
            format!("{}_", self.edit_buffer)
        } else {
            self.end_input.clone()
        };

        let items = vec![
            ListItem::new(format!("From: {start}")),
            ListItem::new(format!("To:   {end}")),
            ListItem::new(format!("Region: {region}")),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit date  l load  g regions  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(self.status_kind.color())),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn legend() -> Line<'static> {
    let mut spans = Vec::new();
    for source in ProductionSource::ALL {
        let (r, g, b) = source_rgb(source);
        spans.push(Span::styled("■ ", Style::default().fg(Color::Rgb(r, g, b))));
        spans.push(Span::raw(format!("{}  ", source.display_name())));
    }
    Line::from(spans)
}

fn source_rgb(source: ProductionSource) -> (u8, u8, u8) {
    match source {
        ProductionSource::Thermal => (230, 80, 60),
        ProductionSource::Nuclear => (240, 200, 40),
        ProductionSource::Wind => (110, 200, 230),
        ProductionSource::Solar => (250, 140, 30),
        ProductionSource::Hydro => (40, 90, 220),
        ProductionSource::Bioenergy => (60, 170, 80),
    }
}

fn fmt_date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}

fn fmt_axis_mw(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use ratatui::backend::TestBackend;
    use serde_json::json;

    use super::*;
    use crate::data::{FetchFailure, PAGE_SIZE};
    use crate::domain::Record;
    use crate::query::QueryParams;

    /// One region, `rows` hourly records, and an optional failing offset.
    struct StubSource {
        rows: usize,
        fail_at: Cell<Option<usize>>,
    }

    impl PageSource for StubSource {
        fn fetch_page(&self, params: &QueryParams, offset: usize, limit: usize) -> Result<Vec<Record>, FetchFailure> {
            if params.group_by.is_some() {
                let rows = if offset == 0 {
                    vec![serde_json::from_value(json!({"libelle_region": "Bretagne"})).unwrap()]
                } else {
                    Vec::new()
                };
                return Ok(rows);
            }
            if self.fail_at.get() == Some(offset) {
                return Err(FetchFailure::Status { offset, status: 503 });
            }
            let end = (offset + limit).min(self.rows);
            Ok((offset.min(end)..end).map(hourly).collect())
        }
    }

    fn hourly(i: usize) -> Record {
        serde_json::from_value(json!({
            "date_heure": format!("2024-01-{:02}T{:02}:00:00+01:00", 1 + i / 24, i % 24),
            "consommation": 1000 + i,
            "thermique": 10, "nucleaire": 0, "eolien": 30, "solaire": 5, "hydraulique": 20, "bioenergies": 5,
        }))
        .unwrap()
    }

    fn app(rows: usize, fail_at: Option<usize>) -> App<StubSource> {
        let args = TuiArgs {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 10),
            region: Some("Bretagne".to_string()),
        };
        App::new(
            StubSource {
                rows,
                fail_at: Cell::new(fail_at),
            },
            args,
        )
    }

    fn screen(app: &mut App<StubSource>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn nothing_loaded_says_so() {
        let mut app = app(48, None);
        assert_eq!(app.regions, vec!["Bretagne".to_string()]);
        assert!(screen(&mut app).contains("No data loaded"));
    }

    #[test]
    fn failed_load_shows_error_in_panels() {
        let mut app = app(48, Some(0));
        app.load();

        assert!(app.run.is_none());
        let err = app.load_error.clone().unwrap();
        assert!(err.contains("503"), "{err}");
        assert_eq!(app.status_kind, StatusKind::Error);
        assert!(screen(&mut app).contains("Load failed"));
    }

    #[test]
    fn partial_load_is_flagged_on_screen() {
        let mut app = app(150, Some(PAGE_SIZE));
        app.load();

        let run = app.run.as_ref().unwrap();
        assert!(run.is_partial());
        assert_eq!(run.records_fetched, PAGE_SIZE);
        assert_eq!(app.status_kind, StatusKind::Warn);

        let text = screen(&mut app);
        assert!(text.contains("[PARTIAL DATA]"));
        assert!(text.contains("PARTIAL DATA: pagination stopped at offset 100"));
    }

    #[test]
    fn failed_reload_drops_previous_charts() {
        let mut app = app(48, None);
        app.load();
        assert!(app.run.as_ref().is_some_and(|r| !r.is_partial()));
        assert!(!screen(&mut app).contains("No data loaded"));

        app.source.fail_at.set(Some(0));
        app.load();

        assert!(app.run.is_none());
        assert!(screen(&mut app).contains("Load failed"));
    }
}
