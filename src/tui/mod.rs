use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use time::OffsetDateTime;
use tokio::runtime::Runtime;
use tracing::warn;

use crate::backend::{HttpBackend, ScanBackend};
use crate::controller::{Controller, SubmitTrigger};
use crate::core::{ScanMode, ScanResponse, Severity};
use crate::error::TransportError;
use crate::ui::format_bytes;

mod view;

use view::{PANEL_COUNT, TuiView};

/// Extra time granted to a background request beyond the HTTP timeout before it is abandoned.
const PENDING_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub color: bool,
    pub default_mode: ScanMode,
    pub output_dir: PathBuf,
    pub timeout: Duration,
}

pub fn run(backend: HttpBackend, runtime: &Runtime, opts: TuiOptions) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let mut tui = Tui {
        terminal: Terminal::new(CrosstermBackend::new(stdout))
            .context("failed to initialize terminal")?,
    };
    tui.terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut tui.terminal, backend, runtime, opts)
    }));

    let _ = tui.terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "the TUI panicked (the terminal state should have been restored)"
        )),
    }
}

struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

/// A request running on the runtime; its outcome arrives on `rx`.
struct PendingTask<T> {
    rx: mpsc::Receiver<Result<T, TransportError>>,
    started_at: Instant,
}

impl<T: Send + 'static> PendingTask<T> {
    fn spawn<F>(runtime: &Runtime, fut: F) -> Self
    where
        F: std::future::Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        runtime.spawn(async move {
            let _ = tx.send(fut.await);
        });
        Self {
            rx,
            started_at: Instant::now(),
        }
    }
}

struct App {
    controller: Controller<HttpBackend, TuiView>,
    pending: Option<PendingTask<ScanResponse>>,
    pending_export: Option<PendingTask<Vec<u8>>>,
    mode_state: ListState,
    color: bool,
    timeout: Duration,
    tick: u64,
}

impl App {
    fn new(backend: HttpBackend, opts: TuiOptions) -> Self {
        let view = TuiView::new(opts.default_mode, opts.output_dir);
        Self {
            controller: Controller::new(backend, view),
            pending: None,
            pending_export: None,
            mode_state: ListState::default(),
            color: opts.color,
            timeout: opts.timeout,
            tick: 0,
        }
    }

    fn view(&self) -> &TuiView {
        self.controller.view()
    }

    fn step(&self) -> usize {
        self.controller.state().current_step()
    }

    fn set_mode(&mut self, mode: ScanMode) {
        self.controller.view_mut().mode = mode;
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    backend: HttpBackend,
    runtime: &Runtime,
    opts: TuiOptions,
) -> Result<()> {
    let mut app = App::new(backend, opts);

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &mut app)).context("failed to draw")?;

        poll_pending(&mut app);

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("failed to poll events")? {
            if let Event::Key(key) = event::read().context("failed to read event")? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, runtime, key)? {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick = app.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn poll_pending(app: &mut App) {
    let deadline = app.timeout.saturating_add(PENDING_GRACE);
    if let Some(outcome) = take_outcome(&mut app.pending, app.timeout, deadline, "scan") {
        let _ = app.controller.finish_submit(outcome);
    }
    if let Some(outcome) = take_outcome(&mut app.pending_export, app.timeout, deadline, "report")
    {
        let _ = app
            .controller
            .finish_export_pdf(outcome, OffsetDateTime::now_utc());
    }
}

/// Returns the task's outcome once it is known, leaving `slot` empty. A task still running past
/// `deadline` is abandoned and reported as a timeout.
fn take_outcome<T>(
    slot: &mut Option<PendingTask<T>>,
    timeout: Duration,
    deadline: Duration,
    what: &str,
) -> Option<Result<T, TransportError>> {
    let pending = slot.take()?;
    match pending.rx.try_recv() {
        Ok(outcome) => Some(outcome),
        Err(mpsc::TryRecvError::Empty) => {
            if pending.started_at.elapsed() <= deadline {
                *slot = Some(pending);
                return None;
            }
            warn!(task = what, "abandoning request that outlived its timeout");
            Some(Err(TransportError::Timeout(timeout)))
        }
        Err(mpsc::TryRecvError::Disconnected) => Some(Err(TransportError::Network(format!(
            "the {what} task ended unexpectedly"
        )))),
    }
}

fn start_scan(app: &mut App, runtime: &Runtime) {
    if app.pending.is_some() {
        return;
    }
    let Ok(request) = app.controller.begin_submit(SubmitTrigger::Form) else {
        return;
    };
    let backend = app.controller.backend().clone();
    app.pending = Some(PendingTask::spawn(runtime, async move {
        backend.scan(&request).await
    }));
}

fn start_pdf_export(app: &mut App, runtime: &Runtime) {
    if app.pending_export.is_some() {
        return;
    }
    let Ok(request) = app.controller.begin_export_pdf() else {
        return;
    };
    let backend = app.controller.backend().clone();
    app.pending_export = Some(PendingTask::spawn(runtime, async move {
        backend
            .download_report(&request.vulnerabilities, &request.url)
            .await
    }));
}

fn handle_key(app: &mut App, runtime: &Runtime, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    if app.view().alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.controller.view_mut().alert = None;
        }
        return Ok(false);
    }

    if app.view().results_visible {
        handle_results_key(app, runtime, key);
        return Ok(false);
    }

    match app.step() {
        1 => match key.code {
            KeyCode::Enter | KeyCode::Char('s') => app.controller.advance(1),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            _ => {}
        },
        2 => match key.code {
            KeyCode::Enter | KeyCode::Tab => app.controller.advance(2),
            KeyCode::Esc => app.controller.retreat(2),
            KeyCode::Backspace => {
                app.controller.view_mut().url.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.controller.view_mut().url.clear();
            }
            KeyCode::Char(c) => app.controller.view_mut().url.push(c),
            _ => {}
        },
        3 => match key.code {
            KeyCode::Enter => start_scan(app, runtime),
            KeyCode::Esc | KeyCode::Backspace => {
                if app.pending.is_none() {
                    app.controller.retreat(3);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let mode = app.view().mode.prev();
                app.set_mode(mode);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                let mode = app.view().mode.next();
                app.set_mode(mode);
            }
            KeyCode::Char('v') if app.controller.state().retained().is_some() => {
                app.controller.view_mut().results_visible = true;
            }
            KeyCode::Char('q') => return Ok(true),
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_results_key(app: &mut App, runtime: &Runtime, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => {
            app.controller.view_mut().results_visible = false;
        }
        KeyCode::Char('t') => {
            let _ = app.controller.export_text(OffsetDateTime::now_utc());
        }
        KeyCode::Char('p') => start_pdf_export(app, runtime),
        KeyCode::Down | KeyCode::Char('j') => scroll_results(app, 1),
        KeyCode::Up | KeyCode::Char('k') => scroll_results(app, -1),
        KeyCode::PageDown => scroll_results(app, 10),
        KeyCode::PageUp => scroll_results(app, -10),
        _ => {}
    }
}

fn scroll_results(app: &mut App, delta: i32) {
    let view = app.controller.view_mut();
    let next = (view.results_scroll as i32 + delta).max(0);
    view.results_scroll = u16::try_from(next).unwrap_or(u16::MAX);
}

fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_footer(f, chunks[2], app);

    if app.view().results_visible {
        draw_results(f, chunks[1], app);
    } else {
        match app.view().visible_panel() {
            Some(1) => draw_welcome(f, chunks[1]),
            Some(2) => draw_target(f, chunks[1], app),
            Some(3) => draw_mode(f, chunks[1], app),
            _ => {}
        }
    }

    if app.view().loading {
        let started_at = app.pending.as_ref().map(|p| p.started_at);
        draw_loading(f, chunks[1], app, "Scanning...", started_at);
    } else if let Some(pending) = &app.pending_export {
        let started_at = pending.started_at;
        draw_loading(f, chunks[1], app, "Generating report...", Some(started_at));
    }
    if let Some(alert) = app.view().alert.clone() {
        draw_alert(f, size, &alert);
    }
}

fn step_title(step: usize) -> &'static str {
    match step {
        1 => "Welcome",
        2 => "Target",
        3 => "Scan mode",
        _ => "",
    }
}

fn draw_header(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let title = if app.view().results_visible {
        "secuscan: Results".to_string()
    } else {
        let step = app.step();
        format!("secuscan: Step {step}/{PANEL_COUNT}: {}", step_title(step))
    };
    let right = format!("v{}", env!("CARGO_PKG_VERSION"));

    let line = Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(right, Style::default().fg(Color::DarkGray)),
    ]);

    let w = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(w, area);
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let keys = if app.view().results_visible {
        "t text report | p PDF report | ↑↓/j/k scroll | b/Esc close"
    } else {
        match app.step() {
            1 => "Enter/s start scan | q quit",
            2 => "type URL | Backspace delete | Ctrl-U clear | Enter next | Esc back",
            3 => "↑↓/j/k mode | Enter scan | v last results | Esc back | q quit",
            _ => "Ctrl-C quit",
        }
    };

    let status = if let Some(err) = &app.view().error {
        Line::from(Span::styled(
            err.clone(),
            style_if(app.color, Style::default().fg(Color::Red)),
        ))
    } else if let Some(notice) = &app.view().notice {
        Line::from(Span::styled(
            notice.clone(),
            style_if(app.color, Style::default().fg(Color::Green)),
        ))
    } else {
        Line::from("")
    };

    let w = Paragraph::new(Text::from(vec![
        status,
        Line::from(Span::styled(keys, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            "Ctrl-C force quit",
            Style::default().fg(Color::DarkGray),
        )),
    ]))
    .wrap(Wrap { trim: true });
    f.render_widget(w, area);
}

fn draw_welcome(f: &mut ratatui::Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "Web security scan",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Checks a target site for SQL injection, XSS, RCE and overflow issues."),
        Line::from("Results are grouped by risk level and can be exported as text or PDF."),
        Line::from(""),
        Line::from("Only scan sites you are authorized to test."),
        Line::from(""),
        Line::from(Span::styled(
            "[ Start Scan ]",
            Style::default().add_modifier(Modifier::REVERSED),
        )),
    ]);
    let w = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Welcome"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, centered_rect(70, 60, area));
}

fn draw_target(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let cursor = if app.tick % 4 < 2 { "▏" } else { " " };
    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.view().url.clone()),
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Target URL"));
    f.render_widget(input, chunks[0]);

    let hint = Paragraph::new(Text::from(vec![
        Line::from("Example: https://example.com/login"),
        Line::from("Surrounding whitespace is ignored."),
    ]))
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL).title("Notes"));
    f.render_widget(hint, chunks[1]);
}

fn draw_mode(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    // The form reset on retreat can change the mode behind the list's back.
    let selected = app.view().mode;
    app.mode_state
        .select(ScanMode::ALL.iter().position(|m| *m == selected));

    let items: Vec<ListItem> = ScanMode::ALL
        .iter()
        .map(|m| ListItem::new(Line::from(m.as_str())))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Scan mode"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, chunks[0], &mut app.mode_state);

    let view = app.controller.view();
    let detail = Text::from(vec![
        Line::from(vec![
            Span::styled("Target: ", Style::default().fg(Color::DarkGray)),
            Span::raw(view.url.trim().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Mode: ", Style::default().fg(Color::DarkGray)),
            Span::raw(view.mode.as_str()),
        ]),
        Line::from(""),
        Line::from(view.mode.description()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start the scan.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ]);
    let w = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Review"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, chunks[1]);
}

fn draw_loading(
    f: &mut ratatui::Frame,
    area: Rect,
    app: &App,
    label: &str,
    started_at: Option<Instant>,
) {
    let spinner = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let s = spinner[(app.tick as usize) % spinner.len()];
    let elapsed = started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let area = centered_rect(50, 20, area);
    let w = Paragraph::new(Line::from(vec![
        Span::styled(s, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {label} ({elapsed}s)")),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(Clear, area);
    f.render_widget(w, area);
}

fn draw_alert(f: &mut ratatui::Frame, area: Rect, message: &str) {
    let area = centered_rect(60, 25, area);
    let w = Paragraph::new(Text::from(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Notice"))
    .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(w, area);
}

fn draw_results(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let w = Paragraph::new(results_text(app.view(), app.color))
        .block(Block::default().borders(Borders::ALL).title("Scan results"))
        .wrap(Wrap { trim: false })
        .scroll((app.view().results_scroll, 0));
    f.render_widget(w, area);
}

fn results_text(view: &TuiView, color: bool) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::<Line>::new();

    if let Some(summary) = &view.summary {
        lines.push(Line::from(Span::styled("Scan Summary", bold)));
        for severity in Severity::ALL {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<12}", severity.label()),
                    style_if(color, severity_style(severity)),
                ),
                Span::raw(summary.counts.count(severity).to_string()),
            ]));
        }
        lines.push(Line::from(format!(
            "Total Vulnerabilities: {}",
            summary.counts.total
        )));
        let actions: Vec<Span> = summary
            .actions
            .iter()
            .flat_map(|a| [Span::styled(format!("[{}]", a.label()), dim), Span::raw(" ")])
            .collect();
        lines.push(Line::from(actions));
    }

    for section in &view.sections {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            section.title(),
            style_if(color, severity_style(section.severity)).add_modifier(Modifier::BOLD),
        )));
        for card in &section.cards {
            lines.push(Line::from(Span::styled(format!("  {}", card.name), bold)));
            for (label, value) in [
                ("Description", &card.description),
                ("Evidence", &card.evidence),
                ("Fix", &card.fix_recommendation),
            ] {
                lines.push(Line::from(vec![
                    Span::styled(format!("    {label}: "), dim),
                    Span::raw(value.clone()),
                ]));
            }
        }
    }

    let charts: Vec<String> = [("pie", view.pie_chart), ("bar", view.bar_chart)]
        .into_iter()
        .filter_map(|(name, len)| len.map(|len| format!("{name} ({})", format_bytes(len as u64))))
        .collect();
    if !charts.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Charts received: ", dim),
            Span::raw(charts.join(", ")),
        ]));
    }

    Text::from(lines)
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::High => Style::default().fg(Color::Red),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Green),
    }
}

fn style_if(enabled: bool, style: Style) -> Style {
    if enabled { style } else { Style::default() }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SummaryCounts, Vulnerability, VulnerabilityGroups};
    use crate::render::render;
    use crate::state::UiState;

    fn test_runtime() -> Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
    }

    fn test_app() -> App {
        test_app_in(std::env::temp_dir())
    }

    fn test_app_in(output_dir: PathBuf) -> App {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        App::new(
            backend,
            TuiOptions {
                color: false,
                default_mode: ScanMode::Passive,
                output_dir,
                timeout: Duration::from_secs(1),
            },
        )
    }

    fn pending_with<T>() -> (mpsc::Sender<Result<T, TransportError>>, PendingTask<T>) {
        let (tx, rx) = mpsc::channel();
        let task = PendingTask {
            rx,
            started_at: Instant::now(),
        };
        (tx, task)
    }

    /// Runs a scan to completion so the session has a retained result and the overlay is open.
    fn app_with_result(output_dir: PathBuf) -> App {
        let mut app = test_app_in(output_dir);
        app.controller.view_mut().url = "http://example.com".to_string();
        app.controller.begin_submit(SubmitTrigger::Form).unwrap();
        let response =
            ScanResponse::from_json(br#"{"summary": {"total": 1, "low_risk": 1}}"#).unwrap();
        app.controller.finish_submit(Ok(response)).unwrap();
        assert!(app.view().results_visible);
        app
    }

    fn press(app: &mut App, rt: &Runtime, code: KeyCode) -> bool {
        handle_key(app, rt, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_str(app: &mut App, rt: &Runtime, s: &str) {
        for c in s.chars() {
            press(app, rt, KeyCode::Char(c));
        }
    }

    #[test]
    fn wizard_walks_forward_and_back() {
        let rt = test_runtime();
        let mut app = test_app();
        assert_eq!(app.view().visible_panel(), Some(1));

        press(&mut app, &rt, KeyCode::Enter);
        assert_eq!(app.step(), 2);
        type_str(&mut app, &rt, "http://example.com");
        press(&mut app, &rt, KeyCode::Enter);
        assert_eq!(app.step(), 3);
        assert_eq!(app.view().visible_panel(), Some(3));

        press(&mut app, &rt, KeyCode::Down);
        assert_eq!(app.view().mode, ScanMode::Active);

        press(&mut app, &rt, KeyCode::Esc);
        assert_eq!(app.step(), 2);
        assert_eq!(app.view().url, "http://example.com");

        press(&mut app, &rt, KeyCode::Esc);
        assert_eq!(app.step(), 1);
        assert!(app.view().url.is_empty());
        assert_eq!(app.view().mode, ScanMode::Passive);
    }

    #[test]
    fn empty_url_shows_inline_error_without_loading() {
        let rt = test_runtime();
        let mut app = test_app();
        press(&mut app, &rt, KeyCode::Enter);
        type_str(&mut app, &rt, "   ");
        press(&mut app, &rt, KeyCode::Enter);
        press(&mut app, &rt, KeyCode::Enter);

        assert_eq!(app.view().error.as_deref(), Some("Please enter a URL"));
        assert!(!app.view().loading);
        assert!(app.pending.is_none());
    }

    #[test]
    fn abandoned_scan_clears_loading() {
        let mut app = test_app();
        app.controller.view_mut().url = "http://example.com".to_string();
        app.controller.begin_submit(SubmitTrigger::Form).unwrap();
        let (tx, task) = pending_with();
        drop(tx);
        app.pending = Some(task);

        poll_pending(&mut app);
        assert!(app.pending.is_none());
        assert!(!app.view().loading);
        assert_eq!(
            app.view().error.as_deref(),
            Some("Error during scan: the scan task ended unexpectedly")
        );
    }

    #[test]
    fn pending_scan_survives_huge_timeout() {
        let mut app = test_app();
        app.timeout = Duration::from_secs(u64::MAX);
        app.controller.view_mut().url = "http://example.com".to_string();
        app.controller.begin_submit(SubmitTrigger::Form).unwrap();
        let (_tx, task) = pending_with();
        app.pending = Some(task);

        poll_pending(&mut app);
        assert!(app.pending.is_some());
        assert!(app.view().loading);
    }

    #[test]
    fn pdf_export_runs_in_background_and_keeps_keys_live() {
        let rt = test_runtime();
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_with_result(dir.path().to_path_buf());

        press(&mut app, &rt, KeyCode::Char('p'));
        assert!(app.pending_export.is_some());
        assert!(app.view().alert.is_none());

        // A second request while one is outstanding is ignored; scrolling still works.
        let started_at = app.pending_export.as_ref().map(|p| p.started_at);
        press(&mut app, &rt, KeyCode::Char('p'));
        assert_eq!(app.pending_export.as_ref().map(|p| p.started_at), started_at);
        press(&mut app, &rt, KeyCode::Down);
        assert_eq!(app.view().results_scroll, 1);
    }

    #[test]
    fn finished_pdf_export_is_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app_with_result(dir.path().to_path_buf());
        let (tx, task) = pending_with();
        app.pending_export = Some(task);

        poll_pending(&mut app);
        assert!(app.pending_export.is_some());

        tx.send(Ok(b"%PDF-1.4".to_vec())).unwrap();
        poll_pending(&mut app);
        assert!(app.pending_export.is_none());
        let notice = app.view().notice.clone().expect("notice");
        assert!(notice.starts_with("Saved "), "{notice}");
        assert!(notice.ends_with(".pdf"), "{notice}");

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(saved.len(), 1, "{saved:?}");
        assert!(saved[0].starts_with("security_report_"), "{saved:?}");
    }

    #[test]
    fn failed_pdf_export_alerts() {
        let mut app = app_with_result(std::env::temp_dir());
        let (tx, task) = pending_with::<Vec<u8>>();
        app.pending_export = Some(task);
        tx.send(Err(TransportError::Status(500))).unwrap();

        poll_pending(&mut app);
        assert!(app.pending_export.is_none());
        assert_eq!(
            app.view().alert.as_deref(),
            Some("Error downloading report: Failed to generate report")
        );
    }

    #[test]
    fn pdf_export_without_result_alerts_immediately() {
        let rt = test_runtime();
        let mut app = test_app();
        app.controller.view_mut().results_visible = true;

        press(&mut app, &rt, KeyCode::Char('p'));
        assert!(app.pending_export.is_none());
        assert_eq!(app.view().alert.as_deref(), Some("No scan results available"));
    }

    #[test]
    fn results_text_lists_cards_and_charts() {
        let mut state = UiState::default();
        let mut view = TuiView::new(ScanMode::Passive, std::env::temp_dir());
        let result = crate::core::ScanResult {
            summary: SummaryCounts {
                total: 1,
                high_risk: 1,
                medium_risk: 0,
                low_risk: 0,
            },
            vulnerabilities: VulnerabilityGroups {
                high: vec![Vulnerability {
                    name: "XSS".to_string(),
                    ..Vulnerability::default()
                }],
                ..VulnerabilityGroups::default()
            },
            charts: Some(crate::core::Charts {
                pie: Some("AAAA".to_string()),
                bar: None,
            }),
            message: None,
        };
        render(&mut state, &mut view, result);

        let text: String = results_text(&view, false)
            .lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("High Risk Vulnerabilities"), "{text}");
        assert!(text.contains("  XSS"), "{text}");
        assert!(text.contains("No evidence available"), "{text}");
        assert!(!text.contains("Low Risk Vulnerabilities"), "{text}");
        assert!(text.contains("Charts received: pie"), "{text}");
    }

    #[test]
    fn alert_blocks_other_keys_until_dismissed() {
        let rt = test_runtime();
        let mut app = test_app();
        app.controller.view_mut().alert = Some("No scan results available".to_string());

        press(&mut app, &rt, KeyCode::Char('s'));
        assert_eq!(app.step(), 1);
        press(&mut app, &rt, KeyCode::Enter);
        assert!(app.view().alert.is_none());
    }
}
