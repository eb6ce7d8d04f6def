use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use ttrank_terminal::analysis_fetch::AnalysisClient;
use ttrank_terminal::category::RankingCategory;
use ttrank_terminal::config::AppConfig;
use ttrank_terminal::logging::init_tui_logging;
use ttrank_terminal::provider::spawn_provider;
use ttrank_terminal::ranking_fetch::RankingClient;
use ttrank_terminal::ranking_stats::RankingSummary;
use ttrank_terminal::state::{
    self, AnalysisPhase, AppState, InputMode, ProviderCommand, Screen, apply_delta,
};
use ttrank_terminal::upload::{RECOMMENDED_CLIP_SECS, format_size, path_from_drop};
use ttrank_terminal::view::{
    self, AnalysisPanel, UiText, analysis_panel, country_bars, format_updated_at, phase_text,
    ranking_rows, screen_title, stats_cards, text_bar, tone_color, ui_text,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    analysis_scroll: u16,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
            analysis_scroll: 0,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.input_mode == InputMode::EditingPath {
            self.on_path_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Rankings,
            KeyCode::Char('2') => self.state.screen = Screen::Analysis,
            KeyCode::Tab => {
                self.state.screen = match self.state.screen {
                    Screen::Rankings => Screen::Analysis,
                    Screen::Analysis => Screen::Rankings,
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => match self.state.screen {
                Screen::Rankings => self.on_rankings_key(key),
                Screen::Analysis => self.on_analysis_key(key),
            },
        }
    }

    fn on_rankings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('l') | KeyCode::Right => {
                let cmd = self.state.next_category();
                self.send_opt(cmd);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                let cmd = self.state.prev_category();
                self.send_opt(cmd);
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                let cmd = self.state.begin_update();
                if cmd.is_some() {
                    self.state.push_log("[INFO] Update requested");
                }
                self.send_opt(cmd);
            }
            KeyCode::Char('r') => {
                let cmd = self.state.begin_ranking_fetch();
                self.send(cmd);
            }
            _ => {}
        }
    }

    fn on_analysis_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('o') => {
                self.state.input_mode = InputMode::EditingPath;
                self.state.path_input = self
                    .state
                    .selected_file
                    .as_ref()
                    .map(|f| f.path.display().to_string())
                    .unwrap_or_default();
            }
            KeyCode::Char('g') => self.state.toggle_deep_analysis(),
            KeyCode::Char('x') => {
                self.state.clear_selection();
                self.analysis_scroll = 0;
            }
            KeyCode::Char('a') | KeyCode::Enter => {
                let cmd = self.state.begin_analysis();
                if cmd.is_none() && self.state.selected_file.is_none() {
                    self.state.push_log("[INFO] Choose a video first (o or paste a path)");
                }
                self.analysis_scroll = 0;
                self.send_opt(cmd);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.analysis_scroll = self.analysis_scroll.saturating_add(1)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.analysis_scroll = self.analysis_scroll.saturating_sub(1)
            }
            _ => {}
        }
    }

    fn on_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                self.state.input_mode = InputMode::Normal;
                let raw = std::mem::take(&mut self.state.path_input);
                if let Some(path) = path_from_drop(&raw) {
                    self.choose_file(path);
                }
            }
            KeyCode::Backspace => {
                self.state.path_input.pop();
            }
            KeyCode::Char(c) => self.state.path_input.push(c),
            _ => {}
        }
    }

    fn on_paste(&mut self, text: &str) {
        if self.state.input_mode == InputMode::EditingPath {
            self.state.path_input.push_str(text.trim());
            return;
        }
        if let Some(path) = path_from_drop(text) {
            self.state.screen = Screen::Analysis;
            self.choose_file(path);
        }
    }

    fn choose_file(&mut self, path: PathBuf) {
        // Errors are already recorded as a notice on the state.
        if self.state.select_video(&path).is_ok() {
            self.analysis_scroll = 0;
        }
    }

    fn send_opt(&mut self, cmd: Option<ProviderCommand>) {
        if let Some(cmd) = cmd {
            self.send(cmd);
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Network provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    init_tui_logging(config.log_file.as_deref())?;
    let rankings = RankingClient::from_config(&config).context("ranking client")?;
    let analysis = AnalysisClient::from_config(&config).context("analysis client")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx, rankings, analysis);

    let mut app = App::new(&config, Some(cmd_tx));
    app.send(ProviderCommand::CheckHealth);
    let first = app.state.begin_ranking_fetch();
    app.send(first);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Paste(text) => app.on_paste(&text),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            // Revoke the preview before the terminal is torn down.
            app.state.preview = None;
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Rankings => render_rankings(frame, chunks[1], &app.state),
        Screen::Analysis => render_analysis(frame, chunks[1], app),
    }

    let console = Paragraph::new(console_text(&app.state)).block(
        Block::default()
            .title(ui_text(app.state.locale).console_title)
            .borders(Borders::ALL),
    );
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let backend = match state.backend_healthy {
        Some(true) => "backend ok",
        Some(false) => "backend down",
        None => "backend ?",
    };
    format!(
        "TTRANK | {} | {} | {backend}",
        screen_title(state.screen, state.locale),
        state.category().label(state.locale)
    )
}

fn footer_text(state: &AppState) -> String {
    if state.input_mode == InputMode::EditingPath {
        return "Type a path | Enter Select | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::Rankings => {
            "1 Rankings | 2 Analysis | ←/→ c Category | u Update | r Reload | ? Help | q Quit"
                .to_string()
        }
        Screen::Analysis => {
            "1 Rankings | 2 Analysis | o Path | paste Drop | g Deep | Enter Analyze | x Clear | j/k Scroll | q Quit"
                .to_string()
        }
    }
}

fn render_rankings(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    frame.render_widget(Paragraph::new(category_tabs(state)), sections[0]);

    let text = ui_text(state.locale);
    let body = sections[1];
    if state.ranking_loading {
        let label = if state.ranking_updating {
            text.updating
        } else {
            text.loading
        };
        let loading = Paragraph::new(label)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loading, body);
        return;
    }

    if let Some(err) = &state.ranking_error {
        let message = format!(
            "{} ({})\n{err}\n\n{}",
            text.load_failed,
            err.kind(),
            text.retry_hint
        );
        let error = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(text.error_title).borders(Borders::ALL));
        frame.render_widget(error, body);
        return;
    }

    let (Some(ranking), Some(summary)) = (&state.ranking, state.ranking_summary()) else {
        let empty = Paragraph::new(text.no_data)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, body);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(3),
        ])
        .split(body);

    let cards = stats_cards(&summary, state.top_n, state.locale);
    let card_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);
    for (card, col) in cards.iter().zip(card_cols.iter()) {
        let widget = Paragraph::new(card.value.to_string())
            .style(
                Style::default()
                    .fg(tone_color(card.tone))
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().title(card.title.clone()).borders(Borders::ALL));
        frame.render_widget(widget, *col);
    }

    render_country_bars(frame, rows[1], &summary, text);

    let table_area = rows[2];
    let updated = format!("{}: {}", text.updated, format_updated_at(&ranking.updated_at));
    let table_rows: Vec<Row> = ranking_rows(&summary)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.rank),
                Cell::from(row.name),
                Cell::from(row.country),
                Cell::from(row.points),
            ])
        })
        .collect();
    if table_rows.is_empty() {
        let empty = Paragraph::new(text.no_data)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title(updated).borders(Borders::ALL));
        frame.render_widget(empty, table_area);
        return;
    }
    let header = Row::new(text.table_header.to_vec())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Length(20),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().title(updated).borders(Borders::ALL));
    frame.render_widget(table, table_area);
}

fn category_tabs(state: &AppState) -> Line<'static> {
    let mut spans = Vec::new();
    for category in RankingCategory::ALL {
        let label = format!(" {} ", category.label(state.locale));
        let style = if category == state.category() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    let update = if state.ranking_busy() {
        Span::styled("[updating]", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("[u] update", Style::default().fg(Color::Cyan))
    };
    spans.push(update);
    Line::from(spans)
}

fn render_country_bars(
    frame: &mut Frame,
    area: Rect,
    summary: &RankingSummary<'_>,
    text: &UiText,
) {
    let block = Block::default()
        .title(text.distribution_title)
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let bars = country_bars(summary);
    if bars.is_empty() {
        frame.render_widget(
            Paragraph::new(text.no_countries).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    const LABEL_WIDTH: usize = 24;
    const COUNT_WIDTH: usize = 6;
    let bar_width = (inner.width as usize).saturating_sub(LABEL_WIDTH + COUNT_WIDTH + 4);
    let lines: Vec<Line> = bars
        .into_iter()
        .map(|bar| {
            let label = format!(
                "{:>2} {:<width$}",
                bar.position,
                truncate(&bar.country, LABEL_WIDTH - 3),
                width = LABEL_WIDTH - 3
            );
            Line::from(vec![
                Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(text_bar(bar.ratio, bar_width), Style::default().fg(Color::Gray)),
                Span::raw(format!(" {:>width$}", bar.count, width = COUNT_WIDTH)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_analysis(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let text = ui_text(state.locale);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(upload_lines(state))
            .wrap(Wrap { trim: false })
            .block(Block::default().title(text.upload_title).borders(Borders::ALL)),
        rows[0],
    );

    let results = rows[1];
    match &state.analysis_phase {
        AnalysisPhase::Idle => {
            let hint = Paragraph::new(text.idle_hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(text.result_title).borders(Borders::ALL));
            frame.render_widget(hint, results);
        }
        AnalysisPhase::Ready => {
            let hint = Paragraph::new(text.ready_hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(text.result_title).borders(Borders::ALL));
            frame.render_widget(hint, results);
        }
        AnalysisPhase::Analyzing => {
            let busy = Paragraph::new(text.analyzing_hint)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title(text.result_title).borders(Borders::ALL));
            frame.render_widget(busy, results);
        }
        AnalysisPhase::Done(result) => match analysis_panel(result, state.locale) {
            AnalysisPanel::Error { title, message } => {
                let error = Paragraph::new(message)
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::default()
                            .title(format!("⚠ {title}"))
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(Color::Red)),
                    );
                frame.render_widget(error, results);
            }
            AnalysisPanel::Report(sections) => {
                let report = Paragraph::new(report_lines(&sections))
                    .wrap(Wrap { trim: false })
                    .scroll((app.analysis_scroll, 0))
                    .block(Block::default().title(text.result_title).borders(Borders::ALL));
                frame.render_widget(report, results);
            }
        },
    }
}

fn upload_lines(state: &AppState) -> Vec<Line<'static>> {
    let text = ui_text(state.locale);
    let mut lines = Vec::new();
    if state.input_mode == InputMode::EditingPath {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", text.path_label),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(state.path_input.clone()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]));
    } else {
        match (&state.selected_file, &state.preview) {
            (Some(file), Some(preview)) => {
                lines.push(Line::from(format!("{}: {}", text.selected, file.file_name)));
                lines.push(Line::from(format!(
                    "{} | {} | {}",
                    preview.media_type,
                    format_size(preview.size_bytes),
                    preview.url()
                )));
            }
            _ => lines.push(Line::from(text.drop_hint)),
        }
    }
    lines.push(Line::from(format!(
        "{}: {}-{} {}",
        text.recommended, RECOMMENDED_CLIP_SECS.0, RECOMMENDED_CLIP_SECS.1, text.seconds
    )));
    let deep = if state.use_deep_analysis { "[x]" } else { "[ ]" };
    lines.push(Line::from(format!("{deep} {} (g)", text.deep_toggle)));
    lines.push(Line::from(format!(
        "{}: {}",
        text.status,
        phase_text(&state.analysis_phase, state.locale)
    )));
    if let Some(notice) = &state.notice {
        lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Red)));
    }
    lines
}

fn report_lines(sections: &[view::Section]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for section in sections {
        let mut heading = vec![Span::styled(
            section.title.clone(),
            Style::default()
                .fg(tone_color(section.tone))
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(badge) = &section.badge {
            heading.push(Span::raw("  "));
            heading.push(Span::styled(
                format!("[{}]", badge.label),
                Style::default()
                    .fg(tone_color(badge.tone))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(heading));
        for line in &section.lines {
            lines.push(Line::from(format!("  {line}")));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return ui_text(state.locale).no_messages.to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "TTRank Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / Tab  Rankings / Analysis",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Rankings:",
        "  ←/→ or c     Switch category",
        "  u            Ask the backend to update, then reload",
        "  r            Reload",
        "",
        "Analysis:",
        "  paste path   Drop a video clip",
        "  o            Type a path",
        "  g            Toggle deep AI analysis",
        "  Enter / a    Analyze",
        "  x            Clear selection",
        "  j/k          Scroll result",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
