// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::clipboard::CopyToClipboard;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io::{self, IsTerminal, Stdout, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use strata_app::child::NO_DATA;
use strata_app::format::truncate_with_ellipsis;
use strata_app::layout::{
    DEFAULT_WIDTH, column_widths, detail_columns, scroll_offset, stretch_columns,
};
use strata_app::session::HELP_LINES;
use strata_app::{
    Clipboard, DetailFrame, FrameKind, Key, LoadOutcome, Registry, Session, SessionEvent,
    SessionOptions, StatusRow, TableData,
};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const EMPTY_MESSAGE: &str = "No data to display.";
const APP_NAME: &str = "strata";
const SIDE_PANEL_PERCENT: u16 = 40;

enum InternalEvent {
    LoadFinished(LoadOutcome),
}

enum LoopControl {
    Continue,
    Quit,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        execute!(io::stdout(), CopyToClipboard::to_clipboard_from(text))
            .context("write clipboard escape sequence")
    }
}

pub fn browse(table: TableData, options: SessionOptions, registry: Arc<Registry>) -> Result<()> {
    let effective = options.custom_table.as_ref().unwrap_or(&table);
    let mut stdout = io::stdout();
    if effective.is_empty() {
        writeln!(stdout, "{}", empty_message(options.title.trim())).context("write empty message")?;
        return Ok(());
    }

    let mut session = Session::new(table, options, registry, Box::new(Osc52Clipboard));
    if !stdout.is_terminal() {
        let width = terminal::size().map_or(DEFAULT_WIDTH, |(width, _)| width);
        writeln!(stdout, "{}", render_static(&session, usize::from(width)))
            .context("write static table")?;
        return Ok(());
    }
    run_app(&mut session)
}

fn empty_message(title: &str) -> String {
    if title.is_empty() {
        EMPTY_MESSAGE.to_owned()
    } else {
        format!("{title}\n{EMPTY_MESSAGE}")
    }
}

pub fn run_app(session: &mut Session) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    if let Ok((width, height)) = terminal::size() {
        session.resize(width, height);
    }
    session.start(Instant::now());
    spawn_jobs(session, &internal_tx);
    debug!(rows = session.root_table().row_count(), "browser started");

    let mut result = Ok(());
    loop {
        process_internal_events(session, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, session, Instant::now())) {
            result = Err(error).context("draw frame");
            break;
        }

        let events = match next_session_events(session) {
            Ok(events) => events,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        spawn_jobs(session, &internal_tx);

        match apply_terminal_events(&events, &mut terminal) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Quit) => break,
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }
    debug!(depth = session.frames().len(), "browser stopped");

    disable_raw_mode().context("disable raw mode")?;
    if session.full_screen() {
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    }
    result
}

fn next_session_events(session: &mut Session) -> Result<Vec<SessionEvent>> {
    let has_event = event::poll(POLL_INTERVAL).context("poll event")?;
    let now = Instant::now();
    if !has_event {
        return Ok(session.tick(now));
    }
    let events = match event::read().context("read event")? {
        Event::Key(key) => map_key(key)
            .map(|key| session.handle_key(key, now))
            .unwrap_or_default(),
        Event::Resize(width, height) => session.resize(width, height),
        _ => Vec::new(),
    };
    Ok(events)
}

fn process_internal_events(session: &mut Session, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::LoadFinished(outcome) => {
                session.complete_load(outcome, Instant::now());
            }
        }
    }
}

fn apply_terminal_events(
    events: &[SessionEvent],
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<LoopControl> {
    for event in events {
        match event {
            SessionEvent::Quit => return Ok(LoopControl::Quit),
            SessionEvent::FullScreenToggled(true) => {
                execute!(io::stdout(), terminal::EnterAlternateScreen)
                    .context("enter alternate screen")?;
                terminal.clear().context("clear terminal")?;
            }
            SessionEvent::FullScreenToggled(false) => {
                execute!(io::stdout(), terminal::LeaveAlternateScreen)
                    .context("leave alternate screen")?;
                terminal.clear().context("clear terminal")?;
            }
            _ => {}
        }
    }
    Ok(LoopControl::Continue)
}

/// Runs each pending loader on its own thread. A panicking loader still
/// reports back, as an error.
fn spawn_jobs(session: &mut Session, tx: &Sender<InternalEvent>) {
    for job in session.take_jobs() {
        let request = job.request();
        let tx = tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("strata-load-{request}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run())).unwrap_or_else(
                    |_| LoadOutcome {
                        request,
                        result: Err(anyhow!("loader panicked")),
                    },
                );
                let _ = tx.send(InternalEvent::LoadFinished(outcome));
            });
        if let Err(error) = spawned {
            warn!(request = %request, %error, "loader thread failed to start");
            let outcome = LoadOutcome {
                request,
                result: Err(anyhow::Error::new(error).context("start loader thread")),
            };
            session.complete_load(outcome, Instant::now());
        }
    }
}

fn map_key(key: KeyEvent) -> Option<Key> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return Some(Key::Other);
    }
    let mapped = match key.code {
        KeyCode::Char(ch) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(ch.to_ascii_lowercase())
        }
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        _ => Key::Other,
    };
    Some(mapped)
}

fn render(frame: &mut ratatui::Frame<'_>, session: &Session, now: Instant) {
    let rows = session.status_rows(now);
    let (header_row, status_rows) = match rows.split_first() {
        Some((first, rest)) => (first.clone(), rest.to_vec()),
        None => (
            StatusRow {
                left: session.breadcrumb_line(),
                right: String::new(),
            },
            Vec::new(),
        ),
    };
    let status_height = status_rows.len().max(1) as u16 + 2;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(status_height),
        ])
        .split(frame.area());

    let header_width = usize::from(layout[0].width.saturating_sub(2));
    let breadcrumb = Paragraph::new(pad_between(&header_row.left, &header_row.right, header_width))
        .block(Block::default().title(APP_NAME).borders(Borders::ALL));
    frame.render_widget(breadcrumb, layout[0]);

    render_body(frame, layout[1], session);

    let status_width = usize::from(layout[2].width.saturating_sub(2));
    let status = status_rows
        .iter()
        .map(|row| pad_between(&row.left, &row.right, status_width))
        .collect::<Vec<_>>()
        .join("\n");
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if session.show_help() {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_body(frame: &mut ratatui::Frame<'_>, area: Rect, session: &Session) {
    let Some(top) = session.top() else {
        let area = match session.preview_text() {
            Some(preview) => {
                let lines = preview.lines().count().max(1) as u16;
                let split = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(lines + 2), Constraint::Min(1)])
                    .split(area);
                let widget = Paragraph::new(preview)
                    .block(Block::default().title("preview").borders(Borders::ALL));
                frame.render_widget(widget, split[0]);
                split[1]
            }
            None => area,
        };
        let title = session.root_label();
        render_with_side_panel(frame, area, session.side_panel(), |frame, area| {
            render_table(
                frame,
                area,
                &title,
                session.root_display(),
                session.root_cursor(),
                session.stretch(),
            );
        });
        return;
    };

    match &top.kind {
        FrameKind::Table(table) => {
            render_with_side_panel(frame, area, session.side_panel(), |frame, area| {
                render_table(
                    frame,
                    area,
                    &top.title,
                    &table.display,
                    table.cursor,
                    session.stretch(),
                );
            });
        }
        FrameKind::Detail(detail) => render_detail(frame, area, &top.title, detail),
        FrameKind::Text(text) => {
            let scroll = u16::try_from(text.scroll).unwrap_or(u16::MAX);
            let widget = Paragraph::new(text.content.as_str())
                .scroll((scroll, 0))
                .block(Block::default().title(top.title.as_str()).borders(Borders::ALL));
            frame.render_widget(widget, area);
        }
    }
}

fn render_with_side_panel<F>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    panel: Option<String>,
    draw_table: F,
) where
    F: FnOnce(&mut ratatui::Frame<'_>, Rect),
{
    let Some(panel) = panel else {
        draw_table(frame, area);
        return;
    };
    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - SIDE_PANEL_PERCENT),
            Constraint::Percentage(SIDE_PANEL_PERCENT),
        ])
        .split(area);
    draw_table(frame, split[0]);
    let widget =
        Paragraph::new(panel).block(Block::default().title("detail").borders(Borders::ALL));
    frame.render_widget(widget, split[1]);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    table: &TableData,
    cursor: usize,
    stretch: bool,
) {
    let block = Block::default().title(title).borders(Borders::ALL);
    if table.headers.is_empty() {
        frame.render_widget(Paragraph::new(NO_DATA).block(block), area);
        return;
    }

    let inner_width = usize::from(area.width.saturating_sub(2));
    let available = inner_width.saturating_sub(table.headers.len().saturating_sub(1));
    let mut widths = column_widths(&table.headers, &table.rows, available).widths;
    if stretch {
        stretch_columns(&mut widths, available);
    }

    let header_cells = table.headers.iter().zip(&widths).map(|(label, width)| {
        Cell::from(truncate_with_ellipsis(label, *width)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let visible = usize::from(area.height.saturating_sub(3)).max(1);
    let offset = scroll_offset(cursor, visible);
    let rows = table
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(row_index, row)| {
            let style = if row_index == cursor {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cells = row
                .iter()
                .zip(&widths)
                .map(|(value, width)| Cell::from(truncate_with_ellipsis(value, *width)));
            Row::new(cells).style(style)
        });

    let constraints = widths
        .iter()
        .map(|width| Constraint::Length(u16::try_from(*width).unwrap_or(u16::MAX)));
    let widget = Table::new(rows, constraints)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_detail(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, detail: &DetailFrame) {
    let block = Block::default().title(title).borders(Borders::ALL);
    if detail.items.is_empty() {
        frame.render_widget(Paragraph::new(NO_DATA).block(block), area);
        return;
    }

    let inner_width = usize::from(area.width.saturating_sub(2));
    let columns = detail_columns(
        detail.items.iter().map(|item| item.label.as_str()),
        inner_width,
    );
    let header = Row::new(["FIELD", "VALUE"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let visible = usize::from(area.height.saturating_sub(3)).max(1);
    let offset = scroll_offset(detail.cursor, visible);
    let rows = detail
        .items
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, item)| {
            let mut style = Style::default();
            if item.is_expandable() {
                style = style.fg(Color::Cyan);
            }
            if index == detail.cursor {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            }
            Row::new([
                Cell::from(truncate_with_ellipsis(&item.label, columns.label)),
                Cell::from(truncate_with_ellipsis(
                    &collapse_lines(&item.value),
                    columns.value,
                )),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Length(u16::try_from(columns.label).unwrap_or(u16::MAX)),
        Constraint::Min(1),
    ];
    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(widget, area);
}

fn help_overlay_text() -> String {
    HELP_LINES.join("\n")
}

fn collapse_lines(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn pad_between(left: &str, right: &str, width: usize) -> String {
    if right.is_empty() {
        return left.to_owned();
    }
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{left}{}{right}", " ".repeat(gap))
}

pub fn render_static(session: &Session, width: usize) -> String {
    let table = session.root_display();
    let mut out = String::new();
    if !session.title().is_empty() {
        out.push_str(session.title());
        out.push('\n');
    }

    let frame_cost = table.headers.len() * 3 + 1;
    let widths = column_widths(
        &table.headers,
        &table.rows,
        width.saturating_sub(frame_cost),
    )
    .widths;

    out.push_str(&border_line('┌', '┬', '┐', &widths));
    out.push_str(&content_line(&table.headers, &widths));
    out.push_str(&border_line('├', '┼', '┤', &widths));
    for row in &table.rows {
        out.push_str(&content_line(row, &widths));
    }
    out.push_str(&border_line('└', '┴', '┘', &widths));

    if let Some(preview) = session.side_panel() {
        out.push('\n');
        out.push_str(&preview);
        out.push('\n');
    }
    out.trim_end_matches('\n').to_owned()
}

fn border_line(left: char, middle: char, right: char, widths: &[usize]) -> String {
    let segments = widths
        .iter()
        .map(|width| "─".repeat(width + 2))
        .collect::<Vec<_>>();
    format!("{left}{}{right}\n", segments.join(&middle.to_string()))
}

fn content_line(cells: &[String], widths: &[usize]) -> String {
    let cells = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let value = cells.get(index).map(String::as_str).unwrap_or_default();
            let value = truncate_with_ellipsis(&collapse_lines(value), *width);
            format!(" {value:<width$} ")
        })
        .collect::<Vec<_>>();
    format!("│{}│\n", cells.join("│"))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

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
    use super::{
        InternalEvent, collapse_lines, empty_message, map_key, pad_between,
        process_internal_events, render, render_static, spawn_jobs,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};
    use strata_app::{
        ChildView, FrameKind, Key, Registry, Session, SessionEvent, SessionOptions, TableData,
    };
    use strata_testkit::{DEMO_SEED, FakeClipboard, LoadCounter, demo_session};

    fn demo() -> anyhow::Result<Session> {
        let demo = demo_session(DEMO_SEED, Duration::ZERO)?;
        Ok(Session::new(
            demo.table,
            demo.options,
            demo.registry,
            Box::new(FakeClipboard::new()),
        ))
    }

    fn screen(session: &Session, width: u16, height: u16) -> anyhow::Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height))?;
        terminal.draw(|frame| render(frame, session, Instant::now()))?;
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    text.push_str(cell.symbol());
                }
            }
            text.push('\n');
        }
        Ok(text)
    }

    #[test]
    fn map_key_translates_modifiers() {
        let plain = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(map_key(plain), Some(Key::Char('j')));

        let ctrl = KeyEvent::new(KeyCode::Char('W'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl), Some(Key::Ctrl('w')));

        let alt = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(map_key(alt), Some(Key::Other));

        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);

        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(map_key(back_tab), Some(Key::BackTab));
        let insert = KeyEvent::new(KeyCode::Insert, KeyModifiers::NONE);
        assert_eq!(map_key(insert), Some(Key::Other));
    }

    #[test]
    fn root_screen_shows_breadcrumb_table_and_preview() -> anyhow::Result<()> {
        let session = demo()?;
        let text = screen(&session, 140, 30)?;
        assert!(text.contains("Control Planes"));
        assert!(text.contains("Press ? for help"));
        assert!(text.contains("CLUSTER TYPE"));
        assert!(text.contains("preview"));
        assert!(text.contains("detail"));
        Ok(())
    }

    #[test]
    fn help_overlay_lists_bindings() -> anyhow::Result<()> {
        let mut session = demo()?;
        let now = Instant::now();
        assert_eq!(
            session.handle_key(Key::Char('?'), now),
            vec![SessionEvent::HelpToggled(true)]
        );
        let text = screen(&session, 120, 40)?;
        assert!(text.contains("toggle this help"));
        assert!(!text.contains("Press ? for help"));
        Ok(())
    }

    #[test]
    fn detail_frame_shows_fields_and_loaders() -> anyhow::Result<()> {
        let mut session = demo()?;
        session.handle_key(Key::Enter, Instant::now());
        let text = screen(&session, 140, 30)?;
        assert!(text.contains("FIELD"));
        assert!(text.contains("VALUE"));
        assert!(text.contains("services"));
        assert!(text.contains("[...]"));
        assert!(text.contains("Control Planes > "));
        Ok(())
    }

    #[test]
    fn loader_threads_report_back() -> anyhow::Result<()> {
        let counter = LoadCounter::new();
        let view = ChildView::collection(
            vec!["NAME".to_owned()],
            vec![vec!["route-a".to_owned()]],
            None,
            "Routes",
        );
        let options = SessionOptions::new().with_row_loader(counter.row_loader(view));
        let table = TableData::new(vec!["NAME".to_owned()], vec![vec!["billing".to_owned()]]);
        let mut session = Session::new(
            table,
            options,
            Arc::new(Registry::new()),
            Box::new(FakeClipboard::new()),
        );

        let (tx, rx) = mpsc::channel();
        session.handle_key(Key::Enter, Instant::now());
        spawn_jobs(&mut session, &tx);
        let event = rx.recv_timeout(Duration::from_secs(5))?;
        let InternalEvent::LoadFinished(outcome) = event;
        session.complete_load(outcome, Instant::now());

        assert_eq!(counter.calls(), 1);
        assert_eq!(session.breadcrumbs(), vec!["Items", "Routes"]);
        match session.top().map(|frame| &frame.kind) {
            Some(FrameKind::Table(table)) => assert_eq!(table.view.rows, vec![vec!["route-a"]]),
            other => panic!("expected table frame, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn panicking_loader_becomes_an_error_status() -> anyhow::Result<()> {
        let options = SessionOptions::new().with_row_loader(|_, _| -> anyhow::Result<ChildView> {
            panic!("loader bug");
        });
        let table = TableData::new(vec!["NAME".to_owned()], vec![vec!["billing".to_owned()]]);
        let mut session = Session::new(
            table,
            options,
            Arc::new(Registry::new()),
            Box::new(FakeClipboard::new()),
        );

        let (tx, rx) = mpsc::channel();
        session.handle_key(Key::Enter, Instant::now());
        spawn_jobs(&mut session, &tx);

        let deadline = Instant::now() + Duration::from_secs(5);
        while session.pending().is_some() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            process_internal_events(&mut session, &rx);
        }
        let status = session.status().unwrap_or_default();
        assert!(
            status.starts_with("Unable to open: loader panicked"),
            "unexpected status {status:?}"
        );
        assert!(session.frames().is_empty());
        Ok(())
    }

    #[test]
    fn empty_data_message_leads_with_the_title() {
        assert_eq!(empty_message("Services"), "Services\nNo data to display.");
        assert_eq!(empty_message(""), "No data to display.");
    }

    #[test]
    fn static_render_draws_box_and_preview() -> anyhow::Result<()> {
        let headers = vec!["ID".to_owned(), "NAME".to_owned()];
        let rows = vec![
            vec!["1".to_owned(), "billing".to_owned()],
            vec!["2".to_owned(), "catalog".to_owned()],
        ];
        let options = SessionOptions::new()
            .with_title("Services")
            .with_detail_renderer(|index| format!("id: {}\nname: svc-{index}", index + 1));
        let session = Session::new(
            TableData::new(headers, rows),
            options,
            Arc::new(Registry::new()),
            Box::new(FakeClipboard::new()),
        );

        assert_eq!(
            render_static(&session, 80),
            [
                "Services",
                "┌────────┬─────────┐",
                "│ ID     │ NAME    │",
                "├────────┼─────────┤",
                "│ 1      │ billing │",
                "│ 2      │ catalog │",
                "└────────┴─────────┘",
                "",
                "id: 1",
                "name: svc-0",
            ]
            .join("\n")
        );
        Ok(())
    }

    #[test]
    fn layout_helpers() {
        assert_eq!(pad_between("left", "right", 15), "left      right");
        assert_eq!(pad_between("left", "right", 3), "left right");
        assert_eq!(pad_between("left", "", 30), "left");
        assert_eq!(collapse_lines("a\n  b\n\nc"), "a b c");
    }
}
