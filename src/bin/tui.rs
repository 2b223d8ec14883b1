use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState, Wrap}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};
use tracing_subscriber::EnvFilter;

use tasklist::{
    application::{task_list::{Level, Notice, TaskList}, task_store::TaskStore},
    config::Settings,
    domain::{query::is_overdue, task::Task},
    infrastructure::local_storage::FileStorage,
};

const TOAST_TTL: Duration = Duration::from_secs(3);

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let settings = Settings::from_env()?;
    let storage = FileStorage::open(&settings.data_dir)
        .with_context(|| format!("failed to open data directory {}", settings.data_dir.display()))?
        .with_quota(settings.quota_bytes);

    // The terminal belongs to the UI, so logs go to a file next to the data.
    let log_file = OpenOptions::new().create(true).append(true).open(settings.data_dir.join("tasklist-tui.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let list = TaskList::new(TaskStore::open(storage, settings.storage_key.clone()));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, list, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Search, ConfirmDelete }

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Text, Category, Due }

impl ActiveField {
    fn next(self) -> Self { match self { Self::Text => Self::Category, Self::Category => Self::Due, Self::Due => Self::Text } }
    fn label(self) -> &'static str { match self { Self::Text => "Text", Self::Category => "Category", Self::Due => "Due (YYYY-MM-DD)" } }
}

struct Draft {
    text: String,
    category: String,
    due: String,
}

impl Default for Draft {
    fn default() -> Self { Self { text: String::new(), category: "personal".into(), due: String::new() } }
}

struct App {
    list: TaskList<FileStorage>,
    rows: Vec<Task>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    field: ActiveField,
    draft: Draft,
    toast: Option<(Notice, Instant)>,
}

impl App {
    /// Re-runs the query pipeline; called after every mutation or selection change.
    fn refresh(&mut self) {
        let now = Local::now();
        self.rows = self.list.visible(&now).into_iter().cloned().collect();
        let len = self.rows.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn notify(&mut self, notice: Notice) { self.toast = Some((notice, Instant::now())); }

    fn selected_task(&self) -> Option<&Task> { self.rows.get(self.selected) }

    fn draft_field_mut(&mut self) -> &mut String {
        match self.field { ActiveField::Text => &mut self.draft.text, ActiveField::Category => &mut self.draft.category, ActiveField::Due => &mut self.draft.due }
    }
}

fn level_color(level: Level) -> Color {
    match level { Level::Success => Color::Green, Level::Info => Color::Cyan, Level::Warning => Color::Yellow, Level::Error => Color::Red }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, list: TaskList<FileStorage>, settings: &Settings) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { list, rows: vec![], selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), field: ActiveField::Text, draft: Draft::default(), toast: None };
    if let Some(notice) = app.list.startup_notice() { app.notify(notice); }
    app.refresh();

    loop {
        let now = Local::now();
        let today = now.date_naive();
        let summary = app.list.summary(&now);
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new(format!(
                "Total {}  |  Completed {}  |  Pending {}  |  Overdue {}      (Enter: toggle, n: new, d: delete, /: search, s: status, c: category, o: sort, q: quit)",
                summary.total, summary.completed, summary.pending, summary.overdue
            ))
            .block(Block::default().borders(Borders::ALL).title("tasklist"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.rows.iter().map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                let due = t.due_date.map(|d| format!("  (due {d})")).unwrap_or_default();
                let style = if is_overdue(t, today) { Style::default().fg(Color::Red) }
                    else if t.completed { Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM) }
                    else { Style::default() };
                ListItem::new(format!("{} {} {}{}", mark, t.category.marker(), t.text, due)).style(style)
            }).collect();
            let query = app.list.query();
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!(
                    "tasks [status={} category={} sort={}]{}",
                    query.status, query.category, query.sort,
                    if query.search.is_empty() { String::new() } else { format!(" search=\"{}\"", query.search) }
                )))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            // Details pane for selected task
            let detail = match app.rows.get(app.selected) {
                Some(t) => format!(
                    "Text:\n{}\n\nCategory: {}\nDue: {}\nStatus: {}\nCreated: {}\nCompleted: {}",
                    t.text,
                    t.category.label(),
                    t.due_date.map(|d| d.to_string()).unwrap_or_else(|| "(none)".to_string()),
                    if t.completed { "Completed" } else if is_overdue(t, today) { "Overdue" } else { "Pending" },
                    t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    t.completed_at.map(|c| c.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "-".to_string()),
                ),
                None => String::new(),
            };
            let details = Paragraph::new(detail)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let (footer_text, footer_style) = match app.mode {
                Mode::View => match &app.toast {
                    Some((notice, _)) => (notice.message.clone(), Style::default().fg(level_color(notice.level))),
                    None => (format!("data: {}", settings.data_dir.display()), Style::default()),
                },
                Mode::Create => {
                    let value = match app.field { ActiveField::Text => &app.draft.text, ActiveField::Category => &app.draft.category, ActiveField::Due => &app.draft.due };
                    let hint = match &app.toast { Some((n, _)) if n.level == Level::Error => format!("  |  {}", n.message), _ => String::new() };
                    (format!("{}: {}_  |  (Tab to switch, Enter to save, Esc to cancel){}", app.field.label(), value, hint), Style::default())
                }
                Mode::Search => (format!("Search: {}_  |  (Enter/Esc to close)", app.list.query().search), Style::default()),
                Mode::ConfirmDelete => {
                    let text = app.rows.get(app.selected).map(|t| t.text.clone()).unwrap_or_default();
                    (format!("Delete \"{}\"? (y to confirm, n/Esc to cancel)", text), Style::default().fg(Color::Yellow))
                }
            };
            let footer = Paragraph::new(footer_text)
                .style(footer_style)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "new task", Mode::Search => "search", Mode::ConfirmDelete => "confirm" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } app.refresh(); }
                        KeyCode::Down => { if app.selected + 1 < app.rows.len() { app.selected += 1; } app.refresh(); }
                        KeyCode::Enter | KeyCode::Char(' ') => {
                            if let Some(id) = app.selected_task().map(|t| t.id.clone()) {
                                if let Some(notice) = app.list.toggle(&id) { app.notify(notice); }
                                app.refresh();
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.field = ActiveField::Text;
                            app.draft = Draft::default();
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.selected_task().map(|t| t.id.clone()) {
                                if app.list.request_delete(&id) { app.mode = Mode::ConfirmDelete; }
                            }
                        }
                        KeyCode::Char('/') => { app.mode = Mode::Search; }
                        KeyCode::Char('s') => { let q = app.list.query_mut(); q.status = q.status.next(); app.refresh(); }
                        KeyCode::Char('c') => { let q = app.list.query_mut(); q.category = q.category.next(); app.refresh(); }
                        KeyCode::Char('o') => { let q = app.list.query_mut(); q.sort = q.sort.next(); app.refresh(); }
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft = Draft::default(); }
                        KeyCode::Enter => {
                            let notice = app.list.submit_form(&app.draft.text, &app.draft.category, &app.draft.due);
                            let rejected = notice.level == Level::Error;
                            app.notify(notice);
                            if !rejected {
                                app.mode = Mode::View;
                                app.draft = Draft::default();
                                app.selected = 0;
                                app.refresh();
                            }
                        }
                        KeyCode::Backspace => { app.draft_field_mut().pop(); }
                        KeyCode::Char(c) => app.draft_field_mut().push(c),
                        KeyCode::Tab => { app.field = app.field.next(); }
                        _ => {}
                    },
                    Mode::Search => match key.code {
                        KeyCode::Esc | KeyCode::Enter => { app.mode = Mode::View; }
                        KeyCode::Backspace => { app.list.query_mut().search.pop(); app.refresh(); }
                        KeyCode::Char(c) => { app.list.query_mut().search.push(c); app.refresh(); }
                        _ => {}
                    },
                    Mode::ConfirmDelete => match key.code {
                        KeyCode::Char('y') => {
                            if let Some(notice) = app.list.confirm_delete() { app.notify(notice); }
                            app.mode = Mode::View;
                            app.refresh();
                        }
                        KeyCode::Char('n') | KeyCode::Esc => { app.list.cancel_delete(); app.mode = Mode::View; }
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
            if app.toast.as_ref().is_some_and(|(_, at)| at.elapsed() >= TOAST_TTL) { app.toast = None; }
        }
    }
    Ok(())
}
