//! Terminal front end
//!
//! `App` holds the store and reacts to key presses; it never touches the
//! terminal, so it can be driven from tests. `run` owns the terminal, draws
//! frames and collects free-text input when `App` asks for it.

use std::io;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::Result;
use crate::kanban_board::{DragOutcome, KanbanBoard};
use crate::plan::{generate_plan, PlanCategory};
use crate::storage::{self, KeyValueStore};
use crate::store::TaskStore;
use crate::task::{NewTask, Priority, Task, TaskEdit, TaskStatus};
use crate::views::{self, RemovalQueue, WorkloadBand};

/// Longest the loop sleeps waiting for input
const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Board,
    Timeline,
    Table,
    History,
    Workload,
}

impl View {
    pub const ALL: [View; 5] = [View::Board, View::Timeline, View::Table, View::History, View::Workload];

    pub fn title(self) -> &'static str {
        match self {
            Self::Board => "Kanban",
            Self::Timeline => "Timeline",
            Self::Table => "Table",
            Self::History => "History",
            Self::Workload => "Workload",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Something the event loop must do on behalf of `App`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    PromptGoal,
    PromptNewTask,
    PromptEdit(String),
}

/// Generated plan waiting for approval
#[derive(Debug, Clone)]
pub struct PlanPreview {
    pub goal: String,
    pub category: PlanCategory,
    pub tasks: Vec<Task>,
    pub selected: usize,
}

pub struct App<S: KeyValueStore> {
    store: TaskStore,
    storage: S,
    config: Config,
    pub board: KanbanBoard,
    pub view: View,
    pub removals: RemovalQueue,
    pub history_selected: usize,
    pub plan_preview: Option<PlanPreview>,
    pub message: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore, storage: S, config: Config) -> Self {
        Self {
            store,
            storage,
            config,
            board: KanbanBoard::new(),
            view: View::default(),
            removals: RemovalQueue::new(),
            history_selected: 0,
            plan_preview: None,
            message: None,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn persist(&mut self) {
        if let Err(err) = storage::persist(&self.store, &mut self.storage) {
            error!(%err, "App::persist: failed to save tasks");
            self.message = Some(format!("Failed to save tasks: {}", err));
        }
    }

    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(%err, "App::report: operation failed");
                self.message = Some(err.to_string());
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, now: Instant) -> Action {
        self.message = None;
        if self.plan_preview.is_some() {
            self.handle_preview_key(key);
            return Action::None;
        }
        if self.board.is_dragging() {
            self.handle_drag_key(key, now);
            return Action::None;
        }

        match key {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.view = View::ALL[index];
            }
            KeyCode::Char('g') => return Action::PromptGoal,
            _ => {}
        }

        match self.view {
            View::Board => self.handle_board_key(key, now),
            View::History => {
                self.handle_history_key(key);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_board_key(&mut self, key: KeyCode, now: Instant) -> Action {
        match key {
            KeyCode::Left | KeyCode::Char('h') => self.board.move_left(&self.store),
            KeyCode::Right | KeyCode::Char('l') => self.board.move_right(&self.store),
            KeyCode::Up | KeyCode::Char('k') => self.board.move_up(&self.store),
            KeyCode::Down | KeyCode::Char('j') => self.board.move_down(&self.store),
            KeyCode::Char(' ') => {
                let result = self.board.pick_up(&self.store);
                self.report(result);
            }
            KeyCode::Char('s') => self.cycle_status(now),
            KeyCode::Char('a') => return Action::PromptNewTask,
            KeyCode::Char('e') => {
                if let Some(task) = self.board.selected(&self.store) {
                    return Action::PromptEdit(task.id.clone());
                }
            }
            KeyCode::Char('d') => self.delete_selected(),
            _ => {}
        }
        Action::None
    }

    fn handle_drag_key(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Left | KeyCode::Char('h') => self.board.move_left(&self.store),
            KeyCode::Right | KeyCode::Char('l') => self.board.move_right(&self.store),
            KeyCode::Up | KeyCode::Char('k') => self.board.move_up(&self.store),
            KeyCode::Down | KeyCode::Char('j') => self.board.move_down(&self.store),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let result = self.board.drop_here(&mut self.store, Utc::now());
                if let Some(outcome) = self.report(result) {
                    self.record_outcome(outcome, now);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.board.drag_cancel(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyCode) {
        let len = self.store.archive().len();
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.history_selected = self.history_selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.history_selected + 1 < len {
                    self.history_selected += 1;
                }
            }
            KeyCode::Char('r') => self.restore_selected(),
            KeyCode::Char('c') => {
                let removed = self.store.clear_history();
                self.history_selected = 0;
                self.persist();
                self.message = Some(format!("Cleared {} completed tasks", removed));
            }
            _ => {}
        }
    }

    fn handle_preview_key(&mut self, key: KeyCode) {
        let Some(preview) = self.plan_preview.as_mut() else {
            return;
        };
        match key {
            KeyCode::Up | KeyCode::Char('k') => preview.selected = preview.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if preview.selected + 1 < preview.tasks.len() {
                    preview.selected += 1;
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if preview.selected < preview.tasks.len() {
                    preview.tasks.remove(preview.selected);
                    preview.selected = preview.selected.min(preview.tasks.len().saturating_sub(1));
                }
            }
            KeyCode::Enter => self.accept_plan(),
            KeyCode::Esc => {
                self.plan_preview = None;
                self.message = Some("Plan discarded".to_string());
            }
            _ => {}
        }
    }

    /// Open the plan preview for a goal. Blank goals do nothing.
    pub fn generate(&mut self, goal: &str) {
        let Some(tasks) = generate_plan(goal) else {
            return;
        };
        let category = PlanCategory::classify(goal);
        info!(category = category.label(), count = tasks.len(), "App::generate: plan generated");
        self.plan_preview = Some(PlanPreview {
            goal: goal.trim().to_string(),
            category,
            tasks,
            selected: 0,
        });
    }

    pub fn accept_plan(&mut self) {
        let Some(preview) = self.plan_preview.take() else {
            return;
        };
        let result = self.store.merge_plan(preview.tasks);
        if let Some(count) = self.report(result) {
            self.persist();
            self.view = View::Board;
            self.board.clamp_selection(&self.store);
            self.message = Some(format!("Added {} tasks for \"{}\"", count, preview.goal));
        }
    }

    pub fn add_task(&mut self, new_task: NewTask, now: Instant) {
        let result = self.store.add(new_task);
        if let Some(task) = self.report(result) {
            if task.status == TaskStatus::Done {
                self.removals.push(task.clone(), self.config.removal_delay(), now);
            }
            self.persist();
            self.message = Some(format!("Added \"{}\"", task.title));
        }
    }

    pub fn edit_task(&mut self, id: &str, edit: TaskEdit) {
        if edit.is_empty() {
            return;
        }
        let result = self.store.edit(id, edit).map(|t| t.title.clone());
        if let Some(title) = self.report(result) {
            self.persist();
            self.message = Some(format!("Updated \"{}\"", title));
        }
    }

    /// Status selector: To Do -> In Progress -> Done
    pub fn cycle_status(&mut self, now: Instant) {
        let Some(task) = self.board.selected(&self.store) else {
            return;
        };
        let id = task.id.clone();
        let next = task.status.next();
        let result = self.store.set_status(&id, next);
        if self.report(result).is_some() {
            if next == TaskStatus::Done {
                self.record_outcome(DragOutcome::Archived { id }, now);
            } else {
                self.persist();
                self.board.clamp_selection(&self.store);
            }
        }
    }

    fn record_outcome(&mut self, outcome: DragOutcome, now: Instant) {
        debug!(?outcome, "App::record_outcome");
        match outcome {
            DragOutcome::NoOp => return,
            DragOutcome::Archived { id } => {
                if let Some(task) = self.store.get_archived(&id).cloned() {
                    self.message = Some(format!("Completed \"{}\"", task.title));
                    self.removals.push(task, self.config.removal_delay(), now);
                }
            }
            DragOutcome::StatusChanged { .. } | DragOutcome::Reordered { .. } => {}
        }
        self.persist();
        self.board.clamp_selection(&self.store);
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.board.selected(&self.store).map(|t| t.id.clone()) else {
            return;
        };
        let result = self.store.delete(&id);
        if let Some(task) = self.report(result) {
            self.persist();
            self.board.clamp_selection(&self.store);
            self.message = Some(format!("Deleted \"{}\"", task.title));
        }
    }

    fn restore_selected(&mut self) {
        let Some(id) = self.store.archive().get(self.history_selected).map(|t| t.id.clone()) else {
            return;
        };
        let result = self.store.restore(&id).map(|t| t.title.clone());
        if let Some(title) = self.report(result) {
            self.persist();
            let len = self.store.archive().len();
            self.history_selected = self.history_selected.min(len.saturating_sub(1));
            self.message = Some(format!("Restored \"{}\" to To Do", title));
        }
    }

    /// Expire faded cards; returns true when a redraw is due
    pub fn tick(&mut self, now: Instant) -> bool {
        self.removals.expire(now)
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        self.removals
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(TICK)
            .min(TICK)
    }
}

/// Set up the terminal, run the board until the user quits, then restore it
pub fn run<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend, S: KeyValueStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code, Instant::now()) {
                    Action::None => {}
                    Action::Quit => return Ok(()),
                    Action::PromptGoal => {
                        if let Some(goal) = prompt("Describe your big goal")? {
                            app.generate(&goal);
                        }
                        terminal.clear()?;
                    }
                    Action::PromptNewTask => {
                        if let Some(new_task) = prompt_new_task(&app.config.team)? {
                            app.add_task(new_task, Instant::now());
                        }
                        terminal.clear()?;
                    }
                    Action::PromptEdit(id) => {
                        if let Some(task) = app.store.get(&id).cloned() {
                            let edit = prompt_edit(&task)?;
                            app.edit_task(&id, edit);
                        }
                        terminal.clear()?;
                    }
                }
            }
        }
        app.tick(Instant::now());
    }
}

/// Read one line of input outside the alternate screen.
///
/// `Ok(None)` means the user entered nothing.
fn prompt(message: &str) -> Result<Option<String>> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    println!("{}", message);
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    read?;

    let input = input.trim();
    Ok(if input.is_empty() { None } else { Some(input.to_string()) })
}

fn prompt_new_task(team: &[String]) -> Result<Option<NewTask>> {
    let Some(title) = prompt("Task title (required)")? else {
        return Ok(None);
    };
    let Some(assignee) = prompt(&format!("Assignee (required) [{}]", team.join(", ")))? else {
        return Ok(None);
    };
    let description = prompt("Description")?.unwrap_or_default();
    let due_date = prompt("Due date (e.g. Tomorrow, Next week, 2024-06-01)")?.unwrap_or_default();
    let time_estimate = prompt("Time estimate (e.g. 2 days, 1 week)")?.unwrap_or_default();
    let priority = prompt("Priority [low/MEDIUM/high]")?
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    Ok(Some(NewTask {
        title,
        description,
        assignee,
        due_date,
        time_estimate,
        status: None,
        priority,
    }))
}

fn prompt_edit(task: &Task) -> Result<TaskEdit> {
    let title = prompt(&format!("Title [{}]", task.title))?;
    let description = prompt(&format!("Description [{}]", task.description))?;
    let assignee = prompt(&format!("Assignee [{}]", task.assignee))?;
    let due_date = prompt(&format!("Due date [{}]", task.due_date))?;
    let time_estimate = prompt(&format!("Time estimate [{}]", task.time_estimate))?;
    let priority = prompt(&format!("Priority [{}]", task.priority))?.and_then(|p| p.parse().ok());
    Ok(TaskEdit {
        title,
        description,
        assignee,
        due_date,
        time_estimate,
        priority,
    })
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.view.index())
        .block(Block::default().title("Command Deck").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    match app.view {
        View::Board => draw_board(f, app, chunks[1]),
        View::Timeline => draw_timeline(f, app, chunks[1]),
        View::Table => draw_table(f, app, chunks[1]),
        View::History => draw_history(f, app, chunks[1]),
        View::Workload => draw_workload(f, app, chunks[1]),
    }

    let status = app.message.clone().unwrap_or_else(|| key_hints(app).to_string());
    f.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    if let Some(preview) = &app.plan_preview {
        draw_plan_preview(f, preview);
    }
}

fn key_hints<S: KeyValueStore>(app: &App<S>) -> &'static str {
    if app.plan_preview.is_some() {
        return "enter accept | x drop task | esc discard";
    }
    if app.board.is_dragging() {
        return "arrows move | space/enter drop | esc cancel";
    }
    match app.view {
        View::Board => "space drag | s status | a add | e edit | d delete | g plan | tab view | q quit",
        View::History => "r restore | c clear | g plan | tab view | q quit",
        _ => "g plan | tab view | q quit",
    }
}

fn draw_board<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(6)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[0]);

    let dragged = app.board.dragged_id();
    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = app.board.column_tasks(&app.store, *status);
        let mut items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                let is_dragged = dragged == Some(t.id.as_str());
                let title_style = if is_dragged {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let marker = if is_dragged { "» " } else { "" };
                ListItem::new(vec![
                    Line::from(Span::styled(format!("{}{}", marker, t.title), title_style)),
                    Line::from(Span::styled(
                        views::card_subtitle(t, *status),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        if *status == TaskStatus::Done {
            items.extend(app.removals.tasks().map(|t| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        t.title.clone(),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
                    )),
                    Line::from(Span::styled(
                        views::card_subtitle(t, TaskStatus::Done),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            }));
        }

        let is_current = app.board.selected_status == i;
        let border_style = match (is_current, dragged.is_some()) {
            (true, true) => Style::default().fg(Color::Yellow),
            (true, false) => Style::default().fg(Color::Cyan),
            _ => Style::default(),
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status.label(), tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if is_current && !tasks.is_empty() {
            state.select(Some(app.board.selected_task));
        }
        f.render_stateful_widget(list, columns[i], &mut state);
    }

    let details = match app.board.selected(&app.store) {
        Some(task) => vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(task.description.clone()),
            Line::from(format!(
                "Assignee: {} | Due: {} | Estimate: {} | Priority: {}",
                task.assignee, task.due_date, task.time_estimate, task.priority
            )),
            Line::from(Span::styled(task.id.clone(), Style::default().fg(Color::DarkGray))),
        ],
        None => vec![Line::from("No task selected. Press g to generate a plan or a to add a task.")],
    };
    f.render_widget(
        Paragraph::new(details)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Details").borders(Borders::ALL)),
        rows[1],
    );
}

fn draw_timeline<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let today = Local::now().date_naive();
    let entries = views::timeline(app.store.active(), today);
    let items: Vec<ListItem> = entries
        .iter()
        .map(|e| {
            let when = if e.parsed {
                e.date.format("%a %b %e").to_string()
            } else {
                format!("{} ({})", e.date.format("%a %b %e"), e.task.due_date)
            };
            let dot = if e.date <= today { "●" } else { "○" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", dot), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<18}", when), Style::default().fg(Color::DarkGray)),
                Span::raw(format!(" {} ", e.task.title)),
                Span::styled(
                    format!("[{} | {}]", e.task.assignee, e.task.status),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(items).block(Block::default().title("Timeline").borders(Borders::ALL)),
        area,
    );
}

fn draw_table<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rows: Vec<Row> = views::table_rows(app.store.active())
        .into_iter()
        .map(|r| {
            let status_style = match r.status {
                TaskStatus::InProgress => Style::default().fg(Color::Green),
                _ => Style::default().fg(Color::DarkGray),
            };
            Row::new(vec![
                Span::raw(r.title),
                Span::raw(r.assignee),
                Span::styled(r.status.label(), status_style),
                Span::raw(r.due_date),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(15),
            Constraint::Percentage(25),
        ],
    )
    .header(
        Row::new(vec!["Task", "Assignee", "Status", "Due Date"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title("Table").borders(Borders::ALL));
    f.render_widget(table, area);
}

fn draw_history<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let archive = app.store.archive();
    let title = format!("Task History ({} Completed)", archive.len());
    if archive.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No completed tasks yet"),
            Line::from("Complete some tasks on the board to see them here."),
        ])
        .block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = archive
        .iter()
        .map(|t| {
            let completed = t
                .completed_at
                .map(|c| c.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let priority_color = match t.priority {
                Priority::High => Color::Red,
                Priority::Medium => Color::Yellow,
                Priority::Low => Color::DarkGray,
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(t.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" "),
                    Span::styled(format!("[{}]", t.priority), Style::default().fg(priority_color)),
                    Span::styled(" Completed", Style::default().fg(Color::Green)),
                ]),
                Line::from(Span::styled(
                    format!(
                        "Assignee: {} | Due: {} | Estimate: {} | Completed: {}",
                        t.assignee, t.due_date, t.time_estimate, completed
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.history_selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_workload<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let load = views::team_workload(app.store.active(), &app.config.team, app.config.member_capacity);
    let block = Block::default().title("Team Workload").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let constraints: Vec<Constraint> = load.iter().map(|_| Constraint::Length(2)).collect();
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (member, slot) in load.iter().zip(slots.iter()) {
        let color = match member.band {
            WorkloadBand::Underloaded => Color::Blue,
            WorkloadBand::Balanced => Color::Green,
            WorkloadBand::Overloaded => Color::Red,
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .percent(member.percent.min(100) as u16)
            .label(format!(
                "{}  {} tasks  {}  {}%",
                member.name,
                member.open_tasks,
                member.band.label(),
                member.percent
            ));
        f.render_widget(gauge, *slot);
    }
}

fn draw_plan_preview(f: &mut Frame, preview: &PlanPreview) {
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = preview
        .tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            ListItem::new(vec![
                Line::from(format!("{}. {}", i + 1, t.title)),
                Line::from(Span::styled(
                    format!("   {} | {} | {} | {} priority", t.assignee, t.due_date, t.time_estimate, t.priority),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Plan Preview: {} ({})", preview.goal, preview.category.label()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(preview.selected));
    f.render_stateful_widget(list, area, &mut state);
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
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, CURRENT_TASKS_KEY, TASK_HISTORY_KEY};
    use ratatui::backend::TestBackend;

    fn app() -> App<MemoryStorage> {
        App::new(TaskStore::new(), MemoryStorage::new(), Config::default())
    }

    fn rendered(app: &App<MemoryStorage>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_generate_and_accept_plan_persists() {
        let mut app = app();
        assert_eq!(app.handle_key(KeyCode::Char('g'), Instant::now()), Action::PromptGoal);
        app.generate("Build a budgeting app");
        assert_eq!(app.plan_preview.as_ref().unwrap().tasks.len(), 5);

        app.handle_key(KeyCode::Char('x'), Instant::now());
        app.handle_key(KeyCode::Enter, Instant::now());

        assert!(app.plan_preview.is_none());
        assert_eq!(app.store().active().len(), 4);
        let saved = app.storage().get(CURRENT_TASKS_KEY).unwrap().unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&saved).unwrap();
        assert_eq!(tasks.len(), 4);
    }

    #[test]
    fn test_blank_goal_opens_nothing() {
        let mut app = app();
        app.generate("   ");
        assert!(app.plan_preview.is_none());
    }

    #[test]
    fn test_escape_discards_preview() {
        let mut app = app();
        app.generate("brand refresh");
        app.handle_key(KeyCode::Esc, Instant::now());
        assert!(app.plan_preview.is_none());
        assert!(app.store().active().is_empty());
    }

    #[test]
    fn test_status_cycle_archives_and_fades() {
        let mut app = app();
        app.add_task(NewTask::new("Ship it", "Alex Johnson"), Instant::now());
        let start = Instant::now();
        app.handle_key(KeyCode::Char('s'), start);
        assert_eq!(app.store().active()[0].status, TaskStatus::InProgress);

        app.board.move_right(&app.store);
        app.handle_key(KeyCode::Char('s'), start);
        assert!(app.store().active().is_empty());
        assert_eq!(app.store().archive().len(), 1);
        assert!(!app.removals.is_empty());
        assert!(app.storage().get(TASK_HISTORY_KEY).unwrap().unwrap().contains("Ship it"));

        assert!(app.tick(start + Duration::from_millis(300)));
        assert!(app.removals.is_empty());
    }

    #[test]
    fn test_keyboard_drag_to_done() {
        let mut app = app();
        app.add_task(NewTask::new("Write tests", "Emma Davis"), Instant::now());
        let now = Instant::now();
        app.handle_key(KeyCode::Char(' '), now);
        assert!(app.board.is_dragging());
        app.handle_key(KeyCode::Right, now);
        app.handle_key(KeyCode::Right, now);
        app.handle_key(KeyCode::Enter, now);

        assert!(!app.board.is_dragging());
        assert!(app.store().active().is_empty());
        assert_eq!(app.store().archive()[0].title, "Write tests");
    }

    #[test]
    fn test_cancelled_drag_changes_nothing() {
        let mut app = app();
        app.add_task(NewTask::new("Write tests", "Emma Davis"), Instant::now());
        let now = Instant::now();
        app.handle_key(KeyCode::Char(' '), now);
        app.handle_key(KeyCode::Right, now);
        app.handle_key(KeyCode::Esc, now);

        assert!(!app.board.is_dragging());
        assert_eq!(app.store().active()[0].status, TaskStatus::ToDo);
    }

    #[test]
    fn test_history_restore() {
        let mut app = app();
        app.add_task(NewTask::new("Old work", "Sarah Chen"), Instant::now());
        let id = app.store().active()[0].id.clone();
        app.store.complete(&id, Utc::now()).unwrap();

        app.handle_key(KeyCode::Char('4'), Instant::now());
        assert_eq!(app.view, View::History);
        app.handle_key(KeyCode::Char('r'), Instant::now());

        assert!(app.store().archive().is_empty());
        assert_eq!(app.store().active()[0].status, TaskStatus::ToDo);
    }

    #[test]
    fn test_invalid_add_reports_message() {
        let mut app = app();
        app.add_task(NewTask::new("", "Sarah Chen"), Instant::now());
        assert!(app.store().active().is_empty());
        assert!(app.message.as_deref().unwrap_or_default().contains("title"));
    }

    #[test]
    fn test_edit_prompt_requested_for_selected_task() {
        let mut app = app();
        app.add_task(NewTask::new("Draft", "Sarah Chen"), Instant::now());
        let id = app.store().active()[0].id.clone();
        assert_eq!(app.handle_key(KeyCode::Char('e'), Instant::now()), Action::PromptEdit(id.clone()));

        app.edit_task(
            &id,
            TaskEdit {
                title: Some("Final draft".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(app.store().active()[0].title, "Final draft");
    }

    #[test]
    fn test_every_view_renders() {
        let mut app = app();
        app.generate("marketing push");
        app.accept_plan();
        let board = rendered(&app);
        assert!(board.contains("To Do"));
        assert!(board.contains("Research target audience"));

        for key in ['2', '3', '4', '5'] {
            app.handle_key(KeyCode::Char(key), Instant::now());
            let screen = rendered(&app);
            assert!(screen.contains(app.view.title()));
        }
    }
}
