//! Main application logic for the terminal user interface.
//!
//! `App` wraps a `TaskPage` and the record store. It maps key presses onto
//! page operations and renders the task table, the add/edit modal, the
//! confirm dialog, the bulk pickers and the projects and dashboard panels.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::bulk::BulkAction;
use crate::config::ViewDefaults;
use crate::dashboard::summarize;
use crate::db::{format_due_relative, format_priority, truncate, Database};
use crate::error::PageError;
use crate::fields::ProjectStatus;
use crate::notice::{Level, Notice};
use crate::page::TaskPage;
use crate::project::{filter_projects, project_title, Project, ProjectQuery};
use crate::tui::colors::{notice_color, priority_color, status_color, DARK_PURPLE, DARK_RED, GOLD};
use crate::tui::enums::{AppState, InputMode, PendingConfirm};
use crate::tui::input::InputField;
use crate::tui::task_form::{
    TaskFormState, DESCRIPTION_FIELD, DUE_FIELD, PRIORITIES, PRIORITY_FIELD, PROJECT_FIELD, TITLE_FIELD,
};
use crate::tui::utils::centered_rect;

const PROJECT_STATUSES: [ProjectStatus; 5] = [
    ProjectStatus::Active,
    ProjectStatus::Completed,
    ProjectStatus::OnHold,
    ProjectStatus::Archived,
    ProjectStatus::NotStarted,
];

pub struct App {
    state: AppState,
    db: Database,
    page: TaskPage,
    table_state: TableState,
    project_table_state: TableState,
    form: TaskFormState,
    input_mode: InputMode,
    search: InputField,
    status: Option<Notice>,
    confirm: Option<PendingConfirm>,
    /// Cursor inside the bulk priority / move picker.
    picker: usize,
    project_status_filter: Option<ProjectStatus>,
}

impl App {
    /// Load the page from `db` and start on the task list.
    pub fn new(db: Database, defaults: &ViewDefaults) -> Self {
        let mut page = TaskPage::new(defaults);
        page.reload(&db);
        let form = TaskFormState::new(page.projects(), None);
        let mut app = App {
            state: AppState::TaskList,
            db,
            page,
            table_state: TableState::default(),
            project_table_state: TableState::default(),
            form,
            input_mode: InputMode::None,
            search: InputField::new(),
            status: None,
            confirm: None,
            picker: 0,
            project_status_filter: None,
        };
        app.absorb_notices();
        app.clamp_cursor();
        app
    }

    /// Move queued page notices into the status bar. Earlier errors ride along with the last notice.
    fn absorb_notices(&mut self) {
        let mut notices = self.page.drain_notices();
        let Some(last) = notices.pop() else {
            return;
        };
        let errors: Vec<String> = notices
            .into_iter()
            .filter(|n| n.level == Level::Error)
            .map(|n| n.message)
            .collect();
        let message = if errors.is_empty() {
            last.message
        } else {
            format!("{} ({})", last.message, errors.join("; "))
        };
        self.status = Some(Notice { level: last.level, message });
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some(Notice { level: Level::Info, message: message.into() });
    }

    fn error(&mut self, message: impl Into<String>) {
        self.status = Some(Notice { level: Level::Error, message: message.into() });
    }

    /// Report errors the page did not already turn into notices.
    fn report(&mut self, err: PageError) {
        match err {
            PageError::Service(_) | PageError::Validation(_) => {}
            PageError::Cancelled => self.info("Cancelled"),
            PageError::NothingSelected => self.info("No tasks selected"),
            other => self.error(other.to_string()),
        }
    }

    fn highlighted(&self) -> Option<u64> {
        let ids = self.page.visible_ids();
        self.table_state.selected().and_then(|i| ids.get(i).copied())
    }

    fn clamp_cursor(&mut self) {
        let len = self.page.visible_ids().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            None => self.table_state.select(Some(0)),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.page.visible_ids().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down { (current + 1).min(len - 1) } else { current.saturating_sub(1) };
        self.table_state.select(Some(next));
    }

    fn reload(&mut self) {
        self.page.reload(&self.db);
        self.absorb_notices();
        self.clamp_cursor();
    }

    fn cycle_project_filter(&mut self) {
        let ids: Vec<u64> = self.page.projects().iter().map(|p| p.id).collect();
        let next = match self.page.query().project {
            None => ids.first().copied(),
            Some(current) => ids
                .iter()
                .position(|&id| id == current)
                .and_then(|i| ids.get(i + 1))
                .copied(),
        };
        self.page.set_project_filter(next);
    }

    fn toggle_complete(&mut self, id: u64) {
        let result = self.page.toggle_complete(&mut self.db, id);
        self.absorb_notices();
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn ask_delete(&mut self, id: u64) {
        if let Some(prompt) = self.page.delete_prompt(id) {
            self.confirm = Some(PendingConfirm::DeleteTask { id, prompt });
            self.state = AppState::Confirm;
        }
    }

    fn ask_bulk_delete(&mut self) {
        let count = self.page.selection().len();
        if count == 0 {
            self.info("No tasks selected");
            return;
        }
        self.confirm = Some(PendingConfirm::BulkDelete { prompt: BulkAction::Delete.confirmation_prompt(count) });
        self.state = AppState::Confirm;
    }

    /// Dispatch a bulk action. Destructive actions have been confirmed in the dialog already.
    fn run_bulk(&mut self, action: BulkAction) {
        let result = self.page.run_bulk(&mut self.db, action, |_| true);
        self.absorb_notices();
        if let Err(e) = result {
            self.report(e);
        }
        self.clamp_cursor();
    }

    fn open_picker(&mut self, state: AppState) {
        if self.page.selection().is_empty() {
            self.info("No tasks selected");
            return;
        }
        if state == AppState::BulkMove && self.page.projects().is_empty() {
            self.info("No projects to move to");
            return;
        }
        self.picker = 0;
        self.state = state;
    }

    fn open_add_form(&mut self) {
        self.form = TaskFormState::new(self.page.projects(), self.page.query().project);
        self.state = AppState::AddTask;
    }

    fn open_edit_form(&mut self, id: u64) {
        if let Some(task) = self.page.task(id) {
            self.form = TaskFormState::from_task(task, self.page.projects());
            self.state = AppState::EditTask;
        }
    }

    fn submit_form(&mut self) {
        let form = match self.form.to_form(self.page.today()) {
            Ok(form) => form,
            Err(errors) => {
                self.form.errors = errors;
                return;
            }
        };
        let result = match self.form.editing {
            Some(id) => self.page.update_task(&mut self.db, id, &form).map(|_| ()),
            None => self.page.create_task(&mut self.db, &form).map(|_| ()),
        };
        self.absorb_notices();
        match result {
            Ok(()) => {
                self.state = AppState::TaskList;
                self.clamp_cursor();
            }
            Err(PageError::Validation(errors)) => self.form.errors = errors,
            Err(e) => self.report(e),
        }
    }

    /// Handle one key press. Returns true when the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.status = None;
        match self.state {
            AppState::TaskList => return self.handle_task_list_key(key.code),
            AppState::TaskDetail => self.handle_detail_key(key.code),
            AppState::AddTask | AppState::EditTask => self.handle_form_key(key.code),
            AppState::Projects => self.handle_projects_key(key.code),
            AppState::Dashboard | AppState::Help => self.state = AppState::TaskList,
            AppState::Confirm => self.handle_confirm_key(key.code),
            AppState::BulkPriority | AppState::BulkMove => self.handle_picker_key(key.code),
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.search.clear();
                self.page.set_search("");
                self.input_mode = InputMode::None;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::None;
                if !self.search.value.is_empty() {
                    let count = self.page.visible_ids().len();
                    self.info(format!("Search applied: '{}' ({count} tasks)", self.search.value));
                }
            }
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.page.set_search(self.search.value.clone());
            }
            KeyCode::Delete => {
                self.search.handle_delete();
                self.page.set_search(self.search.value.clone());
            }
            KeyCode::Char(c) => {
                self.search.handle_char(c);
                self.page.set_search(self.search.value.clone());
            }
            _ => {}
        }
        self.clamp_cursor();
    }

    fn handle_task_list_key(&mut self, code: KeyCode) -> bool {
        if self.input_mode == InputMode::Search {
            self.handle_search_key(code);
            return false;
        }
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.search.value.is_empty() {
                    return true;
                }
                self.search.clear();
                self.page.set_search("");
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char(' ') => {
                if let Some(id) = self.highlighted() {
                    if let Err(e) = self.page.toggle_selected(id) {
                        self.report(e);
                    }
                }
            }
            KeyCode::Char('A') => self.page.toggle_select_all(),
            KeyCode::Char('f') => {
                let next = self.page.query().category.next();
                self.page.set_category(next);
            }
            KeyCode::Char('p') => self.cycle_project_filter(),
            KeyCode::Char('s') => {
                let (key, direction) = self.page.sort();
                self.page.set_sort(key.next(), direction);
            }
            KeyCode::Char('o') => {
                let (key, direction) = self.page.sort();
                self.page.set_sort(key, direction.flipped());
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.highlighted() {
                    self.toggle_complete(id);
                }
            }
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => {
                if let Some(id) = self.highlighted() {
                    self.open_edit_form(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.highlighted() {
                    self.ask_delete(id);
                }
            }
            KeyCode::Enter => {
                if self.highlighted().is_some() {
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('x') => self.run_bulk(BulkAction::MarkComplete),
            KeyCode::Char('u') => self.run_bulk(BulkAction::MarkIncomplete),
            KeyCode::Char('P') => self.open_picker(AppState::BulkPriority),
            KeyCode::Char('m') => self.open_picker(AppState::BulkMove),
            KeyCode::Char('D') => self.ask_bulk_delete(),
            KeyCode::Char('r') => {
                self.reload();
                if self.status.is_none() {
                    self.info("Refreshed");
                }
            }
            KeyCode::Char('g') => self.state = AppState::Dashboard,
            KeyCode::Char('w') => {
                self.project_table_state.select(Some(0));
                self.state = AppState::Projects;
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        self.clamp_cursor();
        false
    }

    fn handle_detail_key(&mut self, code: KeyCode) {
        let Some(id) = self.highlighted() else {
            self.state = AppState::TaskList;
            return;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::TaskList,
            KeyCode::Char('e') => self.open_edit_form(id),
            KeyCode::Char('d') => self.ask_delete(id),
            KeyCode::Char('c') => self.toggle_complete(id),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    fn visible_projects(&self) -> Vec<&Project> {
        let query = ProjectQuery { search: String::new(), status: self.project_status_filter };
        filter_projects(self.page.projects(), &query)
    }

    fn handle_projects_key(&mut self, code: KeyCode) {
        let len = self.visible_projects().len();
        let current = self.project_table_state.selected().unwrap_or(0);
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('w') => self.state = AppState::TaskList,
            KeyCode::Up | KeyCode::Char('k') => self.project_table_state.select(Some(current.saturating_sub(1))),
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.project_table_state.select(Some((current + 1).min(len - 1)));
            }
            KeyCode::Char('f') => {
                self.project_status_filter = match self.project_status_filter {
                    None => Some(PROJECT_STATUSES[0]),
                    Some(s) => PROJECT_STATUSES.iter().position(|&p| p == s).and_then(|i| PROJECT_STATUSES.get(i + 1)).copied(),
                };
                self.project_table_state.select(Some(0));
            }
            KeyCode::Enter => {
                let picked = self.visible_projects().get(current).map(|p| (p.id, p.title.clone()));
                if let Some((id, title)) = picked {
                    self.page.set_project_filter(Some(id));
                    self.state = AppState::TaskList;
                    self.clamp_cursor();
                    self.info(format!("Showing tasks in {title}"));
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state = AppState::TaskList;
                match self.confirm.take() {
                    Some(PendingConfirm::DeleteTask { id, .. }) => {
                        let result = self.page.delete_task(&mut self.db, id, |_| true);
                        self.absorb_notices();
                        if let Err(e) = result {
                            self.report(e);
                        }
                        self.clamp_cursor();
                    }
                    Some(PendingConfirm::BulkDelete { .. }) => self.run_bulk(BulkAction::Delete),
                    None => {}
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.confirm = None;
                self.info("Cancelled");
            }
            _ => {}
        }
    }

    fn picker_len(&self) -> usize {
        match self.state {
            AppState::BulkPriority => PRIORITIES.len(),
            _ => self.page.projects().len(),
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let len = self.picker_len();
        if len == 0 {
            self.state = AppState::TaskList;
            return;
        }
        match code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => self.picker = (self.picker + len - 1) % len,
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => self.picker = (self.picker + 1) % len,
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Enter => {
                let action = match self.state {
                    AppState::BulkPriority => Some(BulkAction::SetPriority(PRIORITIES[self.picker % len])),
                    _ => self.page.projects().get(self.picker).map(|p| BulkAction::MoveToProject(p.id)),
                };
                self.state = AppState::TaskList;
                if let Some(action) = action {
                    self.run_bulk(action);
                }
            }
            _ => {}
        }
    }

    /// Poll for and handle keyboard events. Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let query = self.page.query();
        let (sort_key, direction) = self.page.sort();
        let project = match query.project {
            Some(id) => project_title(self.page.projects(), id).to_string(),
            None => "All".to_string(),
        };
        let header_text = Line::from(vec![
            Span::styled("TASKBOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!(
                    "Project: {project}  Category: {}  Sort: {} {}",
                    query.category.label(),
                    sort_key.label(),
                    direction.arrow()
                ),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        if let Some(err) = self.page.load_error() {
            let paragraph = Paragraph::new(err.to_string())
                .style(Style::default().fg(Color::LightRed))
                .block(Block::default().borders(Borders::ALL).title("Tasks"))
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, chunks[1]);
            return;
        }

        let today = self.page.today();
        let visible = self.page.visible();
        let selection = self.page.selection();
        let rows: Vec<Row> = visible
            .iter()
            .map(|task| {
                let marked = selection.contains(task.id);
                let mut style = if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                if marked {
                    style = style.bg(DARK_PURPLE);
                }
                Row::new(vec![
                    Cell::from(if marked { "[x]" } else { "[ ]" }),
                    Cell::from(task.id.to_string()),
                    Cell::from(if task.completed { "done" } else { "" }),
                    Cell::from(format_priority(task.priority)).style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(format_due_relative(task.due_date, today)),
                    Cell::from(truncate(project_title(self.page.projects(), task.project_id), 16)),
                    Cell::from(task.title.as_str()),
                ])
                .style(style)
            })
            .collect();

        let header = Row::new(["", "ID", "Done", "Priority", "Due", "Project", "Title"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)))
        .height(1);

        let widths = [
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) | {} selected{} - Press 'h' for help",
                visible.len(),
                self.page.tasks().len(),
                selection.len(),
                if self.page.is_loading() { " | loading..." } else { "" }
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.highlighted().and_then(|id| self.page.task(id)) else {
            return;
        };
        let today = self.page.today();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let project = project_title(self.page.projects(), task.project_id);
        let text = vec![
            Line::from(vec![Span::styled("Title:       ", bold), Span::raw(task.title.as_str())]),
            Line::from(vec![
                Span::styled("Status:      ", bold),
                Span::raw(if task.completed { "Completed" } else { "Pending" }),
            ]),
            Line::from(vec![
                Span::styled("Priority:    ", bold),
                Span::styled(format_priority(task.priority), Style::default().fg(priority_color(task.priority))),
            ]),
            Line::from(vec![
                Span::styled("Project:     ", bold),
                Span::raw(if project.is_empty() { "-" } else { project }),
            ]),
            Line::from(vec![
                Span::styled("Due:         ", bold),
                Span::raw(match task.due_date {
                    Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
                    None => "-".into(),
                }),
            ]),
            Line::from(vec![
                Span::styled("Created:     ", bold),
                Span::raw(task.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            ]),
            Line::from(""),
            Line::from(Span::styled("Description:", bold)),
            Line::from(task.description.as_deref().unwrap_or("-")),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Task #{} - e: edit  d: delete  c: toggle  Esc: back", task.id)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);
        let title = if self.form.editing.is_some() { "Edit Task" } else { "Add Task" };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        let form = &self.form;
        let field_block = |label: &str, field: usize, error_key: &str| {
            let focused = form.current_field == field;
            let title = match form.errors.get(error_key) {
                Some(err) => Line::from(vec![
                    Span::raw(format!("{label} ")),
                    Span::styled(format!("- {err}"), Style::default().fg(Color::LightRed)),
                ]),
                None => Line::from(label.to_string()),
            };
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(if focused { Style::default().fg(GOLD) } else { Style::default() })
        };

        f.render_widget(
            Paragraph::new(form.title.value.as_str()).block(field_block("Title *", TITLE_FIELD, "title")),
            chunks[0],
        );
        f.render_widget(
            Paragraph::new(form.description.value.as_str())
                .block(field_block("Description", DESCRIPTION_FIELD, "description")),
            chunks[1],
        );
        let project = form.selected_project().map_or("Select a project", |(_, title)| title.as_str());
        f.render_widget(
            Paragraph::new(format!("< {project} >")).block(field_block("Project *", PROJECT_FIELD, "project")),
            chunks[2],
        );
        f.render_widget(
            Paragraph::new(form.due.value.as_str()).block(field_block("Due (today, in 3d, 2024-12-25)", DUE_FIELD, "due")),
            chunks[3],
        );
        let priority = form.selected_priority();
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("< {} >", priority.as_str()),
                Style::default().fg(priority_color(Some(priority))),
            ))
            .block(field_block("Priority", PRIORITY_FIELD, "priority")),
            chunks[4],
        );
        f.render_widget(
            Paragraph::new("Tab/↑↓ move  ←→ change selectors  Enter save  Esc cancel")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            chunks[5],
        );

        let cursor_target = match form.current_field {
            TITLE_FIELD => Some((&form.title, chunks[0])),
            DESCRIPTION_FIELD => Some((&form.description, chunks[1])),
            DUE_FIELD => Some((&form.due, chunks[3])),
            _ => None,
        };
        if let Some((input, rect)) = cursor_target {
            let x = rect.x + 1 + (input.cursor as u16).min(rect.width.saturating_sub(2));
            f.set_cursor_position((x, rect.y + 1));
        }
    }

    fn render_projects(&mut self, f: &mut Frame, area: Rect) {
        let filter = self.project_status_filter.map_or("All", ProjectStatus::label);
        let rows: Vec<Row> = self
            .visible_projects()
            .into_iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.id.to_string()),
                    Cell::from(p.title.clone()),
                    Cell::from(p.status.label()).style(Style::default().fg(status_color(p.status))),
                    Cell::from(format!("{}/{}", p.completed_count, p.task_count)),
                    Cell::from(format!("{}%", p.progress)),
                ])
            })
            .collect();
        let header = Row::new(["ID", "Title", "Status", "Tasks", "Progress"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)));
        let widths = [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Projects (status: {filter}) - f: filter  Enter: show tasks  Esc: back"
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.project_table_state);
    }

    fn render_dashboard(&mut self, f: &mut Frame, area: Rect) {
        let stats = summarize(self.page.projects(), self.page.tasks(), self.page.today());
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut text = vec![
            Line::from(Span::styled("Dashboard", bold)),
            Line::from(""),
            Line::from(format!("Projects:  {}  ({} active)", stats.total_projects, stats.active_projects)),
            Line::from(format!("Tasks:     {}  ({} completed)", stats.total_tasks, stats.completed_tasks)),
            Line::from(vec![
                Span::raw("Overdue:   "),
                Span::styled(
                    stats.overdue_tasks.to_string(),
                    if stats.overdue_tasks > 0 { Style::default().fg(Color::LightRed) } else { Style::default() },
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled("Recent projects", bold)),
        ];
        if stats.recent.is_empty() {
            text.push(Line::from("  -"));
        }
        for recent in &stats.recent {
            text.push(Line::from(vec![
                Span::raw(format!("  {:<28}", truncate(&recent.project.title, 28))),
                Span::styled(
                    format!("{:<12}", recent.project.status.label()),
                    Style::default().fg(status_color(recent.project.status)),
                ),
                Span::raw(format!("{} tasks", recent.task_count)),
            ]));
        }
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Dashboard - Press any key to return"));
        f.render_widget(paragraph, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Taskboard Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  ↑/k, ↓/j     Navigate tasks"),
            Line::from("  Enter        View task details"),
            Line::from("  a / e / d    Add, edit, delete task"),
            Line::from("  c            Toggle task completion"),
            Line::from("  /            Search title and description"),
            Line::from("  p            Cycle project filter"),
            Line::from("  f            Cycle category (All, Active, Completed, Due Today, High Priority, By Project)"),
            Line::from("  s / o        Cycle sort key / flip direction"),
            Line::from("  r            Reload from store"),
            Line::from("  g / w        Dashboard / projects"),
            Line::from("  h/F1         Show this help"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            Line::from(Span::styled("Bulk Actions:", bold)),
            Line::from("  Space        Select or deselect task"),
            Line::from("  A            Select all visible / clear"),
            Line::from("  x / u        Mark selected complete / incomplete"),
            Line::from("  P            Set priority of selected"),
            Line::from("  m            Move selected to a project"),
            Line::from("  D            Delete selected"),
            Line::from(""),
            Line::from(Span::styled("Due Date Formats:", bold)),
            Line::from("  YYYY-MM-DD, today, tomorrow, in 3d, in 2w, friday, next monday, eow, eom"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let prompt = self.confirm.as_ref().map_or("", PendingConfirm::prompt);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(prompt, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_picker(&mut self, f: &mut Frame, area: Rect) {
        let (title, options): (&str, Vec<String>) = match self.state {
            AppState::BulkPriority => ("Set priority", PRIORITIES.iter().map(|p| p.as_str().to_string()).collect()),
            _ => ("Move to project", self.page.projects().iter().map(|p| p.title.clone()).collect()),
        };
        let count = self.page.selection().len();
        let area = centered_rect(40, 40, area);
        f.render_widget(Clear, area);
        let mut lines = vec![Line::from(format!("{count} selected")), Line::from("")];
        for (i, option) in options.iter().enumerate() {
            let style = if i == self.picker {
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if i == self.picker { ">> " } else { "   " };
            lines.push(Line::from(Span::styled(format!("{marker}{option}"), style)));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(format!("{title} - Enter apply, Esc cancel")));
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let (text, bg) = if self.input_mode == InputMode::Search && self.state == AppState::TaskList {
            (format!("Search: {} (Esc to clear, Enter to confirm)", self.search.value), GOLD)
        } else if let Some(notice) = &self.status {
            (notice.message.clone(), notice_color(notice.level))
        } else {
            let text = match self.state {
                AppState::TaskList => {
                    let search = if self.search.value.is_empty() {
                        String::new()
                    } else {
                        format!(" (search '{}')", self.search.value)
                    };
                    format!("Tasks: {}{search} | Press 'h' for help", self.page.visible_ids().len())
                }
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::Projects => "Projects".to_string(),
                AppState::Dashboard => "Dashboard".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
                AppState::BulkPriority | AppState::BulkMove => "Bulk Action".to_string(),
            };
            (text, Color::DarkGray)
        };
        let fg = if bg == GOLD { Color::Rgb(20, 20, 20) } else { Color::White };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(fg))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::AddTask | AppState::EditTask => {
                self.render_task_list(f, chunks[0]);
                self.render_task_form(f, chunks[0]);
            }
            AppState::Projects => self.render_projects(f, chunks[0]),
            AppState::Dashboard => self.render_dashboard(f, chunks[0]),
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
            AppState::BulkPriority | AppState::BulkMove => {
                self.render_task_list(f, chunks[0]);
                self.render_picker(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop. Handles rendering and input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::db::fixtures::{add_task, seeded};
    use crate::fields::Priority;
    use crate::service::TaskService;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Tasks "Alpha" (1, project 1) and "Beta" (2, project 2); Beta is listed first.
    fn app() -> App {
        let mut db = seeded();
        add_task(&mut db, "Alpha", 1);
        add_task(&mut db, "Beta", 2);
        App::new(db, &ViewDefaults::default())
    }

    #[test]
    fn test_space_and_select_all() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.page.selection().ids(), vec![2]);
        press(&mut app, KeyCode::Char('A'));
        assert_eq!(app.page.selection().len(), 2);
        press(&mut app, KeyCode::Char('A'));
        assert!(app.page.selection().is_empty());
    }

    #[test]
    fn test_bulk_complete_from_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('A'));
        press(&mut app, KeyCode::Char('x'));
        assert!(app.db.get_by_id(1).unwrap().completed);
        assert!(app.db.get_by_id(2).unwrap().completed);
        assert!(app.page.selection().is_empty());
        assert_eq!(app.status.as_ref().unwrap().message, "2 tasks marked as complete!");
    }

    #[test]
    fn test_bulk_without_selection_is_refused() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.status.as_ref().unwrap().message, "No tasks selected");
        press(&mut app, KeyCode::Char('P'));
        assert_eq!(app.state, AppState::TaskList);
    }

    #[test]
    fn test_priority_picker_applies_to_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('P'));
        assert_eq!(app.state, AppState::BulkPriority);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.db.get_by_id(2).unwrap().priority, Some(Priority::High));
        assert_eq!(app.db.get_by_id(1).unwrap().priority, Some(Priority::Medium));
    }

    #[test]
    fn test_search_prunes_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('A'));
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "alp");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.page.visible_ids(), vec![1]);
        assert_eq!(app.page.selection().ids(), vec![1]);
        assert_eq!(app.highlighted(), Some(1));
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.db.get_by_id(2).is_ok());
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.db.get_by_id(2).is_err());
        assert_eq!(app.status.as_ref().unwrap().message, "Task deleted successfully!");
    }

    #[test]
    fn test_add_form_validates_then_creates() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Gamma");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);
        assert_eq!(app.form.errors.get("project"), Some("Please select a project"));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.page.tasks().len(), 3);
        assert_eq!(app.status.as_ref().unwrap().message, "Task created successfully!");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
        let mut app = self::app();
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_every_screen_renders() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        for key in ['h', 'g', 'w', 'a'] {
            press(&mut app, KeyCode::Char(key));
            terminal.draw(|f| app.render(f)).unwrap();
            press(&mut app, KeyCode::Esc);
            terminal.draw(|f| app.render(f)).unwrap();
        }
        press(&mut app, KeyCode::Char('d'));
        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('A'));
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.state, AppState::BulkMove);
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
