//! Command implementations for the CLI interface.
//!
//! Task commands drive the same `TaskPage` controller the TUI uses, so
//! filtering, selection, bulk dispatch and notices behave identically in
//! both front ends. Project commands talk to the project service directly.

use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use crate::bulk::BulkAction;
use crate::config::ViewDefaults;
use crate::dashboard::summarize;
use crate::db::{format_due_relative, format_priority, local_today, parse_due_input, truncate, Database};
use crate::error::PageError;
use crate::fields::{Priority, ProjectStatus, SortDirection, SortKey, StatusCategory};
use crate::notice::{Level, Notice};
use crate::page::TaskPage;
use crate::project::{filter_projects, project_title, Project, ProjectForm, ProjectPatch, ProjectQuery};
use crate::service::{ProjectService, TaskService};
use crate::task::{Task, TaskForm};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// List tasks through the filter and sort stages.
    List {
        #[command(flatten)]
        view: ViewArgs,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID.
    View {
        id: u64,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Project the task belongs to.
        #[arg(long)]
        project: u64,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in 3d", "friday", ...
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        project: Option<u64>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Clear due date.
        #[arg(long)]
        clear_due: bool,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Flip a task between completed and pending.
    Toggle {
        id: u64,
    },

    /// Delete a task by ID.
    Delete {
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Apply one action to many tasks. Without IDs, every task in the filtered view is used.
    Bulk {
        #[arg(value_enum)]
        action: BulkKind,
        ids: Vec<u64>,
        /// New priority for the `priority` action.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Target project for the `move` action.
        #[arg(long)]
        to_project: Option<u64>,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Manage projects.
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Summary counts and recent projects.
    Dashboard,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// List projects.
    List {
        /// Match against title or description.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
    },
    /// Create a project.
    Add {
        title: String,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum, default_value_t = ProjectStatus::NotStarted)]
        status: ProjectStatus,
    },
    /// Update a project.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
    },
    /// Delete a project. Its tasks are kept.
    Delete {
        id: u64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BulkKind {
    Complete,
    Incomplete,
    Priority,
    Move,
    Delete,
}

impl BulkKind {
    fn to_action(self, priority: Option<Priority>, to_project: Option<u64>) -> Result<BulkAction> {
        Ok(match self {
            BulkKind::Complete => BulkAction::MarkComplete,
            BulkKind::Incomplete => BulkAction::MarkIncomplete,
            BulkKind::Priority => {
                BulkAction::SetPriority(priority.ok_or_else(|| anyhow!("--priority is required for the priority action"))?)
            }
            BulkKind::Move => {
                BulkAction::MoveToProject(to_project.ok_or_else(|| anyhow!("--to-project is required for the move action"))?)
            }
            BulkKind::Delete => BulkAction::Delete,
        })
    }
}

/// Filter and sort flags shared by `list` and `bulk`.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Case-insensitive match on title or description.
    #[arg(long)]
    pub search: Option<String>,
    /// Only tasks in this project.
    #[arg(long = "project")]
    pub project: Option<u64>,
    #[arg(long, value_enum)]
    pub category: Option<StatusCategory>,
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,
    /// Ascending order.
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,
    /// Descending order.
    #[arg(long)]
    pub desc: bool,
}

impl ViewArgs {
    /// Push the flags into the page, leaving configured defaults where a flag is absent.
    pub fn apply(&self, page: &mut TaskPage) {
        if let Some(search) = &self.search {
            page.set_search(search.as_str());
        }
        if self.project.is_some() {
            page.set_project_filter(self.project);
        }
        if let Some(category) = self.category {
            page.set_category(category);
        }
        let (mut key, mut direction) = page.sort();
        if let Some(sort) = self.sort {
            key = sort;
        }
        if self.asc {
            direction = SortDirection::Asc;
        } else if self.desc {
            direction = SortDirection::Desc;
        }
        page.set_sort(key, direction);
    }
}

/// Ask on stdin. Anything but an answer starting with `y` declines.
fn confirm(prompt: &str) -> bool {
    print!("{prompt} (y/N): ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut response = String::new();
    io::stdin().read_line(&mut response).is_ok() && response.trim().to_lowercase().starts_with('y')
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            Level::Error => eprintln!("{notice}"),
            _ => println!("{notice}"),
        }
    }
}

/// Print the page's notices and turn a page error into the command's result.
/// Error notices are left to the returned error so nothing is reported twice.
fn settle<T>(page: &mut TaskPage, result: Result<T, PageError>) -> Result<Option<T>> {
    let notices = page.drain_notices();
    match result {
        Ok(value) => {
            print_notices(&notices);
            Ok(Some(value))
        }
        Err(PageError::Cancelled) => {
            println!("Cancelled.");
            Ok(None)
        }
        Err(e) => {
            let kept: Vec<Notice> = notices.into_iter().filter(|n| n.level != Level::Error).collect();
            print_notices(&kept);
            Err(e.into())
        }
    }
}

fn load_page(db: &Database, defaults: &ViewDefaults) -> Result<TaskPage> {
    let mut page = TaskPage::new(defaults);
    page.reload(db);
    if let Some(err) = page.load_error() {
        bail!("{err}");
    }
    Ok(page)
}

fn parse_due(input: Option<&str>, today: NaiveDate) -> Result<Option<NaiveDate>> {
    match input {
        None => Ok(None),
        Some(s) => parse_due_input(s, today)
            .map(Some)
            .ok_or_else(|| anyhow!("Unrecognised due date '{s}' (try YYYY-MM-DD, today, tomorrow, in 3d, friday)")),
    }
}

/// Print tasks as a fixed-width table.
pub fn print_table(tasks: &[&Task], projects: &[Project], today: NaiveDate) {
    println!("{:<5} {:<4} {:<7} {:<10} {:<16} {}", "ID", "Done", "Pri", "Due", "Project", "Title");
    for t in tasks {
        let project = project_title(projects, t.project_id);
        println!(
            "{:<5} {:<4} {:<7} {:<10} {:<16} {}",
            t.id,
            if t.completed { "x" } else { "" },
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(if project.is_empty() { "-" } else { project }, 16),
            t.title
        );
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(db: Database, defaults: &ViewDefaults) -> Result<()> {
    crate::tui::run::run_tui(db, defaults)
}

pub fn cmd_list(db: &Database, defaults: &ViewDefaults, view: &ViewArgs, limit: Option<usize>) -> Result<()> {
    let mut page = load_page(db, defaults)?;
    view.apply(&mut page);
    let mut rows = page.visible();
    if rows.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    if let Some(n) = limit {
        rows.truncate(n);
    }
    print_table(&rows, page.projects(), page.today());
    Ok(())
}

pub fn cmd_view(db: &Database, id: u64) -> Result<()> {
    let task = db.get_by_id(id)?;
    let project = db.get_project(task.project_id).map(|p| p.title).unwrap_or_else(|_| "-".into());
    let today = local_today();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "Completed" } else { "Pending" });
    println!("Priority:     {}", format_priority(task.priority));
    println!("Project:      {} (#{})", project, task.project_id);
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Description:\n{}", task.description.unwrap_or_else(|| "-".into()));
    Ok(())
}

pub fn cmd_add(
    db: &mut Database,
    defaults: &ViewDefaults,
    title: String,
    project: u64,
    desc: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
) -> Result<()> {
    let mut page = TaskPage::new(defaults);
    let form = TaskForm {
        title,
        description: desc.unwrap_or_default(),
        project_id: Some(project),
        due_date: parse_due(due.as_deref(), page.today())?,
        priority: priority.unwrap_or_default(),
    };
    let result = page.create_task(db, &form);
    if let Some(task) = settle(&mut page, result)? {
        println!("Added task {}", task.id);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    db: &mut Database,
    defaults: &ViewDefaults,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    project: Option<u64>,
    due: Option<String>,
    clear_due: bool,
    priority: Option<Priority>,
) -> Result<()> {
    let mut page = TaskPage::new(defaults);
    let mut form = TaskForm::from_task(&db.get_by_id(id)?);
    if let Some(title) = title {
        form.title = title;
    }
    if let Some(desc) = desc {
        form.description = desc;
    }
    if project.is_some() {
        form.project_id = project;
    }
    if clear_due {
        form.due_date = None;
    } else if due.is_some() {
        form.due_date = parse_due(due.as_deref(), page.today())?;
    }
    if let Some(priority) = priority {
        form.priority = priority;
    }
    let result = page.update_task(db, id, &form);
    settle(&mut page, result)?;
    Ok(())
}

pub fn cmd_toggle(db: &mut Database, defaults: &ViewDefaults, id: u64) -> Result<()> {
    let mut page = TaskPage::new(defaults);
    let result = page.toggle_complete(db, id);
    settle(&mut page, result)?;
    Ok(())
}

pub fn cmd_delete(db: &mut Database, defaults: &ViewDefaults, id: u64, yes: bool) -> Result<()> {
    let mut page = load_page(db, defaults)?;
    let result = page.delete_task(db, id, |prompt| yes || confirm(prompt));
    settle(&mut page, result)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_bulk(
    db: &mut Database,
    defaults: &ViewDefaults,
    kind: BulkKind,
    ids: Vec<u64>,
    priority: Option<Priority>,
    to_project: Option<u64>,
    yes: bool,
    view: &ViewArgs,
) -> Result<()> {
    let action = kind.to_action(priority, to_project)?;
    let mut page = load_page(db, defaults)?;
    view.apply(&mut page);

    if ids.is_empty() {
        page.toggle_select_all();
    } else {
        for id in ids.into_iter().collect::<BTreeSet<u64>>() {
            page.toggle_selected(id)?;
        }
    }
    if page.selection().is_empty() {
        bail!("No tasks match the current filters");
    }

    let result = page.run_bulk(db, action, |prompt| yes || confirm(prompt));
    let Some(report) = settle(&mut page, result)? else {
        return Ok(());
    };
    if !report.reloaded {
        bail!("No tasks were changed");
    }
    Ok(())
}

pub fn cmd_projects(db: &mut Database, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List { search, status } => {
            let projects = db.get_all_projects()?;
            let query = ProjectQuery { search: search.unwrap_or_default(), status };
            let shown = filter_projects(&projects, &query);
            if shown.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            println!("{:<5} {:<12} {:<9} {:<5} {}", "ID", "Status", "Tasks", "Done", "Title");
            for p in shown {
                println!(
                    "{:<5} {:<12} {:<9} {:<5} {}",
                    p.id,
                    p.status.label(),
                    format!("{}/{}", p.completed_count, p.task_count),
                    format!("{}%", p.progress),
                    p.title
                );
            }
        }
        ProjectAction::Add { title, desc, status } => {
            let form = ProjectForm { title, description: desc.unwrap_or_default(), status };
            let draft = form.validate().map_err(|errors| anyhow!("{errors}"))?;
            let project = db.create_project(draft)?;
            println!("[ok] Project created successfully!");
            println!("Added project {}", project.id);
        }
        ProjectAction::Update { id, title, desc, status } => {
            if title.as_deref().map_or(false, |t| t.trim().is_empty()) {
                bail!("Project title is required");
            }
            let patch = ProjectPatch {
                title,
                description: desc.map(|d| Some(d.trim().to_string()).filter(|d| !d.is_empty())),
                status,
            };
            db.update_project(id, patch)?;
            println!("[ok] Project updated successfully!");
        }
        ProjectAction::Delete { id, yes } => {
            let project = db.get_project(id)?;
            if !yes && !confirm(&format!("Are you sure you want to delete project \"{}\"?", project.title)) {
                println!("Cancelled.");
                return Ok(());
            }
            db.delete_project(id)?;
            println!("[ok] Project deleted successfully!");
        }
    }
    Ok(())
}

pub fn cmd_dashboard(db: &Database, defaults: &ViewDefaults) -> Result<()> {
    let page = load_page(db, defaults)?;
    let stats = summarize(page.projects(), page.tasks(), page.today());
    println!("Projects:   {} ({} active)", stats.total_projects, stats.active_projects);
    println!("Tasks:      {} ({} completed)", stats.total_tasks, stats.completed_tasks);
    println!("Overdue:    {}", stats.overdue_tasks);
    println!();
    println!("Recent projects:");
    if stats.recent.is_empty() {
        println!("  -");
    }
    for recent in &stats.recent {
        println!(
            "  #{:<4} {:<24} {:<12} {} tasks",
            recent.project.id,
            truncate(&recent.project.title, 24),
            recent.project.status.label(),
            recent.task_count
        );
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;

    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}
