//! JSON-file record store and utility functions for task management.
//!
//! `Database` keeps project and task records in the record service's wire
//! shape, validates writes per record the way the hosted service does, and
//! implements `TaskService` and `ProjectService`. The remaining functions are
//! date parsing and formatting helpers shared by the CLI and the TUI.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{FieldError, RecordFailure, ServiceError, StoreError};
use crate::fields::Priority;
use crate::project::{Project, ProjectDraft, ProjectPatch};
use crate::record::{
    adapt_projects, adapt_tasks, format_due_date, format_timestamp, parse_timestamp, ProjectRecord,
    Reference, TaskRecord,
};
use crate::service::{BulkOutcome, ProjectService, TaskService};
use crate::task::{Task, TaskDraft, TaskPatch};

/// Record store persisted as a single pretty-printed JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Database {
    /// Open the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            info!(path = %path.display(), "no store file yet, starting empty");
            return Ok(Database { path: Some(path.to_path_buf()), ..Default::default() });
        }
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
        let mut db: Database = serde_json::from_str(&buf)
            .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;
        db.path = Some(path.to_path_buf());
        debug!(projects = db.projects.len(), tasks = db.tasks.len(), "store loaded");
        Ok(db)
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Database::default()
    }

    /// Save to disk using atomic write (temp file + rename). In-memory stores are a no-op.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let write_err = |source: std::io::Error| StoreError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let mut f = File::create(&tmp).map_err(write_err)?;
        f.write_all(data.as_bytes()).map_err(write_err)?;
        f.flush().map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)?;
        Ok(())
    }

    fn next_task_id(&self) -> u64 {
        self.tasks.iter().filter_map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn next_project_id(&self) -> u64 {
        self.projects.iter().filter_map(|p| p.id).max().unwrap_or(0) + 1
    }

    fn task_index(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == Some(id))
    }

    fn project_index(&self, id: u64) -> Option<usize> {
        self.projects.iter().position(|p| p.id == Some(id))
    }

    fn project_name(&self, id: u64) -> Option<String> {
        self.project_index(id).and_then(|i| self.projects[i].title.clone())
    }

    /// Task record as the service returns it: project reference expanded.
    fn expanded_task(&self, record: &TaskRecord) -> TaskRecord {
        let mut out = record.clone();
        if let Some(reference) = &record.project_id {
            let id = reference.id();
            out.project_id = Some(Reference::Expanded { id, name: self.project_name(id) });
        }
        out
    }

    /// Project record with its derived task statistics filled in.
    fn counted_project(&self, record: &ProjectRecord) -> ProjectRecord {
        let mut out = record.clone();
        let owned = self
            .tasks
            .iter()
            .filter(|t| t.project_id.as_ref().map(Reference::id) == record.id);
        let (total, done) = owned.fold((0u32, 0u32), |(total, done), t| {
            (total + 1, done + u32::from(t.completed.unwrap_or(false)))
        });
        out.task_count = Some(total);
        out.completed_tasks = Some(done);
        out.progress = Some(if total == 0 { 0 } else { ((done * 100 + total / 2) / total) as u8 });
        out
    }

    /// Field-level checks the hosted service performs on task writes.
    fn check_task_fields(&self, title: Option<&str>, project_id: Option<u64>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(title) = title {
            if title.trim().is_empty() {
                errors.push(FieldError { field_label: "Title".into(), message: "Field is required".into() });
            }
        }
        if let Some(pid) = project_id {
            if self.project_index(pid).is_none() {
                errors.push(FieldError {
                    field_label: "Project".into(),
                    message: format!("Referenced record {pid} does not exist"),
                });
            }
        }
        errors
    }

    fn commit(&self) -> Result<(), ServiceError> {
        self.save().map_err(|e| {
            error!(error = %e, "failed to persist store");
            ServiceError::from(e)
        })
    }

    fn apply_patch(record: &mut TaskRecord, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            record.title = Some(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            record.description = description.clone();
        }
        if let Some(pid) = patch.project_id {
            record.project_id = Some(Reference::Id(pid));
        }
        if let Some(done) = patch.completed {
            record.completed = Some(done);
        }
        if let Some(due) = patch.due_date {
            record.due_date = due.map(format_due_date);
        }
        if let Some(priority) = patch.priority {
            record.priority = Some(priority.as_str().to_string());
        }
    }

    fn single_task(&self, idx: usize) -> Result<Task, ServiceError> {
        let record = self.expanded_task(&self.tasks[idx]);
        let id = record.id.unwrap_or_default();
        record.into_task().ok_or(ServiceError::NotFound(id))
    }
}

fn log_failures(action: &str, failures: &[RecordFailure]) {
    if !failures.is_empty() {
        warn!(action, count = failures.len(), failures = ?failures, "records rejected");
    }
}

impl TaskService for Database {
    fn get_all(&self, project_filter: Option<u64>) -> Result<Vec<Task>, ServiceError> {
        let mut records: Vec<TaskRecord> = self
            .tasks
            .iter()
            .filter(|t| match project_filter {
                Some(pid) => t.project_id.as_ref().map(Reference::id) == Some(pid),
                None => true,
            })
            .map(|t| self.expanded_task(t))
            .collect();
        // Newest first.
        records.sort_by(|a, b| {
            let ka = (a.created_at.as_deref().and_then(parse_timestamp), a.id);
            let kb = (b.created_at.as_deref().and_then(parse_timestamp), b.id);
            kb.cmp(&ka)
        });
        Ok(adapt_tasks(records))
    }

    fn get_by_id(&self, id: u64) -> Result<Task, ServiceError> {
        let idx = self.task_index(id).ok_or(ServiceError::NotFound(id))?;
        self.single_task(idx)
    }

    fn create(&mut self, draft: TaskDraft) -> Result<Task, ServiceError> {
        let errors = self.check_task_fields(Some(&draft.title), Some(draft.project_id));
        if !errors.is_empty() {
            let failures = vec![RecordFailure { id: None, message: None, errors }];
            log_failures("create task", &failures);
            return Err(ServiceError::Records(failures));
        }
        let id = self.next_task_id();
        self.tasks.push(TaskRecord {
            id: Some(id),
            name: Some(draft.title.clone()),
            title: Some(draft.title),
            description: draft.description,
            project_id: Some(Reference::Id(draft.project_id)),
            completed: Some(false),
            priority: Some(draft.priority.as_str().to_string()),
            due_date: draft.due_date.map(format_due_date),
            created_at: Some(format_timestamp(Utc::now())),
        });
        self.commit()?;
        info!(task_id = id, "task created");
        self.get_by_id(id)
    }

    fn update(&mut self, id: u64, patch: TaskPatch) -> Result<Task, ServiceError> {
        let outcome = self.bulk_update(&[id], patch)?;
        if outcome.is_total_failure() {
            return Err(ServiceError::Records(outcome.failed));
        }
        self.get_by_id(id)
    }

    fn delete(&mut self, id: u64) -> Result<(), ServiceError> {
        let idx = self.task_index(id).ok_or_else(|| {
            warn!(task_id = id, "delete of missing task");
            ServiceError::NotFound(id)
        })?;
        self.tasks.remove(idx);
        self.commit()?;
        info!(task_id = id, "task deleted");
        Ok(())
    }

    fn bulk_update(&mut self, ids: &[u64], patch: TaskPatch) -> Result<BulkOutcome, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Rejected("No records supplied".into()));
        }
        if patch.is_empty() {
            return Err(ServiceError::Rejected("No fields to update".into()));
        }
        let field_errors = self.check_task_fields(patch.title.as_deref(), patch.project_id);
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            let Some(idx) = self.task_index(id) else {
                outcome.failed.push(RecordFailure {
                    id: Some(id),
                    message: Some("Record does not exist".into()),
                    errors: Vec::new(),
                });
                continue;
            };
            if !field_errors.is_empty() {
                outcome.failed.push(RecordFailure { id: Some(id), message: None, errors: field_errors.clone() });
                continue;
            }
            Self::apply_patch(&mut self.tasks[idx], &patch);
            outcome.succeeded.push(id);
        }
        if !outcome.succeeded.is_empty() {
            self.commit()?;
        }
        log_failures("update tasks", &outcome.failed);
        debug!(succeeded = outcome.succeeded.len(), failed = outcome.failed.len(), "bulk update");
        Ok(outcome)
    }

    fn bulk_delete(&mut self, ids: &[u64]) -> Result<BulkOutcome, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Rejected("No records supplied".into()));
        }
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            match self.task_index(id) {
                Some(idx) => {
                    self.tasks.remove(idx);
                    outcome.succeeded.push(id);
                }
                None => outcome.failed.push(RecordFailure {
                    id: Some(id),
                    message: Some("Record does not exist".into()),
                    errors: Vec::new(),
                }),
            }
        }
        if !outcome.succeeded.is_empty() {
            self.commit()?;
        }
        log_failures("delete tasks", &outcome.failed);
        debug!(succeeded = outcome.succeeded.len(), failed = outcome.failed.len(), "bulk delete");
        Ok(outcome)
    }
}

impl ProjectService for Database {
    fn get_all_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let mut records: Vec<ProjectRecord> = self.projects.iter().map(|p| self.counted_project(p)).collect();
        records.sort_by(|a, b| {
            let ka = (a.created_at.as_deref().and_then(parse_timestamp), a.id);
            let kb = (b.created_at.as_deref().and_then(parse_timestamp), b.id);
            kb.cmp(&ka)
        });
        Ok(adapt_projects(records))
    }

    fn get_project(&self, id: u64) -> Result<Project, ServiceError> {
        let idx = self.project_index(id).ok_or(ServiceError::NotFound(id))?;
        self.counted_project(&self.projects[idx])
            .into_project()
            .ok_or(ServiceError::NotFound(id))
    }

    fn create_project(&mut self, draft: ProjectDraft) -> Result<Project, ServiceError> {
        if draft.title.trim().is_empty() {
            return Err(ServiceError::Records(vec![RecordFailure {
                id: None,
                message: None,
                errors: vec![FieldError { field_label: "Title".into(), message: "Field is required".into() }],
            }]));
        }
        let id = self.next_project_id();
        let now = format_timestamp(Utc::now());
        self.projects.push(ProjectRecord {
            id: Some(id),
            title: Some(draft.title),
            description: draft.description,
            status: Some(draft.status.as_str().to_string()),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..Default::default()
        });
        self.commit()?;
        info!(project_id = id, "project created");
        self.get_project(id)
    }

    fn update_project(&mut self, id: u64, patch: ProjectPatch) -> Result<Project, ServiceError> {
        let idx = self.project_index(id).ok_or(ServiceError::NotFound(id))?;
        if patch.title.as_deref().map_or(false, |t| t.trim().is_empty()) {
            return Err(ServiceError::Records(vec![RecordFailure {
                id: Some(id),
                message: None,
                errors: vec![FieldError { field_label: "Title".into(), message: "Field is required".into() }],
            }]));
        }
        let record = &mut self.projects[idx];
        if let Some(title) = patch.title {
            record.title = Some(title.trim().to_string());
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(status) = patch.status {
            record.status = Some(status.as_str().to_string());
        }
        record.updated_at = Some(format_timestamp(Utc::now()));
        self.commit()?;
        info!(project_id = id, "project updated");
        self.get_project(id)
    }

    fn delete_project(&mut self, id: u64) -> Result<(), ServiceError> {
        let idx = self.project_index(id).ok_or(ServiceError::NotFound(id))?;
        self.projects.remove(idx);
        self.commit()?;
        info!(project_id = id, "project deleted");
        Ok(())
    }
}

/// Parse human-readable due date input with smart natural language support.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "next tuesday", etc.
/// - "this friday", "this weekend"
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_this_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = (today.year(), today.month());
            let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            // Coming Saturday
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        // Approximate: 30 days per month
        let (num, unit_days) = [('d', 1), ('w', 7), ('m', 30)]
            .into_iter()
            .find_map(|(suffix, days)| rest.strip_suffix(suffix).map(|num| (num, days)))?;
        let days = num.trim().parse::<i64>().ok()?.checked_mul(unit_days)?;
        return today.checked_add_signed(Duration::try_days(days)?);
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name || s == format!("this {day_name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {day_name}") {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Calculate the start and end dates of the current ISO week (Monday to Sunday).
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// Today's date in the local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Format a priority level for display.
pub fn format_priority(p: Option<Priority>) -> &'static str {
    p.map(Priority::as_str).unwrap_or("-")
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::fields::ProjectStatus;

    /// In-memory store with two projects ("Website" = 1, "Backend" = 2).
    pub fn seeded() -> Database {
        let mut db = Database::in_memory();
        for title in ["Website", "Backend"] {
            db.create_project(ProjectDraft {
                title: title.into(),
                description: None,
                status: ProjectStatus::Active,
            })
            .unwrap();
        }
        db
    }

    pub fn add_task(db: &mut Database, title: &str, project_id: u64) -> Task {
        db.create(TaskDraft {
            title: title.into(),
            description: None,
            project_id,
            due_date: None,
            priority: Priority::Medium,
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{add_task, seeded};
    use super::*;
    use crate::fields::ProjectStatus;

    #[test]
    fn test_create_assigns_ids_and_defaults() {
        let mut db = seeded();
        let a = add_task(&mut db, "First", 1);
        let b = add_task(&mut db, "Second", 2);
        assert_eq!((a.id, b.id), (1, 2));
        assert!(!a.completed);
        assert_eq!(a.priority, Some(Priority::Medium));
        assert_eq!(db.get_by_id(2).unwrap().project_id, 2);
    }

    #[test]
    fn test_create_rejects_unknown_project() {
        let mut db = seeded();
        let err = db
            .create(TaskDraft {
                title: "Orphan".into(),
                description: None,
                project_id: 99,
                due_date: None,
                priority: Priority::Low,
            })
            .unwrap_err();
        match err {
            ServiceError::Records(failures) => assert_eq!(failures[0].errors[0].field_label, "Project"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn test_get_all_filters_by_project_and_expands_reference() {
        let mut db = seeded();
        add_task(&mut db, "Landing page", 1);
        add_task(&mut db, "API", 2);
        let tasks = db.get_all(Some(2)).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "API");

        let record = db.expanded_task(&db.tasks[0]);
        assert_eq!(
            record.project_id,
            Some(Reference::Expanded { id: 1, name: Some("Website".into()) })
        );
    }

    #[test]
    fn test_get_all_is_newest_first() {
        let mut db = seeded();
        add_task(&mut db, "Old", 1);
        add_task(&mut db, "New", 1);
        db.tasks[0].created_at = Some("2024-01-01T00:00:00.000Z".into());
        db.tasks[1].created_at = Some("2024-06-01T00:00:00.000Z".into());
        let titles: Vec<String> = db.get_all(None).unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[test]
    fn test_bulk_update_reports_missing_records() {
        let mut db = seeded();
        add_task(&mut db, "One", 1);
        let outcome = db.bulk_update(&[1, 42], TaskPatch::completed(true)).unwrap();
        assert_eq!(outcome.succeeded, vec![1]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, Some(42));
        assert!(db.get_by_id(1).unwrap().completed);
    }

    #[test]
    fn test_bulk_move_to_unknown_project_fails_every_record() {
        let mut db = seeded();
        add_task(&mut db, "One", 1);
        add_task(&mut db, "Two", 1);
        let patch = TaskPatch { project_id: Some(77), ..Default::default() };
        let outcome = db.bulk_update(&[1, 2], patch).unwrap();
        assert!(outcome.is_total_failure());
        assert_eq!(db.get_by_id(1).unwrap().project_id, 1);
    }

    #[test]
    fn test_bulk_update_rejects_empty_patch() {
        let mut db = seeded();
        add_task(&mut db, "One", 1);
        let err = db.bulk_update(&[1], TaskPatch::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(ref m) if m == "No fields to update"));
    }

    #[test]
    fn test_toggle_complete_reads_then_writes() {
        let mut db = seeded();
        add_task(&mut db, "Flip", 1);
        assert!(db.toggle_complete(1).unwrap().completed);
        assert!(!db.toggle_complete(1).unwrap().completed);
        assert!(matches!(db.toggle_complete(5), Err(ServiceError::NotFound(5))));
    }

    #[test]
    fn test_project_counts_are_derived() {
        let mut db = seeded();
        add_task(&mut db, "a", 1);
        add_task(&mut db, "b", 1);
        add_task(&mut db, "c", 1);
        db.toggle_complete(1).unwrap();
        let project = db.get_project(1).unwrap();
        assert_eq!((project.task_count, project.completed_count, project.progress), (3, 1, 33));
    }

    #[test]
    fn test_delete_project_keeps_tasks() {
        let mut db = seeded();
        add_task(&mut db, "stays", 2);
        db.delete_project(2).unwrap();
        assert_eq!(db.get_all(None).unwrap().len(), 1);
        assert!(matches!(db.get_project(2), Err(ServiceError::NotFound(2))));
    }

    #[test]
    fn test_update_project_status() {
        let mut db = seeded();
        let patch = ProjectPatch { status: Some(ProjectStatus::OnHold), ..Default::default() };
        assert_eq!(db.update_project(1, patch).unwrap().status, ProjectStatus::OnHold);
    }

    #[test]
    fn test_save_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        {
            let mut db = Database::open(&path).unwrap();
            db.create_project(ProjectDraft {
                title: "Persisted".into(),
                description: Some("kept on disk".into()),
                status: ProjectStatus::Active,
            })
            .unwrap();
            add_task(&mut db, "Saved task", 1);
        }
        assert!(!path.with_extension("json.tmp").exists());
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_all_projects().unwrap()[0].title, "Persisted");
        assert_eq!(db.get_all(None).unwrap()[0].title, "Saved task");
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Database::open(&path), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_parse_due_input() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(); // Wednesday
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(parse_due_input("in 3d", today), NaiveDate::from_ymd_opt(2024, 5, 18));
        assert_eq!(parse_due_input("in 2w", today), NaiveDate::from_ymd_opt(2024, 5, 29));
        assert_eq!(parse_due_input("friday", today), NaiveDate::from_ymd_opt(2024, 5, 17));
        assert_eq!(parse_due_input("next wednesday", today), NaiveDate::from_ymd_opt(2024, 5, 22));
        assert_eq!(parse_due_input("weekend", today), NaiveDate::from_ymd_opt(2024, 5, 18));
        assert_eq!(parse_due_input("eom", today), NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(parse_due_input("2024-12-01", today), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(parse_due_input("someday", today), None);
    }

    #[test]
    fn test_parse_due_input_rejects_odd_offsets() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(parse_due_input("in 3é", today), None);
        assert_eq!(parse_due_input("in é", today), None);
        assert_eq!(parse_due_input("in 3", today), None);
        assert_eq!(parse_due_input("in 999999999999d", today), None);
        assert_eq!(parse_due_input("in 9223372036854775807w", today), None);
        assert_eq!(parse_due_input("in -2d", today), NaiveDate::from_ymd_opt(2024, 5, 13));
        assert_eq!(parse_due_input("in 1m", today), NaiveDate::from_ymd_opt(2024, 6, 14));
    }

    #[test]
    fn test_format_due_relative() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(today.succ_opt(), today), "tomorrow");
        assert_eq!(format_due_relative(today.pred_opt(), today), "1d late");
        assert_eq!(format_due_relative(NaiveDate::from_ymd_opt(2024, 5, 20), today), "in 5d");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }
}
