//! Wire records exchanged with the record service and the adapter that
//! normalizes them.
//!
//! Records use the hosted service's field names (`Id`, `projectId`,
//! `dueDate`, ...). Reads return references expanded to `{ "Id", "Name" }`
//! while writes carry bare ids, so `projectId` accepts both shapes. Only
//! `Task` and `Project` leave this module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fields::{Priority, ProjectStatus};
use crate::project::Project;
use crate::task::Task;

/// A lookup field: either a bare id or the expanded `{Id, Name}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(u64),
    Expanded {
        #[serde(rename = "Id")]
        id: u64,
        #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Reference {
    pub fn id(&self) -> u64 {
        match self {
            Reference::Id(id) => *id,
            Reference::Expanded { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "projectId", default)]
    pub project_id: Option<Reference>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "taskCount", default, skip_serializing_if = "Option::is_none")]
    pub task_count: Option<u32>,
    #[serde(rename = "completedTasks", default, skip_serializing_if = "Option::is_none")]
    pub completed_tasks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

/// Parse a timestamp written either as RFC 3339 or as a bare `YYYY-MM-DD`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a due date. Timestamps keep their UTC calendar day.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date_naive()))
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn format_due_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

impl TaskRecord {
    /// Normalize into a `Task`. Records without an id, title or project are dropped.
    pub fn into_task(self) -> Option<Task> {
        let Some(id) = self.id else {
            warn!("dropping task record without an Id");
            return None;
        };
        let title = self
            .title
            .or(self.name)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            warn!(task_id = id, "dropping task record without a title");
            return None;
        };
        let Some(project) = self.project_id else {
            warn!(task_id = id, "dropping task record without a project reference");
            return None;
        };
        let created_at = match self.created_at.as_deref().and_then(parse_timestamp) {
            Some(ts) => ts,
            None => {
                warn!(task_id = id, raw = ?self.created_at, "task has no readable createdAt");
                DateTime::<Utc>::UNIX_EPOCH
            }
        };
        Some(Task {
            id,
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            project_id: project.id(),
            completed: self.completed.unwrap_or(false),
            priority: self.priority.as_deref().and_then(Priority::parse),
            due_date: self.due_date.as_deref().and_then(parse_due_date),
            created_at,
        })
    }
}

impl ProjectRecord {
    /// Normalize into a `Project`. Records without an id or title are dropped.
    pub fn into_project(self) -> Option<Project> {
        let Some(id) = self.id else {
            warn!("dropping project record without an Id");
            return None;
        };
        let Some(title) = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
            warn!(project_id = id, "dropping project record without a title");
            return None;
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let updated_at = self
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(created_at);
        let task_count = self.task_count.unwrap_or(0);
        let completed_count = self.completed_tasks.unwrap_or(0).min(task_count);
        Some(Project {
            id,
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            status: self.status.as_deref().map(ProjectStatus::parse).unwrap_or_default(),
            created_at,
            updated_at,
            task_count,
            completed_count,
            progress: self.progress.unwrap_or(0).min(100),
        })
    }
}

/// Adapt a batch of task records, skipping the ones that cannot be normalized.
pub fn adapt_tasks(records: Vec<TaskRecord>) -> Vec<Task> {
    records.into_iter().filter_map(TaskRecord::into_task).collect()
}

pub fn adapt_projects(records: Vec<ProjectRecord>) -> Vec<Project> {
    records.into_iter().filter_map(ProjectRecord::into_project).collect()
}
