//! Task data structure and related functionality.
//!
//! This module defines the normalized `Task` record used by every view, the
//! `TaskForm` a user fills in to create or edit one, and the `TaskDraft` /
//! `TaskPatch` payloads that are handed to the record service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FormErrors;
use crate::fields::Priority;

/// A work item belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub project_id: u64,
    pub completed: bool,
    /// `None` when the service holds a priority this client does not know.
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a task. Produced only by `TaskForm::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub project_id: u64,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

/// Partial update. `None` leaves a field untouched; `due_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub project_id: Option<u64>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn completed(done: bool) -> Self {
        TaskPatch { completed: Some(done), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Editable form state for creating or editing a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub project_id: Option<u64>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            project_id: None,
            due_date: None,
            priority: Priority::Medium,
        }
    }
}

impl TaskForm {
    /// Pre-fill the form from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            project_id: Some(task.project_id),
            due_date: task.due_date,
            priority: task.priority.unwrap_or_default(),
        }
    }

    /// Check required fields and produce a draft ready for the service.
    pub fn validate(&self) -> Result<TaskDraft, FormErrors> {
        let mut errors = FormErrors::default();
        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required");
        }
        if self.project_id.is_none() {
            errors.insert("project", "Please select a project");
        }
        match self.project_id {
            Some(project_id) if errors.is_empty() => Ok(TaskDraft {
                title: title.to_string(),
                description: Some(self.description.trim().to_string()).filter(|d| !d.is_empty()),
                project_id,
                due_date: self.due_date,
                priority: self.priority,
            }),
            _ => Err(errors),
        }
    }

    /// Full-field patch for an edit submission.
    pub fn to_patch(&self) -> Result<TaskPatch, FormErrors> {
        self.validate().map(TaskPatch::from)
    }
}

impl From<TaskDraft> for TaskPatch {
    /// Every form field set; completion is left alone.
    fn from(draft: TaskDraft) -> Self {
        TaskPatch {
            title: Some(draft.title),
            description: Some(draft.description),
            project_id: Some(draft.project_id),
            completed: None,
            due_date: Some(draft.due_date),
            priority: Some(draft.priority),
        }
    }
}
