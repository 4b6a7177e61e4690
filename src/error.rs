//! Error types shared by the record store, the service traits and the task page.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Failures reading or writing the JSON record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single field-level complaint attached to a rejected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_label, self.message)
    }
}

/// Per-record failure reported inside an otherwise accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub id: Option<u64>,
    pub message: Option<String>,
    pub errors: Vec<FieldError>,
}

impl RecordFailure {
    /// Flatten into the lines a user sees, one per field error plus the record message.
    pub fn describe(&self) -> Vec<String> {
        let prefix = self.id.map(|id| format!("Task {id}: ")).unwrap_or_default();
        let mut out: Vec<String> = self.errors.iter().map(|e| format!("{prefix}{e}")).collect();
        if let Some(msg) = &self.message {
            out.push(format!("{prefix}{msg}"));
        }
        if out.is_empty() {
            out.push(format!("{prefix}request failed"));
        }
        out
    }
}

/// Errors surfaced by a record service call.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The whole request was refused.
    #[error("{0}")]
    Rejected(String),
    #[error("record {0} not found")]
    NotFound(u64),
    /// Every record in the request failed individually.
    #[error("{}", summarize(.0))]
    Records(Vec<RecordFailure>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn summarize(failures: &[RecordFailure]) -> String {
    failures.iter().flat_map(RecordFailure::describe).collect::<Vec<_>>().join("; ")
}

/// Field name to message, as shown next to the offending form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors returned by the task page controller.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("{0}")]
    Validation(FormErrors),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("action cancelled")]
    Cancelled,
    #[error("a bulk action is already in progress")]
    Busy,
    #[error("no tasks selected")]
    NothingSelected,
    #[error("task {0} is not in the current list")]
    UnknownTask(u64),
}
