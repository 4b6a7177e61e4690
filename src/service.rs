//! Record service boundary.
//!
//! The page and the command handlers only talk to these traits. Every call
//! returns normalized `Task` / `Project` values; implementations are
//! responsible for logging their own failures.

use crate::error::{RecordFailure, ServiceError};
use crate::project::{Project, ProjectDraft, ProjectPatch};
use crate::task::{Task, TaskDraft, TaskPatch};

/// Result of an aggregate request: which records went through and which did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub succeeded: Vec<u64>,
    pub failed: Vec<RecordFailure>,
}

impl BulkOutcome {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty()
    }
}

pub trait TaskService {
    /// Fetch every task, newest first, optionally restricted to one project.
    fn get_all(&self, project_filter: Option<u64>) -> Result<Vec<Task>, ServiceError>;

    fn get_by_id(&self, id: u64) -> Result<Task, ServiceError>;

    fn create(&mut self, draft: TaskDraft) -> Result<Task, ServiceError>;

    fn update(&mut self, id: u64, patch: TaskPatch) -> Result<Task, ServiceError>;

    fn delete(&mut self, id: u64) -> Result<(), ServiceError>;

    /// Apply one patch to many tasks in a single request.
    fn bulk_update(&mut self, ids: &[u64], patch: TaskPatch) -> Result<BulkOutcome, ServiceError>;

    fn bulk_delete(&mut self, ids: &[u64]) -> Result<BulkOutcome, ServiceError>;

    /// Flip the completion flag by reading the task and writing it back.
    fn toggle_complete(&mut self, id: u64) -> Result<Task, ServiceError> {
        let task = self.get_by_id(id)?;
        self.update(id, TaskPatch::completed(!task.completed))
    }
}

pub trait ProjectService {
    fn get_all_projects(&self) -> Result<Vec<Project>, ServiceError>;

    fn get_project(&self, id: u64) -> Result<Project, ServiceError>;

    fn create_project(&mut self, draft: ProjectDraft) -> Result<Project, ServiceError>;

    fn update_project(&mut self, id: u64, patch: ProjectPatch) -> Result<Project, ServiceError>;

    /// Remove a project. Its tasks are left in place.
    fn delete_project(&mut self, id: u64) -> Result<(), ServiceError>;
}

/// Everything the task page needs from one backend.
pub trait Backend: TaskService + ProjectService {}

impl<T: TaskService + ProjectService> Backend for T {}
