//! Bulk task commands.
//!
//! A bulk action turns the current selection into one aggregate request to
//! the task service.

use tracing::info;

use crate::error::ServiceError;
use crate::fields::Priority;
use crate::notice::pluralize_tasks;
use crate::service::{BulkOutcome, TaskService};
use crate::task::TaskPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    MarkComplete,
    MarkIncomplete,
    SetPriority(Priority),
    MoveToProject(u64),
    Delete,
}

impl BulkAction {
    pub fn requires_confirmation(self) -> bool {
        matches!(self, BulkAction::Delete)
    }

    /// The patch sent for update actions; `None` for delete.
    pub fn patch(self) -> Option<TaskPatch> {
        match self {
            BulkAction::MarkComplete => Some(TaskPatch::completed(true)),
            BulkAction::MarkIncomplete => Some(TaskPatch::completed(false)),
            BulkAction::SetPriority(p) => Some(TaskPatch { priority: Some(p), ..Default::default() }),
            BulkAction::MoveToProject(pid) => Some(TaskPatch { project_id: Some(pid), ..Default::default() }),
            BulkAction::Delete => None,
        }
    }

    pub fn confirmation_prompt(self, count: usize) -> String {
        format!("Are you sure you want to delete {}?", pluralize_tasks(count))
    }

    /// Success message for `count` affected tasks.
    pub fn success_message(self, count: usize) -> String {
        let what = pluralize_tasks(count);
        match self {
            BulkAction::MarkComplete => format!("{what} marked as complete!"),
            BulkAction::MarkIncomplete => format!("{what} marked as incomplete!"),
            BulkAction::SetPriority(p) => format!("{what} priority changed to {}!", p.as_str()),
            BulkAction::MoveToProject(_) => format!("{what} moved to project!"),
            BulkAction::Delete => format!("{what} deleted successfully!"),
        }
    }
}

/// Issue the single service request for `action` over `ids`.
pub fn dispatch<S: TaskService + ?Sized>(
    service: &mut S,
    ids: &[u64],
    action: BulkAction,
) -> Result<BulkOutcome, ServiceError> {
    info!(?action, count = ids.len(), "dispatching bulk action");
    match action.patch() {
        Some(patch) => service.bulk_update(ids, patch),
        None => service.bulk_delete(ids),
    }
}
