//! Enumerations for TUI state management.

/// Which screen the terminal user interface is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    TaskDetail,
    AddTask,
    EditTask,
    Projects,
    Dashboard,
    Help,
    Confirm,
    /// Choosing the priority for a bulk "set priority".
    BulkPriority,
    /// Choosing the target project for a bulk "move".
    BulkMove,
}

/// Input mode for the task list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    None,
    /// Keystrokes edit the search text.
    Search,
}

/// A destructive action waiting on the confirm dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingConfirm {
    DeleteTask { id: u64, prompt: String },
    BulkDelete { prompt: String },
}

impl PendingConfirm {
    pub fn prompt(&self) -> &str {
        match self {
            PendingConfirm::DeleteTask { prompt, .. } | PendingConfirm::BulkDelete { prompt } => prompt,
        }
    }
}
