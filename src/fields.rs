//! Enumerations and field types for task management.
//!
//! This module defines the structured values used to categorise, filter and
//! order tasks and projects: priorities, project statuses, status categories
//! and sort keys.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum Priority {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl Priority {
    /// Wire/display label, as the record service stores it.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Parse a stored priority string. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Archived,
    #[default]
    NotStarted,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Archived => "archived",
            ProjectStatus::NotStarted => "not-started",
        }
    }

    /// Human-readable label used in listings and badges.
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Archived => "Archived",
            ProjectStatus::NotStarted => "Not Started",
        }
    }

    /// Parse a stored status string; anything unrecognised is treated as not started.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "active" => ProjectStatus::Active,
            "completed" => ProjectStatus::Completed,
            "on-hold" => ProjectStatus::OnHold,
            "archived" => ProjectStatus::Archived,
            _ => ProjectStatus::NotStarted,
        }
    }
}

/// Named filter bucket applied to the task list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCategory {
    #[default]
    All,
    Active,
    Completed,
    DueToday,
    HighPriority,
    /// Narrowing comes from the project filter alone.
    ByProject,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 6] = [
        StatusCategory::All,
        StatusCategory::Active,
        StatusCategory::Completed,
        StatusCategory::DueToday,
        StatusCategory::HighPriority,
        StatusCategory::ByProject,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusCategory::All => "All",
            StatusCategory::Active => "Active",
            StatusCategory::Completed => "Completed",
            StatusCategory::DueToday => "Due Today",
            StatusCategory::HighPriority => "High Priority",
            StatusCategory::ByProject => "By Project",
        }
    }

    /// The next category in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    DueDate,
    Priority,
    Project,
    #[default]
    CreatedAt,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DueDate => "Due Date",
            SortKey::Priority => "Priority",
            SortKey::Project => "Project",
            SortKey::CreatedAt => "Created",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::DueDate => SortKey::Priority,
            SortKey::Priority => SortKey::Project,
            SortKey::Project => SortKey::CreatedAt,
            SortKey::CreatedAt => SortKey::DueDate,
        }
    }
}

/// Direction applied on top of a sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}
