//! Project records and the project list filters.
//!
//! Projects group tasks. Task counts and progress are derived by the record
//! service when projects are read; nothing here recomputes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FormErrors;
use crate::fields::ProjectStatus;

/// A project with the task statistics supplied by the record service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub task_count: u32,
    pub completed_count: u32,
    /// Percentage of completed tasks, 0-100.
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
}

/// Editable form state for creating or editing a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
}

impl ProjectForm {
    pub fn validate(&self) -> Result<ProjectDraft, FormErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            let mut errors = FormErrors::default();
            errors.insert("title", "Project title is required");
            return Err(errors);
        }
        Ok(ProjectDraft {
            title: title.to_string(),
            description: Some(self.description.trim().to_string()).filter(|d| !d.is_empty()),
            status: self.status,
        })
    }
}

/// Search text plus an optional status, as offered on the projects page.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub search: String,
    /// `None` means every status.
    pub status: Option<ProjectStatus>,
}

/// Filter projects by case-insensitive title/description search and status.
pub fn filter_projects<'a>(projects: &'a [Project], query: &ProjectQuery) -> Vec<&'a Project> {
    let needle = query.search.trim().to_lowercase();
    projects
        .iter()
        .filter(|p| {
            if !needle.is_empty() {
                let in_title = p.title.to_lowercase().contains(&needle);
                let in_desc = p
                    .description
                    .as_ref()
                    .map_or(false, |d| d.to_lowercase().contains(&needle));
                if !in_title && !in_desc {
                    return false;
                }
            }
            query.status.map_or(true, |s| p.status == s)
        })
        .collect()
}

/// Look up a project title, falling back to an empty string for unknown ids.
pub fn project_title(projects: &[Project], id: u64) -> &str {
    projects
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.title.as_str())
        .unwrap_or("")
}


#[cfg(test)]
mod tests {
    use super::fixtures::project;
    use super::*;

    #[test]
    fn test_filter_projects_by_search_and_status() {
        let mut infra = project(1, "Infrastructure", ProjectStatus::Active);
        infra.description = Some("Servers and CI".into());
        let projects = vec![
            infra,
            project(2, "Website", ProjectStatus::OnHold),
            project(3, "Mobile app", ProjectStatus::Active),
        ];

        let q = ProjectQuery { search: "ci".into(), status: None };
        let ids: Vec<u64> = filter_projects(&projects, &q).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);

        let q = ProjectQuery { search: "  ".into(), status: Some(ProjectStatus::Active) };
        let ids: Vec<u64> = filter_projects(&projects, &q).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_project_form_requires_title() {
        let form = ProjectForm::default();
        assert_eq!(form.validate().unwrap_err().get("title"), Some("Project title is required"));

        let form = ProjectForm { title: " Launch ".into(), ..Default::default() };
        let draft = form.validate().unwrap();
        assert_eq!(draft.title, "Launch");
        assert_eq!(draft.status, ProjectStatus::NotStarted);
    }

    #[test]
    fn test_project_title_lookup() {
        let projects = vec![project(4, "Ops", ProjectStatus::Active)];
        assert_eq!(project_title(&projects, 4), "Ops");
        assert_eq!(project_title(&projects, 9), "");
    }
}
