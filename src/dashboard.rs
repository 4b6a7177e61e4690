//! Dashboard summary over the cached projects and tasks.

use chrono::NaiveDate;

use crate::fields::ProjectStatus;
use crate::project::Project;
use crate::task::Task;

/// How many projects the dashboard lists under "recent".
pub const RECENT_PROJECTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RecentProject<'a> {
    pub project: &'a Project,
    /// Tasks referencing the project, counted from the task list.
    pub task_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats<'a> {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub recent: Vec<RecentProject<'a>>,
}

/// A task is overdue when it is still open and its due day has passed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && task.due_date.map_or(false, |due| due < today)
}

pub fn summarize<'a>(projects: &'a [Project], tasks: &[Task], today: NaiveDate) -> DashboardStats<'a> {
    let mut newest: Vec<&Project> = projects.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let recent = newest
        .into_iter()
        .take(RECENT_PROJECTS)
        .map(|project| RecentProject {
            project,
            task_count: tasks.iter().filter(|t| t.project_id == project.id).count(),
        })
        .collect();

    DashboardStats {
        total_projects: projects.len(),
        active_projects: projects.iter().filter(|p| p.status == ProjectStatus::Active).count(),
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.completed).count(),
        overdue_tasks: tasks.iter().filter(|t| is_overdue(t, today)).count(),
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::project;
    use crate::view::fixtures::{date, task};

    #[test]
    fn test_overdue_excludes_undated_completed_and_today() {
        let today = date(2024, 3, 10);
        let mut late = task(1, "late");
        late.due_date = Some(date(2024, 3, 9));
        let mut done = late.clone();
        done.id = 2;
        done.completed = true;
        let mut due_today = task(3, "today");
        due_today.due_date = Some(today);
        let undated = task(4, "undated");

        assert!(is_overdue(&late, today));
        assert!(!is_overdue(&done, today));
        assert!(!is_overdue(&due_today, today));
        assert!(!is_overdue(&undated, today));
    }

    #[test]
    fn test_summary_counts_and_recent_projects() {
        let projects = vec![
            project(1, "Oldest", ProjectStatus::Completed),
            project(2, "Middle", ProjectStatus::Active),
            project(3, "Newer", ProjectStatus::OnHold),
            project(4, "Newest", ProjectStatus::Active),
        ];
        let mut tasks = vec![task(1, "a"), task(2, "b"), task(3, "c")];
        tasks[0].project_id = 4;
        tasks[1].project_id = 4;
        tasks[1].completed = true;
        tasks[2].project_id = 2;
        tasks[2].due_date = Some(date(2024, 1, 1));

        let stats = summarize(&projects, &tasks, date(2024, 2, 1));
        assert_eq!((stats.total_projects, stats.active_projects), (4, 2));
        assert_eq!((stats.total_tasks, stats.completed_tasks, stats.overdue_tasks), (3, 1, 1));
        let recent: Vec<(u64, usize)> = stats.recent.iter().map(|r| (r.project.id, r.task_count)).collect();
        assert_eq!(recent, vec![(4, 2), (3, 0), (2, 1)]);
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = summarize(&[], &[], date(2024, 1, 1));
        assert_eq!(stats.total_projects, 0);
        assert!(stats.recent.is_empty());
    }
}
