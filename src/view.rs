//! Filter and sort stages of the task list.
//!
//! Both stages are pure: they borrow the cached tasks and hand back an
//! ordered list of references, leaving the cache untouched.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::fields::{Priority, SortDirection, SortKey, StatusCategory};
use crate::project::{project_title, Project};
use crate::task::Task;

/// Everything the filter stage looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub search: String,
    pub project: Option<u64>,
    pub category: StatusCategory,
}

/// Keep the tasks that satisfy every active predicate, preserving store order.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &TaskQuery, today: NaiveDate) -> Vec<&'a Task> {
    let needle = query.search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| matches_search(t, &needle))
        .filter(|t| query.project.map_or(true, |pid| t.project_id == pid))
        .filter(|t| matches_category(t, query.category, today))
        .collect()
}

fn matches_search(task: &Task, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(needle)
        || task
            .description
            .as_ref()
            .map_or(false, |d| d.to_lowercase().contains(needle))
}

/// Category predicate. `ByProject` has no effect of its own.
pub fn matches_category(task: &Task, category: StatusCategory, today: NaiveDate) -> bool {
    match category {
        StatusCategory::All | StatusCategory::ByProject => true,
        StatusCategory::Active => !task.completed,
        StatusCategory::Completed => task.completed,
        // Due dates are whole days, so [start of today, start of tomorrow) is `== today`.
        StatusCategory::DueToday => task.due_date == Some(today),
        StatusCategory::HighPriority => task.priority == Some(Priority::High),
    }
}

/// Numeric rank used by the priority sort. Unknown priorities rank lowest.
pub fn priority_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(Priority::High) => 3,
        Some(Priority::Medium) => 2,
        Some(Priority::Low) => 1,
        None => 0,
    }
}

/// Compare two tasks under `key`, ascending.
pub fn compare_tasks(a: &Task, b: &Task, key: SortKey, projects: &[Project]) -> Ordering {
    match key {
        // Undated tasks count as the earliest date, in either direction.
        SortKey::DueDate => a
            .due_date
            .unwrap_or(NaiveDate::MIN)
            .cmp(&b.due_date.unwrap_or(NaiveDate::MIN)),
        SortKey::Priority => priority_rank(a.priority).cmp(&priority_rank(b.priority)),
        SortKey::Project => {
            let ta = project_title(projects, a.project_id).to_lowercase();
            let tb = project_title(projects, b.project_id).to_lowercase();
            ta.cmp(&tb)
        }
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Stable sort in place. Equal keys keep their filtered order in both directions.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey, direction: SortDirection, projects: &[Project]) {
    tasks.sort_by(|a, b| {
        let ord = compare_tasks(a, b, key, projects);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};

    use super::*;

    pub fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            project_id: 1,
            completed: false,
            priority: Some(Priority::Medium),
            due_date: None,
            created_at: DateTime::<Utc>::from_timestamp(1_700_000_000 + id as i64 * 60, 0).unwrap_or_default(),
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
