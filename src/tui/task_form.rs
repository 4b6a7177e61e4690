//! Task form handling for the terminal user interface.
//!
//! `TaskFormState` holds the raw text inputs and selectors of the add/edit
//! modal and converts them into a `task::TaskForm` for the page to validate
//! and submit.

use chrono::NaiveDate;

use crate::db::parse_due_input;
use crate::error::FormErrors;
use crate::fields::Priority;
use crate::project::Project;
use crate::task::{Task, TaskForm};
use crate::tui::input::InputField;

/// Field order in the form, top to bottom.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const PROJECT_FIELD: usize = 2;
pub const DUE_FIELD: usize = 3;
pub const PRIORITY_FIELD: usize = 4;
const FIELD_COUNT: usize = 5;

pub const PRIORITIES: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

pub struct TaskFormState {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    /// Index into `projects`; `None` until the user picks one.
    pub project: Option<usize>,
    pub priority: usize,
    pub current_field: usize,
    /// `(id, title)` of every selectable project.
    pub projects: Vec<(u64, String)>,
    pub errors: FormErrors,
    /// Task being edited, `None` when creating.
    pub editing: Option<u64>,
}

impl TaskFormState {
    /// Empty form. `preselect` picks a project up front, e.g. the active project filter.
    pub fn new(projects: &[Project], preselect: Option<u64>) -> Self {
        let projects: Vec<(u64, String)> = projects.iter().map(|p| (p.id, p.title.clone())).collect();
        let project = preselect.and_then(|id| projects.iter().position(|(pid, _)| *pid == id));
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            project,
            priority: 1,
            current_field: TITLE_FIELD,
            projects,
            errors: FormErrors::default(),
            editing: None,
        };
        form.update_active_field();
        form
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task, projects: &[Project]) -> Self {
        let mut form = Self::new(projects, Some(task.project_id));
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(task.description.as_deref().unwrap_or_default());
        form.due = InputField::with_value(&task.due_date.map(|d| d.to_string()).unwrap_or_default());
        let priority = task.priority.unwrap_or_default();
        form.priority = PRIORITIES.iter().position(|&p| p == priority).unwrap_or(1);
        form.editing = Some(task.id);
        form.update_active_field();
        form
    }

    pub fn selected_project(&self) -> Option<&(u64, String)> {
        self.project.and_then(|i| self.projects.get(i))
    }

    pub fn selected_priority(&self) -> Priority {
        PRIORITIES[self.priority % PRIORITIES.len()]
    }

    /// Collect the inputs. Due-date text that cannot be read is reported
    /// together with the page's own validation errors.
    pub fn to_form(&self, today: NaiveDate) -> Result<TaskForm, FormErrors> {
        let due_text = self.due.value.trim();
        let due_date = if due_text.is_empty() { None } else { parse_due_input(due_text, today) };
        let form = TaskForm {
            title: self.title.value.clone(),
            description: self.description.value.clone(),
            project_id: self.selected_project().map(|(id, _)| *id),
            due_date,
            priority: self.selected_priority(),
        };
        if !due_text.is_empty() && due_date.is_none() {
            let mut errors = form.validate().err().unwrap_or_default();
            errors.insert("due", "Unrecognised due date");
            return Err(errors);
        }
        Ok(form)
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_FIELD;
        self.description.active = self.current_field == DESCRIPTION_FIELD;
        self.due.active = self.current_field == DUE_FIELD;
    }

    fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.active_input() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.active_input() {
            input.handle_delete();
        }
    }

    /// Move the cursor in text fields, or step through the selector options.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            PROJECT_FIELD if !self.projects.is_empty() => {
                let len = self.projects.len();
                self.project = Some(match (self.project, right) {
                    (None, true) => 0,
                    (None, false) => len - 1,
                    (Some(i), true) => (i + 1) % len,
                    (Some(i), false) => (i + len - 1) % len,
                });
            }
            PRIORITY_FIELD => {
                let len = PRIORITIES.len();
                self.priority = if right { (self.priority + 1) % len } else { (self.priority + len - 1) % len };
            }
            _ => {
                if let Some(input) = self.active_input() {
                    if right {
                        input.move_cursor_right();
                    } else {
                        input.move_cursor_left();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ProjectStatus;
    use crate::project::fixtures::project;
    use crate::view::fixtures::{date, task};

    fn projects() -> Vec<Project> {
        vec![project(1, "Website", ProjectStatus::Active), project(2, "Backend", ProjectStatus::Active)]
    }

    #[test]
    fn test_new_form_defaults() {
        let form = TaskFormState::new(&projects(), None);
        assert_eq!(form.selected_priority(), Priority::Medium);
        assert!(form.selected_project().is_none());
        let errors = form.to_form(date(2024, 1, 1)).unwrap().validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("project"), Some("Please select a project"));
    }

    #[test]
    fn test_preselect_and_cycle_project() {
        let mut form = TaskFormState::new(&projects(), Some(2));
        assert_eq!(form.selected_project().map(|p| p.0), Some(2));
        form.current_field = PROJECT_FIELD;
        form.handle_left_right(true);
        assert_eq!(form.selected_project().map(|p| p.0), Some(1));
        form.handle_left_right(false);
        assert_eq!(form.selected_project().map(|p| p.0), Some(2));
    }

    #[test]
    fn test_typing_goes_to_active_field() {
        let mut form = TaskFormState::new(&projects(), Some(1));
        for c in "Ship".chars() {
            form.handle_char(c);
        }
        form.next_field();
        form.handle_char('x');
        form.next_field();
        form.next_field();
        for c in "tomorrow".chars() {
            form.handle_char(c);
        }
        let values = form.to_form(date(2024, 1, 1)).unwrap();
        assert_eq!(values.title, "Ship");
        assert_eq!(values.description, "x");
        assert_eq!(values.due_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_bad_due_date_reported_with_other_errors() {
        let mut form = TaskFormState::new(&projects(), None);
        form.due = InputField::with_value("someday");
        let errors = form.to_form(date(2024, 1, 1)).unwrap_err();
        assert_eq!(errors.get("due"), Some("Unrecognised due date"));
        assert_eq!(errors.get("title"), Some("Title is required"));
    }

    #[test]
    fn test_from_task_prefills() {
        let mut t = task(7, "Existing");
        t.project_id = 2;
        t.priority = Some(Priority::High);
        t.due_date = Some(date(2024, 2, 3));
        let form = TaskFormState::from_task(&t, &projects());
        assert_eq!(form.editing, Some(7));
        assert_eq!(form.selected_priority(), Priority::High);
        assert_eq!(form.due.value, "2024-02-03");
        assert_eq!(form.selected_project().map(|p| p.0), Some(2));
    }
}
