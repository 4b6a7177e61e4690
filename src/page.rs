//! Task page controller.
//!
//! `TaskPage` owns the cached tasks and projects, the filter and sort state,
//! the selection and the notice queue. Views are computed on demand from the
//! pure stages in `view`; every mutation goes through the service and then
//! patches or reloads the cache.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::bulk::{self, BulkAction};
use crate::config::ViewDefaults;
use crate::db::local_today;
use crate::error::{FormErrors, PageError, RecordFailure, ServiceError};
use crate::fields::{SortDirection, SortKey, StatusCategory};
use crate::notice::{Notice, Notices};
use crate::project::Project;
use crate::selection::Selection;
use crate::service::{Backend, BulkOutcome, TaskService};
use crate::task::{Task, TaskDraft, TaskForm, TaskPatch};
use crate::view::{filter_tasks, sort_tasks, TaskQuery};

/// Identifies one load request. Only the most recent ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A bulk action that passed local checks and is waiting on the service.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub ids: Vec<u64>,
}

/// What happened to a dispatched bulk action.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    pub action: BulkAction,
    pub succeeded: Vec<u64>,
    pub failed: Vec<RecordFailure>,
    /// True when at least one record succeeded and the cache was reloaded.
    pub reloaded: bool,
}

pub type LoadResult = Result<(Vec<Task>, Vec<Project>), ServiceError>;

pub struct TaskPage {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    query: TaskQuery,
    sort_key: SortKey,
    direction: SortDirection,
    selection: Selection,
    loading: bool,
    load_error: Option<String>,
    latest_load: u64,
    bulk_in_flight: bool,
    form_errors: FormErrors,
    notices: Notices,
    clock: fn() -> NaiveDate,
    today: NaiveDate,
}

impl TaskPage {
    pub fn new(defaults: &ViewDefaults) -> Self {
        Self::with_clock(defaults, local_today)
    }

    /// Build a page whose notion of "today" comes from `clock`.
    pub fn with_clock(defaults: &ViewDefaults, clock: fn() -> NaiveDate) -> Self {
        TaskPage {
            tasks: Vec::new(),
            projects: Vec::new(),
            query: TaskQuery { category: defaults.category, ..Default::default() },
            sort_key: defaults.sort,
            direction: defaults.direction,
            selection: Selection::new(),
            loading: false,
            load_error: None,
            latest_load: 0,
            bulk_in_flight: false,
            form_errors: FormErrors::default(),
            notices: Notices::default(),
            clock,
            today: clock(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn query(&self) -> &TaskQuery {
        &self.query
    }

    pub fn sort(&self) -> (SortKey, SortDirection) {
        (self.sort_key, self.direction)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn form_errors(&self) -> &FormErrors {
        &self.form_errors
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    #[cfg(test)]
    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.latest()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ----- loading -----

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        self.loading = true;
        LoadTicket(self.latest_load)
    }

    /// Apply a load result if `ticket` is still the latest. Returns whether it was applied.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: LoadResult) -> bool {
        if ticket.0 != self.latest_load {
            debug!(ticket = ticket.0, latest = self.latest_load, "discarding stale load");
            return false;
        }
        self.loading = false;
        self.today = (self.clock)();
        match result {
            Ok((tasks, projects)) => {
                debug!(tasks = tasks.len(), projects = projects.len(), "task page loaded");
                self.tasks = tasks;
                self.projects = projects;
                self.load_error = None;
                self.selection.clear();
            }
            Err(e) => {
                warn!(error = %e, "task page load failed");
                self.load_error = Some(format!("Failed to load tasks: {e}"));
                self.notices.error(format!("Failed to load tasks: {e}"));
            }
        }
        true
    }

    /// Fetch tasks and projects in one go.
    pub fn fetch<B: Backend + ?Sized>(backend: &B) -> LoadResult {
        Ok((backend.get_all(None)?, backend.get_all_projects()?))
    }

    pub fn reload<B: Backend + ?Sized>(&mut self, backend: &B) -> bool {
        let ticket = self.begin_load();
        let result = Self::fetch(backend);
        self.finish_load(ticket, result)
    }

    // ----- view -----

    /// Filtered and sorted tasks, as rendered.
    pub fn visible(&self) -> Vec<&Task> {
        let mut view = filter_tasks(&self.tasks, &self.query, self.today);
        sort_tasks(&mut view, self.sort_key, self.direction, &self.projects);
        view
    }

    pub fn visible_ids(&self) -> Vec<u64> {
        self.visible().iter().map(|t| t.id).collect()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.prune_selection();
    }

    pub fn set_project_filter(&mut self, project: Option<u64>) {
        self.query.project = project;
        self.prune_selection();
    }

    pub fn set_category(&mut self, category: StatusCategory) {
        self.query.category = category;
        self.prune_selection();
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.direction = direction;
    }

    /// Selections hidden by a filter change or by an edit are dropped, so bulk
    /// actions only ever touch tasks the user can see.
    fn prune_selection(&mut self) {
        let visible = self.visible_ids();
        let removed = self.selection.retain_visible(&visible);
        if removed > 0 {
            debug!(removed, "pruned hidden tasks from selection");
        }
    }

    // ----- selection -----

    pub fn toggle_selected(&mut self, id: u64) -> Result<bool, PageError> {
        if !self.visible_ids().contains(&id) {
            return Err(PageError::UnknownTask(id));
        }
        Ok(self.selection.toggle(id))
    }

    pub fn toggle_select_all(&mut self) {
        let visible = self.visible_ids();
        self.selection.toggle_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ----- single-task mutations -----

    fn report_service_error(&mut self, e: &ServiceError) {
        match e {
            ServiceError::Records(failures) => {
                for line in failures.iter().flat_map(RecordFailure::describe) {
                    self.notices.error(line);
                }
            }
            other => self.notices.error(other.to_string()),
        }
    }

    /// Validate locally; on failure the errors are kept for the form and no request is made.
    fn check_form(&mut self, form: &TaskForm) -> Result<TaskDraft, PageError> {
        match form.validate() {
            Ok(draft) => {
                self.form_errors = FormErrors::default();
                Ok(draft)
            }
            Err(errors) => {
                self.form_errors = errors.clone();
                Err(PageError::Validation(errors))
            }
        }
    }

    /// Validate and create a task; the new task is placed at the top of the cache.
    pub fn create_task<S: TaskService + ?Sized>(&mut self, service: &mut S, form: &TaskForm) -> Result<Task, PageError> {
        let draft = self.check_form(form)?;
        match service.create(draft) {
            Ok(task) => {
                self.tasks.insert(0, task.clone());
                self.notices.success("Task created successfully!");
                Ok(task)
            }
            Err(e) => {
                self.report_service_error(&e);
                Err(e.into())
            }
        }
    }

    pub fn update_task<S: TaskService + ?Sized>(
        &mut self,
        service: &mut S,
        id: u64,
        form: &TaskForm,
    ) -> Result<Task, PageError> {
        let draft = self.check_form(form)?;
        match service.update(id, TaskPatch::from(draft)) {
            Ok(task) => {
                self.replace_cached(task.clone());
                self.prune_selection();
                self.notices.success("Task updated successfully!");
                Ok(task)
            }
            Err(e) => {
                self.report_service_error(&e);
                Err(e.into())
            }
        }
    }

    pub fn toggle_complete<S: TaskService + ?Sized>(&mut self, service: &mut S, id: u64) -> Result<Task, PageError> {
        match service.toggle_complete(id) {
            Ok(task) => {
                let state = if task.completed { "completed" } else { "pending" };
                self.notices.success(format!("Task marked as {state}!"));
                self.replace_cached(task.clone());
                self.prune_selection();
                Ok(task)
            }
            Err(e) => {
                self.report_service_error(&e);
                Err(e.into())
            }
        }
    }

    /// Confirmation text for deleting a cached task.
    pub fn delete_prompt(&self, id: u64) -> Option<String> {
        self.task(id).map(|t| format!("Are you sure you want to delete \"{}\"?", t.title))
    }

    /// Delete one task after `confirm` accepts the prompt.
    pub fn delete_task<S, F>(&mut self, service: &mut S, id: u64, confirm: F) -> Result<(), PageError>
    where
        S: TaskService + ?Sized,
        F: FnOnce(&str) -> bool,
    {
        let prompt = self.delete_prompt(id).ok_or(PageError::UnknownTask(id))?;
        if !confirm(&prompt) {
            return Err(PageError::Cancelled);
        }
        match service.delete(id) {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                if self.selection.contains(id) {
                    self.selection.toggle(id);
                }
                self.notices.success("Task deleted successfully!");
                Ok(())
            }
            Err(e) => {
                self.report_service_error(&e);
                Err(e.into())
            }
        }
    }

    fn replace_cached(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.insert(0, task),
        }
    }

    // ----- bulk -----

    /// Local checks before a bulk request: not already running, something
    /// selected, and confirmation for destructive actions.
    pub fn begin_bulk<F>(&mut self, action: BulkAction, confirm: F) -> Result<BulkRequest, PageError>
    where
        F: FnOnce(&str) -> bool,
    {
        if self.bulk_in_flight {
            return Err(PageError::Busy);
        }
        let ids = self.selection.ids();
        if ids.is_empty() {
            return Err(PageError::NothingSelected);
        }
        if action.requires_confirmation() && !confirm(&action.confirmation_prompt(ids.len())) {
            return Err(PageError::Cancelled);
        }
        self.bulk_in_flight = true;
        Ok(BulkRequest { action, ids })
    }

    /// Apply the service's answer to a bulk request.
    pub fn finish_bulk<B: Backend + ?Sized>(
        &mut self,
        request: BulkRequest,
        result: Result<BulkOutcome, ServiceError>,
        backend: &B,
    ) -> Result<BulkReport, PageError> {
        self.bulk_in_flight = false;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_service_error(&e);
                return Err(e.into());
            }
        };
        for line in outcome.failed.iter().flat_map(RecordFailure::describe) {
            self.notices.error(line);
        }
        let reloaded = !outcome.is_total_failure();
        if reloaded {
            self.notices.success(request.action.success_message(outcome.success_count()));
            info!(action = ?request.action, succeeded = outcome.success_count(), failed = outcome.failed.len(), "bulk action applied");
            self.reload(backend);
            self.selection.clear();
        }
        Ok(BulkReport {
            action: request.action,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
            reloaded,
        })
    }

    /// Run a bulk action over the current selection end to end.
    pub fn run_bulk<B, F>(&mut self, backend: &mut B, action: BulkAction, confirm: F) -> Result<BulkReport, PageError>
    where
        B: Backend + ?Sized,
        F: FnOnce(&str) -> bool,
    {
        let request = self.begin_bulk(action, confirm)?;
        let result = bulk::dispatch(backend, &request.ids, action);
        self.finish_bulk(request, result, backend)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::db::fixtures::{add_task, seeded};
    use crate::db::Database;
    use crate::fields::Priority;
    use crate::notice::Level;
    use crate::project::{ProjectDraft, ProjectPatch};
    use crate::service::ProjectService;
    use crate::view::fixtures::date;

    fn fixed_today() -> NaiveDate {
        date(2024, 1, 1)
    }

    fn page() -> TaskPage {
        TaskPage::with_clock(&ViewDefaults::default(), fixed_today)
    }

    /// Store with tasks 1 and 2 in project 1, and a page loaded from it.
    fn loaded() -> (Database, TaskPage) {
        let mut db = seeded();
        add_task(&mut db, "Alpha", 1);
        add_task(&mut db, "Beta", 1);
        let mut page = page();
        assert!(page.reload(&db));
        (db, page)
    }

    /// Wraps the store, counting creates and optionally refusing bulk requests outright.
    struct ScriptedBackend {
        inner: Database,
        creates: Cell<usize>,
        reject_bulk: bool,
    }

    impl TaskService for ScriptedBackend {
        fn get_all(&self, project_filter: Option<u64>) -> Result<Vec<Task>, ServiceError> {
            self.inner.get_all(project_filter)
        }
        fn get_by_id(&self, id: u64) -> Result<Task, ServiceError> {
            self.inner.get_by_id(id)
        }
        fn create(&mut self, draft: TaskDraft) -> Result<Task, ServiceError> {
            self.creates.set(self.creates.get() + 1);
            self.inner.create(draft)
        }
        fn update(&mut self, id: u64, patch: TaskPatch) -> Result<Task, ServiceError> {
            self.inner.update(id, patch)
        }
        fn delete(&mut self, id: u64) -> Result<(), ServiceError> {
            self.inner.delete(id)
        }
        fn bulk_update(&mut self, ids: &[u64], patch: TaskPatch) -> Result<BulkOutcome, ServiceError> {
            if self.reject_bulk {
                return Err(ServiceError::Rejected("Service unavailable".into()));
            }
            self.inner.bulk_update(ids, patch)
        }
        fn bulk_delete(&mut self, ids: &[u64]) -> Result<BulkOutcome, ServiceError> {
            self.inner.bulk_delete(ids)
        }
    }

    impl ProjectService for ScriptedBackend {
        fn get_all_projects(&self) -> Result<Vec<Project>, ServiceError> {
            self.inner.get_all_projects()
        }
        fn get_project(&self, id: u64) -> Result<Project, ServiceError> {
            self.inner.get_project(id)
        }
        fn create_project(&mut self, draft: ProjectDraft) -> Result<Project, ServiceError> {
            self.inner.create_project(draft)
        }
        fn update_project(&mut self, id: u64, patch: ProjectPatch) -> Result<Project, ServiceError> {
            self.inner.update_project(id, patch)
        }
        fn delete_project(&mut self, id: u64) -> Result<(), ServiceError> {
            self.inner.delete_project(id)
        }
    }

    fn scripted(reject_bulk: bool) -> (ScriptedBackend, TaskPage) {
        let (inner, page) = loaded();
        (ScriptedBackend { inner, creates: Cell::new(0), reject_bulk }, page)
    }

    #[test]
    fn test_empty_title_never_reaches_service() {
        let (mut backend, mut page) = scripted(false);
        let form = TaskForm { title: "".into(), project_id: Some(1), ..Default::default() };
        match page.create_task(&mut backend, &form) {
            Err(PageError::Validation(errors)) => assert_eq!(errors.get("title"), Some("Title is required")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(backend.creates.get(), 0);
        assert_eq!(page.form_errors().get("title"), Some("Title is required"));
    }

    #[test]
    fn test_create_splices_new_task_at_top() {
        let (mut db, mut page) = loaded();
        let form = TaskForm { title: "Gamma".into(), project_id: Some(2), priority: Priority::High, ..Default::default() };
        let task = page.create_task(&mut db, &form).unwrap();
        assert_eq!(page.tasks()[0].id, task.id);
        assert_eq!(page.tasks().len(), 3);
        assert_eq!(page.latest_notice().unwrap().message, "Task created successfully!");
        assert!(page.form_errors().is_empty());
    }

    #[test]
    fn test_bulk_complete_with_partial_failure_reloads_and_clears() {
        let (mut db, mut page) = loaded();
        page.toggle_select_all();
        assert_eq!(page.selection().ids(), vec![1, 2]);

        // Task 2 disappears server-side before the bulk request lands.
        db.delete(2).unwrap();

        let report = page.run_bulk(&mut db, BulkAction::MarkComplete, |_| true).unwrap();
        assert_eq!(report.succeeded, vec![1]);
        assert_eq!(report.failed[0].id, Some(2));
        assert!(report.reloaded);
        assert!(page.selection().is_empty());
        assert!(page.task(1).unwrap().completed);
        assert!(page.task(2).is_none());

        let notices = page.drain_notices();
        assert!(notices.iter().any(|n| n.level == Level::Error && n.message.contains("Task 2")));
        assert!(notices.iter().any(|n| n.message == "1 task marked as complete!"));
    }

    #[test]
    fn test_bulk_total_failure_leaves_state_unchanged() {
        let (mut db, mut page) = loaded();
        page.toggle_select_all();
        let report = page.run_bulk(&mut db, BulkAction::MoveToProject(99), |_| true).unwrap();
        assert!(!report.reloaded);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(page.selection().len(), 2);
        assert!(page.tasks().iter().all(|t| t.project_id == 1));
        assert!(page.drain_notices().iter().all(|n| n.level == Level::Error));
    }

    #[test]
    fn test_bulk_rejected_request_surfaces_error() {
        let (mut backend, mut page) = scripted(true);
        page.toggle_select_all();
        let err = page.run_bulk(&mut backend, BulkAction::MarkComplete, |_| true).unwrap_err();
        assert!(matches!(err, PageError::Service(ServiceError::Rejected(_))));
        assert_eq!(page.selection().len(), 2);
        assert_eq!(page.latest_notice().unwrap().message, "Service unavailable");
        // The in-flight flag is released so the user can retry.
        assert!(page.begin_bulk(BulkAction::MarkComplete, |_| true).is_ok());
    }

    #[test]
    fn test_bulk_delete_requires_confirmation() {
        let (mut db, mut page) = loaded();
        page.toggle_select_all();
        let mut prompt = String::new();
        let err = page
            .run_bulk(&mut db, BulkAction::Delete, |p| {
                prompt = p.to_string();
                false
            })
            .unwrap_err();
        assert!(matches!(err, PageError::Cancelled));
        assert_eq!(prompt, "Are you sure you want to delete 2 tasks?");
        assert_eq!(db.get_all(None).unwrap().len(), 2);

        let report = page.run_bulk(&mut db, BulkAction::Delete, |_| true).unwrap();
        assert_eq!(report.succeeded.len(), 2);
        assert!(page.tasks().is_empty());
    }

    #[test]
    fn test_bulk_needs_selection_and_refuses_overlap() {
        let (_db, mut page) = loaded();
        assert!(matches!(page.begin_bulk(BulkAction::MarkComplete, |_| true), Err(PageError::NothingSelected)));
        page.toggle_selected(1).unwrap();
        let _pending = page.begin_bulk(BulkAction::MarkComplete, |_| true).unwrap();
        assert!(matches!(page.begin_bulk(BulkAction::MarkIncomplete, |_| true), Err(PageError::Busy)));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let (db, mut page) = loaded();
        let first = page.begin_load();
        let second = page.begin_load();
        assert!(page.finish_load(second, Ok((Vec::new(), Vec::new()))));
        assert!(page.tasks().is_empty());
        assert!(!page.finish_load(first, TaskPage::fetch(&db)));
        assert!(page.tasks().is_empty());
        assert!(!page.is_loading());
    }

    #[test]
    fn test_failed_load_sets_error_and_keeps_cache() {
        let (_db, mut page) = loaded();
        let ticket = page.begin_load();
        page.finish_load(ticket, Err(ServiceError::Rejected("offline".into())));
        assert_eq!(page.load_error(), Some("Failed to load tasks: offline"));
        assert_eq!(page.tasks().len(), 2);
    }

    #[test]
    fn test_filter_change_prunes_hidden_selection() {
        let (_db, mut page) = loaded();
        page.toggle_select_all();
        page.set_search("alp");
        assert_eq!(page.selection().ids(), vec![1]);
        page.set_search("");
        assert_eq!(page.selection().ids(), vec![1]);
        page.set_sort(SortKey::Priority, SortDirection::Asc);
        assert_eq!(page.selection().ids(), vec![1]);
    }

    #[test]
    fn test_toggle_hidden_task_is_refused() {
        let (_db, mut page) = loaded();
        page.set_category(StatusCategory::Completed);
        assert!(matches!(page.toggle_selected(1), Err(PageError::UnknownTask(1))));
        page.set_category(StatusCategory::All);
        assert!(page.toggle_selected(1).unwrap());
        assert!(!page.toggle_selected(1).unwrap());
    }

    #[test]
    fn test_toggle_complete_and_delete_patch_cache() {
        let (mut db, mut page) = loaded();
        page.toggle_complete(&mut db, 1).unwrap();
        assert!(page.task(1).unwrap().completed);
        assert_eq!(page.latest_notice().unwrap().message, "Task marked as completed!");

        assert!(matches!(page.delete_task(&mut db, 2, |_| false), Err(PageError::Cancelled)));
        assert!(page.task(2).is_some());
        page.delete_task(&mut db, 2, |p| p.contains("Beta")).unwrap();
        assert!(page.task(2).is_none());
        assert!(db.get_by_id(2).is_err());
    }

    #[test]
    fn test_update_task_replaces_in_place() {
        let (mut db, mut page) = loaded();
        let mut form = TaskForm::from_task(page.task(2).unwrap());
        form.title = "Beta v2".into();
        form.due_date = Some(date(2024, 1, 1));
        page.update_task(&mut db, 2, &form).unwrap();
        assert_eq!(page.task(2).unwrap().title, "Beta v2");
        page.set_category(StatusCategory::DueToday);
        assert_eq!(page.visible_ids(), vec![2]);
    }

    #[test]
    fn test_edit_that_hides_selected_task_drops_it() {
        let (mut db, mut page) = loaded();
        page.set_category(StatusCategory::Active);
        page.toggle_select_all();
        page.toggle_complete(&mut db, 1).unwrap();
        assert_eq!(page.visible_ids(), vec![2]);
        assert_eq!(page.selection().ids(), vec![2]);

        let report = page.run_bulk(&mut db, BulkAction::SetPriority(Priority::High), |_| true).unwrap();
        assert_eq!(report.succeeded, vec![2]);
        assert_eq!(db.get_by_id(1).unwrap().priority, Some(Priority::Medium));
    }

    #[test]
    fn test_moving_selected_task_out_of_project_filter_drops_it() {
        let (mut db, mut page) = loaded();
        page.set_project_filter(Some(1));
        page.toggle_select_all();
        let mut form = TaskForm::from_task(page.task(2).unwrap());
        form.project_id = Some(2);
        page.update_task(&mut db, 2, &form).unwrap();
        assert_eq!(page.selection().ids(), vec![1]);
    }
}
