use crate::config::load_config_with_fallback;
use crate::dashboard;
use crate::error::AppError;
use crate::model::{DEFAULT_CATEGORY, Priority, Todo, is_default_category, parse_due_date};
use crate::reminder::{ReminderCanceller, canceller_from_config};
use crate::storage::json_store::{self, TodoState};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Derived aggregate counts, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub priorities: PriorityCounts,
    pub categories: BTreeMap<String, usize>,
}

/// Counts over all todos, completed included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn add_todo(
    text: &str,
    priority: Priority,
    due_date: Option<&str>,
    category: &str,
) -> Result<Todo, AppError> {
    let path = json_store::store_path()?;
    add_todo_with_path(&path, text, priority, due_date, category)
}

pub fn list_todos(status: StatusFilter, category: Option<&str>) -> Result<Vec<Todo>, AppError> {
    let path = json_store::store_path()?;
    Ok(list_todos_with_path(&path, status, category))
}

pub fn find_todo(id: u64) -> Result<Option<Todo>, AppError> {
    let path = json_store::store_path()?;
    Ok(find_todo_with_path(&path, id))
}

pub fn mark_complete(id: u64) -> Result<Option<Todo>, AppError> {
    let path = json_store::store_path()?;
    let canceller = canceller_from_config(&load_config_with_fallback().config);
    mark_complete_with_path(&path, id, canceller.as_ref())
}

pub fn remove_todo(id: u64) -> Result<Option<Todo>, AppError> {
    let path = json_store::store_path()?;
    remove_todo_with_path(&path, id)
}

pub fn clear_completed() -> Result<usize, AppError> {
    let path = json_store::store_path()?;
    clear_completed_with_path(&path)
}

pub fn add_category(name: &str) -> Result<bool, AppError> {
    let path = json_store::store_path()?;
    add_category_with_path(&path, name)
}

pub fn remove_category(name: &str) -> Result<bool, AppError> {
    let path = json_store::store_path()?;
    remove_category_with_path(&path, name)
}

pub fn list_categories() -> Result<Vec<String>, AppError> {
    let path = json_store::store_path()?;
    Ok(list_categories_with_path(&path))
}

pub fn update_todo_category(id: u64, new_category: &str) -> Result<Option<Todo>, AppError> {
    let path = json_store::store_path()?;
    update_todo_category_with_path(&path, id, new_category)
}

pub fn get_stats() -> Result<Stats, AppError> {
    let path = json_store::store_path()?;
    Ok(get_stats_with_path(&path))
}

fn add_todo_with_path(
    path: &Path,
    text: &str,
    priority: Priority,
    due_date: Option<&str>,
    category: &str,
) -> Result<Todo, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("text is required"));
    }

    let due_date = match due_date {
        Some(raw) => Some(
            parse_due_date(raw)
                .ok_or_else(|| AppError::invalid_input("due date must be YYYY-MM-DD"))?,
        ),
        None => None,
    };

    let mut state = json_store::load_store(path);
    let category = resolve_category(&mut state, category)?;

    let todo = Todo {
        id: state.next_id(),
        text: trimmed.to_string(),
        completed: false,
        priority,
        due_date,
        category,
        created_at: now_rfc3339()?,
        completed_at: None,
    };

    state.todos.push(todo.clone());
    persist(path, &state)?;

    Ok(todo)
}

fn list_todos_with_path(path: &Path, status: StatusFilter, category: Option<&str>) -> Vec<Todo> {
    let state = json_store::load_store(path);
    filter_todos(&state.todos, status, category)
}

fn find_todo_with_path(path: &Path, id: u64) -> Option<Todo> {
    let state = json_store::load_store(path);
    state.todos.into_iter().find(|todo| todo.id == id)
}

fn mark_complete_with_path(
    path: &Path,
    id: u64,
    canceller: &dyn ReminderCanceller,
) -> Result<Option<Todo>, AppError> {
    let mut state = json_store::load_store(path);
    let mut updated = None;

    for todo in &mut state.todos {
        if todo.id == id {
            todo.completed = true;
            todo.completed_at = Some(now_rfc3339()?);
            updated = Some(todo.clone());
            break;
        }
    }

    let Some(updated) = updated else {
        return Ok(None);
    };
    persist(path, &state)?;

    // Best-effort: a scheduler hiccup never blocks the completion itself.
    if let Err(err) = canceller.cancel(id) {
        warn!("could not cancel reminder for todo {id}: {err}");
    }

    Ok(Some(updated))
}

fn remove_todo_with_path(path: &Path, id: u64) -> Result<Option<Todo>, AppError> {
    let mut state = json_store::load_store(path);
    let Some(index) = state.todos.iter().position(|todo| todo.id == id) else {
        return Ok(None);
    };

    let removed = state.todos.remove(index);
    persist(path, &state)?;

    Ok(Some(removed))
}

fn clear_completed_with_path(path: &Path) -> Result<usize, AppError> {
    let mut state = json_store::load_store(path);
    state.todos.retain(|todo| !todo.completed);
    persist(path, &state)?;

    Ok(state.todos.len())
}

fn add_category_with_path(path: &Path, name: &str) -> Result<bool, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("category name is required"));
    }

    let mut state = json_store::load_store(path);
    if state.find_category(trimmed).is_some() {
        return Ok(false);
    }

    state.categories.push(trimmed.to_string());
    persist(path, &state)?;

    Ok(true)
}

fn remove_category_with_path(path: &Path, name: &str) -> Result<bool, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("category name is required"));
    }
    if is_default_category(trimmed) {
        return Err(AppError::invalid_input(
            "the default category cannot be removed",
        ));
    }

    let mut state = json_store::load_store(path);
    let Some(index) = state
        .categories
        .iter()
        .position(|category| category.eq_ignore_ascii_case(trimmed))
    else {
        return Ok(false);
    };

    state.categories.remove(index);
    for todo in &mut state.todos {
        if todo.category.eq_ignore_ascii_case(trimmed) {
            todo.category = DEFAULT_CATEGORY.to_string();
        }
    }
    persist(path, &state)?;

    Ok(true)
}

fn list_categories_with_path(path: &Path) -> Vec<String> {
    json_store::load_store(path).categories
}

fn update_todo_category_with_path(
    path: &Path,
    id: u64,
    new_category: &str,
) -> Result<Option<Todo>, AppError> {
    let mut state = json_store::load_store(path);
    let category = resolve_category(&mut state, new_category)?;

    let mut updated = None;
    for todo in &mut state.todos {
        if todo.id == id {
            todo.category = category;
            updated = Some(todo.clone());
            break;
        }
    }

    let Some(updated) = updated else {
        return Ok(None);
    };
    persist(path, &state)?;

    Ok(Some(updated))
}

fn get_stats_with_path(path: &Path) -> Stats {
    let state = json_store::load_store(path);
    compute_stats(&state.todos, OffsetDateTime::now_utc())
}

fn compute_stats(todos: &[Todo], now: OffsetDateTime) -> Stats {
    let total = todos.len();
    let completed = todos.iter().filter(|todo| todo.completed).count();
    let overdue = todos
        .iter()
        .filter(|todo| !todo.completed)
        .filter(|todo| matches!(todo.due_instant(), Some(due) if due < now))
        .count();

    let mut priorities = PriorityCounts {
        high: 0,
        medium: 0,
        low: 0,
    };
    let mut categories = BTreeMap::new();
    for todo in todos {
        match todo.priority {
            Priority::High => priorities.high += 1,
            Priority::Medium => priorities.medium += 1,
            Priority::Low => priorities.low += 1,
        }
        *categories
            .entry(todo.category_label().to_string())
            .or_insert(0) += 1;
    }

    Stats {
        total,
        completed,
        pending: total - completed,
        overdue,
        priorities,
        categories,
    }
}

fn filter_todos(todos: &[Todo], status: StatusFilter, category: Option<&str>) -> Vec<Todo> {
    todos
        .iter()
        .filter(|todo| match status {
            StatusFilter::All => true,
            StatusFilter::Pending => !todo.completed,
            StatusFilter::Completed => todo.completed,
        })
        .filter(|todo| match category {
            Some(filter) => category_matches(todo, filter),
            None => true,
        })
        .cloned()
        .collect()
}

/// The default-category filter also matches todos whose stored category is
/// empty; everything else is a case-insensitive comparison.
fn category_matches(todo: &Todo, filter: &str) -> bool {
    let stored = todo.category.trim();
    if is_default_category(filter) {
        stored.is_empty() || stored.eq_ignore_ascii_case(DEFAULT_CATEGORY)
    } else {
        stored.eq_ignore_ascii_case(filter.trim())
    }
}

/// Add-on-write category policy: an unknown name is adopted into the set
/// (trimmed, original casing); a known one resolves to its stored casing.
fn resolve_category(state: &mut TodoState, name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("category name is required"));
    }

    if let Some(existing) = state.find_category(trimmed) {
        return Ok(existing.to_string());
    }

    state.categories.push(trimmed.to_string());
    Ok(trimmed.to_string())
}

/// Saves the document, then regenerates the dashboard projection. The
/// projection is derived data; a failed write is logged, not propagated.
fn persist(path: &Path, state: &TodoState) -> Result<(), AppError> {
    json_store::save_store(path, state)?;
    if let Err(err) = dashboard::refresh(path, state) {
        warn!("dashboard refresh failed: {err}");
    }
    Ok(())
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        StatusFilter, add_category_with_path, add_todo_with_path, clear_completed_with_path,
        compute_stats, filter_todos, find_todo_with_path, list_categories_with_path,
        list_todos_with_path, mark_complete_with_path, remove_category_with_path,
        remove_todo_with_path, update_todo_category_with_path,
    };
    use crate::dashboard::dashboard_path_for;
    use crate::error::AppError;
    use crate::model::{DEFAULT_CATEGORY, Priority, Todo};
    use crate::reminder::{NoopCanceller, ReminderCanceller};
    use crate::storage::json_store;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::datetime;

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todolist-{nanos}-{file_name}"))
    }

    fn cleanup(path: &PathBuf) {
        std::fs::remove_file(path).ok();
        std::fs::remove_file(dashboard_path_for(path)).ok();
    }

    fn seeded_todo(id: u64, text: &str, completed: bool, category: &str) -> Todo {
        Todo {
            id,
            text: text.to_string(),
            completed,
            priority: Priority::Medium,
            due_date: None,
            category: category.to_string(),
            created_at: "2025-06-01T00:00:00Z".to_string(),
            completed_at: completed.then(|| "2025-06-02T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn add_todo_rejects_blank_text() {
        let path = temp_path("blank-text.json");
        let err = add_todo_with_path(&path, "  ", Priority::Medium, None, DEFAULT_CATEGORY)
            .unwrap_err();
        cleanup(&path);

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn add_todo_applies_defaults() {
        let path = temp_path("add-defaults.json");
        let todo =
            add_todo_with_path(&path, "Buy milk", Priority::Medium, None, DEFAULT_CATEGORY)
                .unwrap();
        let listed = list_todos_with_path(&path, StatusFilter::All, None);
        cleanup(&path);

        assert!(!todo.completed);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, DEFAULT_CATEGORY);
        assert_eq!(todo.completed_at, None);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], todo);
    }

    #[test]
    fn add_todo_assigns_fresh_unique_ids() {
        let path = temp_path("unique-ids.json");
        let first =
            add_todo_with_path(&path, "first", Priority::Medium, None, DEFAULT_CATEGORY).unwrap();
        let second =
            add_todo_with_path(&path, "second", Priority::High, None, DEFAULT_CATEGORY).unwrap();
        let third =
            add_todo_with_path(&path, "third", Priority::Low, None, DEFAULT_CATEGORY).unwrap();
        cleanup(&path);

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn add_todo_registers_unknown_category() {
        let path = temp_path("register-category.json");
        let todo = add_todo_with_path(&path, "Ship it", Priority::High, None, " work ").unwrap();
        let categories = list_categories_with_path(&path);
        cleanup(&path);

        assert_eq!(todo.category, "work");
        assert!(categories.iter().any(|category| category == "work"));
    }

    #[test]
    fn add_todo_reuses_stored_category_casing() {
        let path = temp_path("category-casing.json");
        add_category_with_path(&path, "Work").unwrap();
        let todo = add_todo_with_path(&path, "Ship it", Priority::High, None, "WORK").unwrap();
        let categories = list_categories_with_path(&path);
        cleanup(&path);

        assert_eq!(todo.category, "Work");
        assert_eq!(
            categories
                .iter()
                .filter(|category| category.eq_ignore_ascii_case("work"))
                .count(),
            1
        );
    }

    #[test]
    fn add_todo_rejects_malformed_due_date() {
        let path = temp_path("bad-due.json");
        let err = add_todo_with_path(
            &path,
            "Ship it",
            Priority::Medium,
            Some("tomorrow"),
            DEFAULT_CATEGORY,
        )
        .unwrap_err();
        cleanup(&path);

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn add_todo_accepts_iso_due_date() {
        let path = temp_path("good-due.json");
        let todo = add_todo_with_path(
            &path,
            "Ship it",
            Priority::Medium,
            Some(" 2025-01-01 "),
            DEFAULT_CATEGORY,
        )
        .unwrap();
        cleanup(&path);

        assert_eq!(todo.due_date.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn add_todo_writes_dashboard_projection() {
        let path = temp_path("dashboard-side.json");
        add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let dashboard_path = dashboard_path_for(&path);
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dashboard_path).unwrap()).unwrap();
        cleanup(&path);

        assert_eq!(written["total"], 1);
        assert_eq!(written["priorities"]["high"], 1);
    }

    #[test]
    fn filter_todos_by_status() {
        let todos = vec![
            seeded_todo(1, "pending", false, DEFAULT_CATEGORY),
            seeded_todo(2, "done", true, DEFAULT_CATEGORY),
        ];

        let all = filter_todos(&todos, StatusFilter::All, None);
        let pending = filter_todos(&todos, StatusFilter::Pending, None);
        let completed = filter_todos(&todos, StatusFilter::Completed, None);

        assert_eq!(all.len(), 2);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 1);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, 2);
    }

    #[test]
    fn filter_todos_by_category_ignores_case() {
        let todos = vec![
            seeded_todo(1, "work item", false, "Work"),
            seeded_todo(2, "home item", false, "home"),
        ];

        let matched = filter_todos(&todos, StatusFilter::All, Some("work"));

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 1);
    }

    #[test]
    fn default_category_filter_matches_empty_category() {
        let todos = vec![
            seeded_todo(1, "blank", false, ""),
            seeded_todo(2, "default", false, DEFAULT_CATEGORY),
            seeded_todo(3, "work", false, "work"),
        ];

        let matched = filter_todos(&todos, StatusFilter::All, Some("no category"));

        assert_eq!(matched.len(), 2);
        assert!(matched.iter().any(|todo| todo.id == 1));
        assert!(matched.iter().any(|todo| todo.id == 2));
    }

    #[test]
    fn filter_todos_preserves_insertion_order() {
        let todos = vec![
            seeded_todo(5, "first", false, DEFAULT_CATEGORY),
            seeded_todo(2, "second", false, DEFAULT_CATEGORY),
            seeded_todo(9, "third", false, DEFAULT_CATEGORY),
        ];

        let all = filter_todos(&todos, StatusFilter::All, None);

        assert_eq!(
            all.iter().map(|todo| todo.id).collect::<Vec<_>>(),
            vec![5, 2, 9]
        );
    }

    #[derive(Default)]
    struct RecordingCanceller {
        cancelled: RefCell<Vec<u64>>,
    }

    impl ReminderCanceller for RecordingCanceller {
        fn cancel(&self, todo_id: u64) -> Result<(), AppError> {
            self.cancelled.borrow_mut().push(todo_id);
            Ok(())
        }
    }

    struct FailingCanceller;

    impl ReminderCanceller for FailingCanceller {
        fn cancel(&self, _todo_id: u64) -> Result<(), AppError> {
            Err(AppError::collaborator("scheduler unreachable"))
        }
    }

    #[test]
    fn mark_complete_sets_completed_at_and_persists() {
        let path = temp_path("complete.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let completed = mark_complete_with_path(&path, todo.id, &NoopCanceller)
            .unwrap()
            .expect("todo found");
        let pending = list_todos_with_path(&path, StatusFilter::Pending, None);
        let done = list_todos_with_path(&path, StatusFilter::Completed, None);
        cleanup(&path);

        assert!(completed.completed);
        assert!(completed.completed_at.is_some());
        assert!(pending.is_empty());
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, todo.id);
    }

    #[test]
    fn mark_complete_returns_none_for_unknown_id() {
        let path = temp_path("complete-missing.json");
        let result = mark_complete_with_path(&path, 404, &NoopCanceller).unwrap();
        cleanup(&path);

        assert!(result.is_none());
    }

    #[test]
    fn mark_complete_twice_keeps_todo_completed() {
        let path = temp_path("complete-twice.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        mark_complete_with_path(&path, todo.id, &NoopCanceller).unwrap();
        let second = mark_complete_with_path(&path, todo.id, &NoopCanceller)
            .unwrap()
            .expect("todo found");
        cleanup(&path);

        assert!(second.completed);
        assert!(second.completed_at.is_some());
    }

    #[test]
    fn mark_complete_asks_canceller_for_the_todo_id() {
        let path = temp_path("complete-cancels.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let canceller = RecordingCanceller::default();
        mark_complete_with_path(&path, todo.id, &canceller).unwrap();
        cleanup(&path);

        assert_eq!(canceller.cancelled.borrow().as_slice(), &[todo.id]);
    }

    #[test]
    fn mark_complete_survives_canceller_failure() {
        let path = temp_path("complete-cancel-fails.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let completed = mark_complete_with_path(&path, todo.id, &FailingCanceller)
            .unwrap()
            .expect("todo found");
        let done = list_todos_with_path(&path, StatusFilter::Completed, None);
        cleanup(&path);

        assert!(completed.completed);
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn remove_todo_removes_and_returns() {
        let path = temp_path("remove.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let removed = remove_todo_with_path(&path, todo.id)
            .unwrap()
            .expect("todo found");
        let remaining = list_todos_with_path(&path, StatusFilter::All, None);
        cleanup(&path);

        assert_eq!(removed.id, todo.id);
        assert!(remaining.is_empty());
    }

    #[test]
    fn remove_todo_returns_none_for_unknown_id() {
        let path = temp_path("remove-missing.json");
        let result = remove_todo_with_path(&path, 404).unwrap();
        cleanup(&path);

        assert!(result.is_none());
    }

    #[test]
    fn clear_completed_reports_remaining_count() {
        let path = temp_path("clear-completed.json");
        let keep =
            add_todo_with_path(&path, "keep", Priority::Medium, None, DEFAULT_CATEGORY).unwrap();
        let done =
            add_todo_with_path(&path, "done", Priority::Medium, None, DEFAULT_CATEGORY).unwrap();
        mark_complete_with_path(&path, done.id, &NoopCanceller).unwrap();

        let remaining = clear_completed_with_path(&path).unwrap();
        let listed = list_todos_with_path(&path, StatusFilter::All, None);
        cleanup(&path);

        assert_eq!(remaining, 1);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
    }

    #[test]
    fn add_category_rejects_blank_name() {
        let path = temp_path("category-blank.json");
        let err = add_category_with_path(&path, "   ").unwrap_err();
        cleanup(&path);

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn add_category_is_idempotent_under_case_and_whitespace() {
        let path = temp_path("category-idempotent.json");
        let first = add_category_with_path(&path, "Work").unwrap();
        let second = add_category_with_path(&path, "  work ").unwrap();
        let categories = list_categories_with_path(&path);
        cleanup(&path);

        assert!(first);
        assert!(!second);
        assert_eq!(
            categories
                .iter()
                .filter(|category| category.eq_ignore_ascii_case("work"))
                .count(),
            1
        );
    }

    #[test]
    fn remove_category_returns_false_for_unknown_name() {
        let path = temp_path("category-unknown.json");
        let removed = remove_category_with_path(&path, "nope").unwrap();
        cleanup(&path);

        assert!(!removed);
    }

    #[test]
    fn remove_category_reassigns_its_todos() {
        let path = temp_path("category-reassign.json");
        add_category_with_path(&path, "work").unwrap();
        let todo = add_todo_with_path(
            &path,
            "Ship feature",
            Priority::High,
            Some("2025-01-01"),
            "work",
        )
        .unwrap();

        let removed = remove_category_with_path(&path, "WORK").unwrap();
        let categories = list_categories_with_path(&path);
        let reloaded = find_todo_with_path(&path, todo.id).expect("todo found");
        cleanup(&path);

        assert!(removed);
        assert!(!categories.iter().any(|category| category == "work"));
        assert_eq!(reloaded.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn remove_category_refuses_the_default() {
        let path = temp_path("category-default.json");
        let err = remove_category_with_path(&path, "No Category").unwrap_err();
        cleanup(&path);

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn update_todo_category_rejects_blank_name() {
        let path = temp_path("set-category-blank.json");
        let err = update_todo_category_with_path(&path, 1, "  ").unwrap_err();
        cleanup(&path);

        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn update_todo_category_adopts_new_category() {
        let path = temp_path("set-category.json");
        let todo =
            add_todo_with_path(&path, "Ship it", Priority::High, None, DEFAULT_CATEGORY).unwrap();

        let updated = update_todo_category_with_path(&path, todo.id, "projects")
            .unwrap()
            .expect("todo found");
        let categories = list_categories_with_path(&path);
        cleanup(&path);

        assert_eq!(updated.category, "projects");
        assert!(categories.iter().any(|category| category == "projects"));
    }

    #[test]
    fn update_todo_category_returns_none_for_unknown_id() {
        let path = temp_path("set-category-missing.json");
        let result = update_todo_category_with_path(&path, 404, "projects").unwrap();
        cleanup(&path);

        assert!(result.is_none());
    }

    #[test]
    fn stats_pending_plus_completed_equals_total() {
        let todos = vec![
            seeded_todo(1, "a", false, DEFAULT_CATEGORY),
            seeded_todo(2, "b", true, "work"),
            seeded_todo(3, "c", true, "work"),
        ];

        let stats = compute_stats(&todos, datetime!(2025-06-10 12:00:00 UTC));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending + stats.completed, stats.total);
    }

    #[test]
    fn stats_count_overdue_strictly_before_now() {
        let mut past = seeded_todo(1, "past", false, DEFAULT_CATEGORY);
        past.due_date = Some("2025-06-09".to_string());
        let mut future = seeded_todo(2, "future", false, DEFAULT_CATEGORY);
        future.due_date = Some("2025-06-11".to_string());
        let mut completed_past = seeded_todo(3, "done", true, DEFAULT_CATEGORY);
        completed_past.due_date = Some("2025-06-01".to_string());

        let stats = compute_stats(
            &[past, future, completed_past],
            datetime!(2025-06-10 12:00:00 UTC),
        );

        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn stats_count_priorities_over_all_todos() {
        let mut high = seeded_todo(1, "high", true, DEFAULT_CATEGORY);
        high.priority = Priority::High;
        let mut low = seeded_todo(2, "low", false, DEFAULT_CATEGORY);
        low.priority = Priority::Low;
        let medium = seeded_todo(3, "medium", false, DEFAULT_CATEGORY);

        let stats = compute_stats(&[high, low, medium], datetime!(2025-06-10 12:00:00 UTC));

        assert_eq!(stats.priorities.high, 1);
        assert_eq!(stats.priorities.medium, 1);
        assert_eq!(stats.priorities.low, 1);
    }

    #[test]
    fn stats_fold_empty_category_into_default_label() {
        let blank = seeded_todo(1, "blank", false, "");
        let work = seeded_todo(2, "work", false, "work");

        let stats = compute_stats(&[blank, work], datetime!(2025-06-10 12:00:00 UTC));

        assert_eq!(stats.categories.get(DEFAULT_CATEGORY), Some(&1));
        assert_eq!(stats.categories.get("work"), Some(&1));
    }

    #[test]
    fn legacy_document_round_trips_through_a_mutation() {
        let path = temp_path("legacy-upgrade.json");
        std::fs::write(&path, r#"[{"id":1,"text":"Legacy","completed":false}]"#).unwrap();

        let added =
            add_todo_with_path(&path, "Fresh", Priority::Medium, None, DEFAULT_CATEGORY).unwrap();
        let state = json_store::load_store(&path);
        cleanup(&path);

        assert_eq!(added.id, 2);
        assert_eq!(state.todos.len(), 2);
        assert_eq!(state.categories, vec![DEFAULT_CATEGORY.to_string()]);
        assert_eq!(state.todos[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn status_filter_parses_known_names() {
        assert_eq!(StatusFilter::from_name("all"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::from_name("Pending"),
            Some(StatusFilter::Pending)
        );
        assert_eq!(
            StatusFilter::from_name(" COMPLETED "),
            Some(StatusFilter::Completed)
        );
        assert_eq!(StatusFilter::from_name("done"), None);
    }
}
