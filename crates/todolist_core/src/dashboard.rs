use crate::error::AppError;
use crate::model::{Priority, Todo};
use crate::storage::json_store::TodoState;
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const DASHBOARD_SUFFIX: &str = "dashboard.json";

/// Read-only summary document regenerated after every store mutation.
/// External display reads it; nothing feeds back into the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub priorities: PriorityBreakdown,
    pub categories: Vec<CategorySlice>,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub updated_at: String,
    pub todos: Vec<DashboardTodo>,
}

/// Pending todos per priority.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub id: u64,
    pub text: String,
    pub due_date: String,
    pub priority: Priority,
    pub days_until_due: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTodo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub category: String,
}

/// Sibling document derived from the store file name, e.g.
/// `todo-data.json` -> `todo-data.dashboard.json`.
pub fn dashboard_path_for(store_path: &Path) -> PathBuf {
    let stem = store_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("todo-data");
    store_path.with_file_name(format!("{stem}.{DASHBOARD_SUFFIX}"))
}

pub fn refresh(store_path: &Path, state: &TodoState) -> Result<(), AppError> {
    let data = project(state, OffsetDateTime::now_utc());
    let content = serde_json::to_string_pretty(&data)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(dashboard_path_for(store_path), content)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

pub fn project(state: &TodoState, now: OffsetDateTime) -> DashboardData {
    let total = state.todos.len();
    let completed = state.todos.iter().filter(|todo| todo.completed).count();
    let pending = total - completed;

    let mut priorities = PriorityBreakdown {
        high: 0,
        medium: 0,
        low: 0,
    };
    for todo in state.todos.iter().filter(|todo| !todo.completed) {
        match todo.priority {
            Priority::High => priorities.high += 1,
            Priority::Medium => priorities.medium += 1,
            Priority::Low => priorities.low += 1,
        }
    }

    let updated_at = now
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("unknown"));

    DashboardData {
        total,
        pending,
        completed,
        priorities,
        categories: category_breakdown(&state.todos),
        upcoming_deadlines: upcoming_deadlines(&state.todos, now),
        updated_at,
        todos: state
            .todos
            .iter()
            .map(|todo| DashboardTodo {
                id: todo.id,
                text: todo.text.clone(),
                completed: todo.completed,
                priority: todo.priority,
                due_date: todo.due_date.clone(),
                category: todo.category_label().to_string(),
            })
            .collect(),
    }
}

/// Count per category label over all todos, first-appearance order.
fn category_breakdown(todos: &[Todo]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    for todo in todos {
        let label = todo.category_label();
        match slices.iter_mut().find(|slice| slice.name == label) {
            Some(slice) => slice.value += 1,
            None => slices.push(CategorySlice {
                name: label.to_string(),
                value: 1,
            }),
        }
    }
    slices
}

/// Ten soonest due dates among incomplete todos, ascending by days until
/// due. Already-due entries keep their spot with non-positive day counts.
fn upcoming_deadlines(todos: &[Todo], now: OffsetDateTime) -> Vec<UpcomingDeadline> {
    let mut deadlines: Vec<UpcomingDeadline> = todos
        .iter()
        .filter(|todo| !todo.completed)
        .filter_map(|todo| {
            let due_date = todo.due_date.as_deref()?;
            let due = todo.due_instant()?;
            Some(UpcomingDeadline {
                id: todo.id,
                text: todo.text.clone(),
                due_date: due_date.to_string(),
                priority: todo.priority,
                days_until_due: days_between(now, due),
            })
        })
        .collect();

    deadlines.sort_by_key(|deadline| deadline.days_until_due);
    deadlines.truncate(10);
    deadlines
}

/// Whole days from `now` until `due`, rounded up.
fn days_between(now: OffsetDateTime, due: OffsetDateTime) -> i64 {
    let seconds = (due - now).whole_seconds();
    let mut days = seconds.div_euclid(86_400);
    if seconds.rem_euclid(86_400) > 0 {
        days += 1;
    }
    days
}
