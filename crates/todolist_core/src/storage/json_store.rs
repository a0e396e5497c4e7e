use crate::error::AppError;
use crate::model::{DEFAULT_CATEGORY, Todo};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "todo-data.json";

#[derive(Debug, Serialize)]
struct StoredTodos<'a> {
    todos: &'a [Todo],
    categories: &'a [String],
}

/// Both historical document shapes: the current `{todos, categories}`
/// object and the legacy bare array, which implies the default category set.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Current {
        #[serde(default)]
        todos: Vec<Todo>,
        #[serde(default)]
        categories: Vec<String>,
    },
    Legacy(Vec<Todo>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub categories: Vec<String>,
}

impl TodoState {
    pub fn empty() -> Self {
        Self {
            todos: Vec::new(),
            categories: vec![DEFAULT_CATEGORY.to_string()],
        }
    }

    /// Fresh ids are strictly greater than every id ever handed out within
    /// this document.
    pub fn next_id(&self) -> u64 {
        self.todos.iter().map(|todo| todo.id).max().unwrap_or(0) + 1
    }

    /// Case-insensitive category lookup returning the stored casing.
    pub fn find_category(&self, name: &str) -> Option<&str> {
        let trimmed = name.trim();
        self.categories
            .iter()
            .find(|category| category.eq_ignore_ascii_case(trimmed))
            .map(String::as_str)
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("TODOLIST_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todolist")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todolist")
            .join(STORE_FILE_NAME))
    }
}

/// Loads the backing document. A missing, unreadable, or malformed document
/// degrades to an empty state instead of failing the caller; the orchestrator
/// keeps working against a fresh list.
pub fn load_store(path: &Path) -> TodoState {
    if !path.exists() {
        return TodoState::empty();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("failed to read {}: {err}; starting empty", path.display());
            return TodoState::empty();
        }
    };

    let document: StoredDocument = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(err) => {
            warn!("invalid JSON in {}: {err}; starting empty", path.display());
            return TodoState::empty();
        }
    };

    let state = match document {
        StoredDocument::Current { todos, categories } => TodoState { todos, categories },
        StoredDocument::Legacy(todos) => TodoState {
            todos,
            categories: Vec::new(),
        },
    };

    normalize(state)
}

/// Restores the category invariants after a load: the default category is
/// always present, empty todo categories read back as the default, and
/// category names the document forgot to register are adopted.
fn normalize(mut state: TodoState) -> TodoState {
    if !state
        .categories
        .iter()
        .any(|category| category.eq_ignore_ascii_case(DEFAULT_CATEGORY))
    {
        state.categories.insert(0, DEFAULT_CATEGORY.to_string());
    }

    for todo in &mut state.todos {
        if todo.category.trim().is_empty() {
            todo.category = DEFAULT_CATEGORY.to_string();
        }
    }

    let mut adopted = Vec::new();
    for todo in &state.todos {
        let known = state
            .categories
            .iter()
            .chain(adopted.iter())
            .any(|category: &String| category.eq_ignore_ascii_case(&todo.category));
        if !known {
            adopted.push(todo.category.clone());
        }
    }
    state.categories.extend(adopted);

    state
}

pub fn save_store(path: &Path, state: &TodoState) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredTodos {
        todos: &state.todos,
        categories: &state.categories,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
