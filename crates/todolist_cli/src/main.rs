use clap::Parser;
use log::warn;
use tabled::{Table, Tabled};
use todolist_cli::cli::{Cli, Command, ConfigOverrideTarget, parse_config_override};
use todolist_core::config::{self, Config, ConfigOverrides};
use todolist_core::error::AppError;
use todolist_core::model::{DEFAULT_CATEGORY, Priority, Todo};
use todolist_core::reminder;
use todolist_core::todo_api::{self, StatusFilter};

#[derive(Tabled)]
struct TodoRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Due")]
    due: String,
}

impl TodoRow {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            status: if todo.completed {
                "completed"
            } else {
                "pending"
            },
            priority: todo.priority.label(),
            category: todo.category_label().to_string(),
            text: todo.text.clone(),
            due: todo.due_date.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn print_todos_plain(todos: &[Todo], filter: StatusFilter, category: Option<&str>) {
    if todos.is_empty() {
        let what = match filter {
            StatusFilter::All => "todos",
            StatusFilter::Pending => "pending todos",
            StatusFilter::Completed => "completed todos",
        };
        match category {
            Some(name) => println!("No {what} found in category '{name}'."),
            None => println!("No {what} found."),
        }
        return;
    }

    let rows: Vec<TodoRow> = todos.iter().map(TodoRow::from_todo).collect();
    println!("{}", Table::new(rows));
}

fn to_json_line<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn overrides_from_args(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::ReminderTarget => {
                overrides.reminder_target = Some(parsed.value);
            }
            ConfigOverrideTarget::ReminderChannel => {
                overrides.reminder_channel = Some(parsed.value);
            }
            ConfigOverrideTarget::SchedulerCommand => {
                overrides.scheduler_command = Some(parsed.value);
            }
        }
    }
    Ok(overrides)
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    match cli.command {
        Command::Add {
            text,
            priority,
            due,
            category,
        } => {
            let text = match text {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("text is required")),
            };
            let priority = Priority::from_name(&priority)
                .ok_or_else(|| AppError::invalid_input("priority must be low, medium, or high"))?;
            let category = category.as_deref().unwrap_or(DEFAULT_CATEGORY);

            let todo = todo_api::add_todo(&text, priority, due.as_deref(), category)?;
            if cli.json {
                println!("{}", to_json_line(&todo)?);
            } else {
                let due_info = todo
                    .due_date
                    .as_deref()
                    .map(|due| format!(", Due: {due}"))
                    .unwrap_or_default();
                println!(
                    "Added: {} (ID: {}, Category: {}{})",
                    todo.text, todo.id, todo.category, due_info
                );
            }
        }
        Command::List { filter, category } => {
            let status = match filter.as_deref() {
                Some(name) => StatusFilter::from_name(name).ok_or_else(|| {
                    AppError::invalid_input("filter must be all, pending, or completed")
                })?,
                None => StatusFilter::All,
            };

            let todos = todo_api::list_todos(status, category.as_deref())?;
            if cli.json {
                println!("{}", to_json_line(&todos)?);
            } else {
                print_todos_plain(&todos, status, category.as_deref());
            }
        }
        Command::Complete { id } => {
            let Some(todo) = todo_api::mark_complete(id)? else {
                println!("Todo with ID {id} not found.");
                std::process::exit(1);
            };
            if cli.json {
                println!("{}", to_json_line(&todo)?);
            } else {
                println!("Completed: {}", todo.text);
            }
        }
        Command::Remove { id } => {
            let Some(todo) = todo_api::remove_todo(id)? else {
                println!("Todo with ID {id} not found.");
                std::process::exit(1);
            };
            if cli.json {
                println!("{}", to_json_line(&todo)?);
            } else {
                println!("Removed: {}", todo.text);
            }
        }
        Command::ClearCompleted => {
            let remaining = todo_api::clear_completed()?;
            if cli.json {
                println!(
                    "{}",
                    to_json_line(&serde_json::json!({ "remaining": remaining }))?
                );
            } else {
                println!("Cleared all completed todos. {remaining} todos remain.");
            }
        }
        Command::Stats => {
            let stats = todo_api::get_stats()?;
            if cli.json {
                println!("{}", to_json_line(&stats)?);
            } else {
                println!("Todo statistics:");
                println!("  Total: {}", stats.total);
                println!("  Pending: {}", stats.pending);
                println!("  Completed: {}", stats.completed);
                println!("  Overdue: {}", stats.overdue);
                println!(
                    "  By priority: high={} medium={} low={}",
                    stats.priorities.high, stats.priorities.medium, stats.priorities.low
                );
                println!("  By category:");
                for (name, count) in &stats.categories {
                    println!("    {name}: {count}");
                }
            }
        }
        Command::Categories => {
            let categories = todo_api::list_categories()?;
            if cli.json {
                println!("{}", to_json_line(&categories)?);
            } else {
                println!("Categories:");
                for (index, name) in categories.iter().enumerate() {
                    println!("{}. {}", index + 1, name);
                }
            }
        }
        Command::AddCategory { name } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("category name is required")),
            };

            let added = todo_api::add_category(&name)?;
            if cli.json {
                println!(
                    "{}",
                    to_json_line(&serde_json::json!({ "name": name.trim(), "added": added }))?
                );
            } else if added {
                println!("Added category: {}", name.trim());
            } else {
                println!("Category '{}' already exists.", name.trim());
            }
        }
        Command::RemoveCategory { name } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("category name is required")),
            };

            let removed = todo_api::remove_category(&name)?;
            if cli.json {
                println!(
                    "{}",
                    to_json_line(&serde_json::json!({ "name": name.trim(), "removed": removed }))?
                );
            } else if removed {
                println!("Removed category: {}", name.trim());
            } else {
                println!("Category '{}' not found.", name.trim());
                std::process::exit(1);
            }
        }
        Command::SetCategory { id, name } => {
            let Some(todo) = todo_api::update_todo_category(id, &name)? else {
                println!("Todo with ID {id} not found.");
                std::process::exit(1);
            };
            if cli.json {
                println!("{}", to_json_line(&todo)?);
            } else {
                println!("Updated category for todo {} to: {}", todo.id, todo.category);
            }
        }
        Command::Remind { id, minutes } => {
            let Some(todo) = todo_api::find_todo(id)? else {
                println!("Todo with ID {id} not found.");
                std::process::exit(1);
            };

            let descriptor = reminder::build_reminder(&todo, minutes, config)?;
            if cli.json {
                println!("{}", to_json_line(&descriptor)?);
            } else {
                println!(
                    "Reminder for todo {} ({}) in {} minute(s):",
                    todo.id, todo.text, minutes
                );
                println!("  name: {}", descriptor.name);
                println!("  schedule: {}", descriptor.schedule);
                println!("  message: {}", descriptor.message);
                println!(
                    "  channel: {}",
                    descriptor.channel.as_deref().unwrap_or("-")
                );
                println!("  target: {}", descriptor.target.as_deref().unwrap_or("-"));
                println!("  delete after run: {}", descriptor.delete_after_run);
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let overrides = match overrides_from_args(&cli.config_override) {
        Ok(overrides) => overrides,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let load = config::load_config_with_fallback();
    if let Some(err) = load.error {
        warn!("config load failed: {err}; using defaults");
    }
    let config = config::merge_overrides(&load.config, &overrides);

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
