use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new todo
    ///
    /// Example: todo add "Buy milk" --priority high --due 2025-01-01 --category work
    Add {
        text: Option<String>,
        #[arg(long, value_name = "LEVEL", default_value = "medium")]
        priority: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,
        #[arg(long, value_name = "NAME")]
        category: Option<String>,
    },
    /// List todos
    ///
    /// Example: todo list pending
    /// Example: todo list all --category work
    List {
        filter: Option<String>,
        #[arg(long, value_name = "NAME")]
        category: Option<String>,
    },
    /// Mark a todo as completed
    ///
    /// Example: todo complete 3
    #[command(alias = "done")]
    Complete {
        id: u64,
    },
    /// Remove a todo
    ///
    /// Example: todo remove 3
    #[command(alias = "delete")]
    Remove {
        id: u64,
    },
    /// Remove all completed todos
    ///
    /// Example: todo clear-completed
    ClearCompleted,
    /// Show statistics
    ///
    /// Example: todo stats
    Stats,
    /// List all categories
    ///
    /// Example: todo categories
    #[command(alias = "cats")]
    Categories,
    /// Add a new category
    ///
    /// Example: todo add-category "work"
    AddCategory {
        name: Option<String>,
    },
    /// Remove a category, moving its todos back to the default
    ///
    /// Example: todo remove-category "work"
    RemoveCategory {
        name: Option<String>,
    },
    /// Assign a todo to a category
    ///
    /// Example: todo set-category 3 "work"
    SetCategory {
        id: u64,
        name: String,
    },
    /// Print a reminder descriptor for the external scheduler
    ///
    /// Example: todo remind 3 30
    Remind {
        id: u64,
        minutes: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    ReminderTarget,
    ReminderChannel,
    SchedulerCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_key = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_key.as_str() {
        "target" | "reminder_target" => ConfigOverrideTarget::ReminderTarget,
        "channel" | "reminder_channel" => ConfigOverrideTarget::ReminderChannel,
        "scheduler" | "scheduler_command" => ConfigOverrideTarget::SchedulerCommand,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
