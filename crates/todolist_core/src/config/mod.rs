use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TODOLIST_CONFIG_PATH";
const SCHEDULER_ENV_VAR: &str = "TODOLIST_SCHEDULER_CMD";

/// Delivery settings for reminder descriptors plus the external scheduler
/// command used to cancel them. Everything is optional; the skill works
/// without a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder_target: Option<String>,
    #[serde(default)]
    pub reminder_channel: Option<String>,
    #[serde(default)]
    pub scheduler_command: Option<String>,
}

impl Config {
    /// Scheduler command with the environment override applied.
    pub fn effective_scheduler_command(&self) -> Option<String> {
        if let Ok(command) = std::env::var(SCHEDULER_ENV_VAR)
            && !command.trim().is_empty()
        {
            return Some(command);
        }
        self.scheduler_command.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub reminder_target: Option<String>,
    pub reminder_channel: Option<String>,
    pub scheduler_command: Option<String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todolist")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todolist")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_channel(config))
}

fn normalize_config_channel(mut config: Config) -> Config {
    config.reminder_channel = config
        .reminder_channel
        .and_then(|name| canonical_channel_name(&name));
    config
}

/// Canonicalizes a delivery channel name: lowercased, punctuation collapsed
/// to underscores, common shorthands mapped to their full names. Returns
/// `None` when nothing usable remains.
pub fn canonical_channel_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
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
        return None;
    }

    match trimmed {
        "wa" | "whats_app" => Some("whatsapp".to_string()),
        "tg" => Some("telegram".to_string()),
        other => Some(other.to_string()),
    }
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(target) = overrides.reminder_target.as_ref() {
        merged.reminder_target = Some(target.clone());
    }
    if let Some(channel) = overrides.reminder_channel.as_ref()
        && let Some(normalized) = canonical_channel_name(channel)
    {
        merged.reminder_channel = Some(normalized);
    }
    if let Some(command) = overrides.scheduler_command.as_ref() {
        merged.scheduler_command = Some(command.clone());
    }

    merged
}
