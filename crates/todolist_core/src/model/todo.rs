use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Permanent default category; every store contains it and it cannot be
/// removed.
pub const DEFAULT_CATEGORY: &str = "no category";

const DUE_DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One task. Field names serialize in camelCase to stay compatible with
/// documents written by earlier versions of the skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Todo {
    /// Stored category label, folding the empty string left behind by old
    /// documents into the default category.
    pub fn category_label(&self) -> &str {
        if self.category.trim().is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }

    /// Due date as an instant (midnight UTC of the stored day); `None` when
    /// unset or unparseable.
    pub fn due_instant(&self) -> Option<OffsetDateTime> {
        let due = self.due_date.as_deref()?;
        let date = Date::parse(due.trim(), DUE_DATE_FORMAT).ok()?;
        Some(date.midnight().assume_utc())
    }
}

/// Validates a `YYYY-MM-DD` due date, returning the trimmed value.
pub fn parse_due_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    Date::parse(trimmed, DUE_DATE_FORMAT).ok()?;
    Some(trimmed.to_string())
}

pub fn is_default_category(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(DEFAULT_CATEGORY)
}
