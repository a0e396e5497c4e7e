use crate::config::Config;
use crate::error::AppError;
use crate::model::Todo;
use serde::Serialize;
use time::{Duration, OffsetDateTime, UtcOffset};

const REMINDER_NAME_PREFIX: &str = "todo-reminder-";

/// A formatted scheduling request for the external scheduler. Nothing here
/// schedules or delivers anything; the orchestrator consumes the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDescriptor {
    pub name: String,
    pub schedule: String,
    pub message: String,
    pub channel: Option<String>,
    pub target: Option<String>,
    pub delete_after_run: bool,
}

/// Job name tying a scheduled reminder to a todo id; cancellation finds
/// jobs by this convention.
pub fn reminder_name(todo_id: u64) -> String {
    format!("{REMINDER_NAME_PREFIX}{todo_id}")
}

pub fn build_reminder(
    todo: &Todo,
    delay_minutes: u32,
    config: &Config,
) -> Result<ReminderDescriptor, AppError> {
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let now_local = OffsetDateTime::now_utc().to_offset(local_offset);
    build_reminder_at(todo, delay_minutes, config, now_local)
}

fn build_reminder_at(
    todo: &Todo,
    delay_minutes: u32,
    config: &Config,
    now: OffsetDateTime,
) -> Result<ReminderDescriptor, AppError> {
    if delay_minutes == 0 {
        return Err(AppError::invalid_input("delay must be at least one minute"));
    }

    let fire_at = now + Duration::minutes(i64::from(delay_minutes));
    let schedule = format!(
        "{} {} {} {} *",
        fire_at.minute(),
        fire_at.hour(),
        fire_at.day(),
        u8::from(fire_at.month()),
    );

    Ok(ReminderDescriptor {
        name: reminder_name(todo.id),
        schedule,
        message: format!("Reminder: Please complete your task - {}", todo.text),
        channel: config.reminder_channel.clone(),
        target: config.reminder_target.clone(),
        delete_after_run: true,
    })
}

/// Port for dropping a previously scheduled reminder. `mark_complete` calls
/// this best-effort; failures must never block the completion itself.
pub trait ReminderCanceller {
    fn cancel(&self, todo_id: u64) -> Result<(), AppError>;
}

pub struct NoopCanceller;

impl ReminderCanceller for NoopCanceller {
    fn cancel(&self, _todo_id: u64) -> Result<(), AppError> {
        Ok(())
    }
}

/// Cancels reminders by driving the configured scheduler binary: lists jobs
/// as JSON, removes the ones named after the todo.
pub struct ProcessCanceller {
    command: String,
}

impl ProcessCanceller {
    pub fn new<C: Into<String>>(command: C) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ReminderCanceller for ProcessCanceller {
    fn cancel(&self, todo_id: u64) -> Result<(), AppError> {
        let output = std::process::Command::new(&self.command)
            .args(["cron", "list", "--json"])
            .output()
            .map_err(|err| AppError::collaborator(err.to_string()))?;

        if !output.status.success() {
            return Err(AppError::collaborator(format!(
                "{} cron list exited with {}",
                self.command, output.status
            )));
        }

        let listing: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|err| AppError::collaborator(err.to_string()))?;

        let name = reminder_name(todo_id);
        let Some(jobs) = listing.get("jobs").and_then(serde_json::Value::as_array) else {
            return Ok(());
        };

        for job in jobs {
            if job.get("name").and_then(serde_json::Value::as_str) != Some(name.as_str()) {
                continue;
            }
            let job_id = match job.get("id") {
                Some(serde_json::Value::String(id)) => id.clone(),
                Some(serde_json::Value::Number(id)) => id.to_string(),
                _ => continue,
            };

            let status = std::process::Command::new(&self.command)
                .args(["cron", "rm", &job_id])
                .status()
                .map_err(|err| AppError::collaborator(err.to_string()))?;
            if !status.success() {
                return Err(AppError::collaborator(format!(
                    "{} cron rm {job_id} exited with {status}",
                    self.command
                )));
            }
        }

        Ok(())
    }
}

pub fn canceller_from_config(config: &Config) -> Box<dyn ReminderCanceller> {
    match config.effective_scheduler_command() {
        Some(command) => Box::new(ProcessCanceller::new(command)),
        None => Box::new(NoopCanceller),
    }
}
