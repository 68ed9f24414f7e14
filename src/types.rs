//! Core types for the QuickTask API.
//!
//! The task entity, its status/priority enums, and the request/response
//! shapes with their field-level validation rules. Validation always runs
//! before any storage access.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, SecondsFormat, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// Maximum title length in characters, after trimming.
pub const TITLE_MAX_CHARS: usize = 255;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// A persisted task row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Due date in literal `YYYY-MM-DD` form; no calendar validity implied.
    pub due_date: Option<String>,
    pub is_deleted: bool,
    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed on every successful mutation.
    pub updated_at: i64,
}

impl Task {
    /// Convert into the outbound response shape.
    pub fn into_view(self) -> TaskView {
        TaskView {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            is_deleted: self.is_deleted,
            created_at: format_timestamp(self.created_at),
            updated_at: format_timestamp(self.updated_at),
        }
    }
}

/// Outbound representation of a task, with RFC 3339 timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Render an epoch-millis timestamp as an RFC 3339 string.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Request body for POST /tasks.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

/// Validated create request, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
}

impl CreateTask {
    /// Check all field constraints and produce the typed insert shape.
    /// Priority defaults to medium when omitted.
    pub fn validate(self) -> ApiResult<NewTask> {
        validate_title(&self.title)?;
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        let priority = match self.priority.as_deref() {
            Some(raw) => parse_priority(raw)?,
            None => TaskPriority::default(),
        };
        if let Some(ref due_date) = self.due_date {
            validate_due_date(due_date)?;
        }
        Ok(NewTask {
            title: self.title,
            description: self.description,
            priority,
            due_date: self.due_date,
        })
    }
}

/// Request body for PUT/PATCH /tasks/{id}.
///
/// Every field is optional. A field absent from the payload leaves the
/// stored value untouched; an explicit JSON null is refused at
/// deserialization time, so null never aliases "unset".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "present_non_null")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_non_null")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present_non_null")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present_non_null")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "present_non_null")]
    pub due_date: Option<String>,
}

/// Deserialize a field that is present in the payload, refusing null.
fn present_non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Validated update, carrying only the fields present in the request.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<String>,
}

impl TaskChanges {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

impl UpdateTask {
    /// Check the constraints on every supplied field and produce the typed
    /// change set. Absent fields stay absent.
    pub fn validate(self) -> ApiResult<TaskChanges> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref description) = self.description {
            validate_description(description)?;
        }
        let status = match self.status.as_deref() {
            Some(raw) => Some(parse_status(raw)?),
            None => None,
        };
        let priority = match self.priority.as_deref() {
            Some(raw) => Some(parse_priority(raw)?),
            None => None,
        };
        if let Some(ref due_date) = self.due_date {
            validate_due_date(due_date)?;
        }
        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            status,
            priority,
            due_date: self.due_date,
        })
    }
}

fn validate_title(title: &str) -> ApiResult<()> {
    let chars = title.trim().chars().count();
    if chars == 0 {
        return Err(ApiError::invalid_value("title", "title must not be empty"));
    }
    if chars > TITLE_MAX_CHARS {
        return Err(ApiError::invalid_value(
            "title",
            "title must be at most 255 characters",
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> ApiResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ApiError::invalid_value(
            "description",
            "description must be at most 2000 characters",
        ));
    }
    Ok(())
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    TaskStatus::from_str(raw).ok_or_else(|| {
        ApiError::invalid_value("status", "status must be one of: pending, completed")
    })
}

fn parse_priority(raw: &str) -> ApiResult<TaskPriority> {
    TaskPriority::from_str(raw).ok_or_else(|| {
        ApiError::invalid_value("priority", "priority must be one of: low, medium, high")
    })
}

fn validate_due_date(due_date: &str) -> ApiResult<()> {
    // Pattern check only, matching the documented contract: 2025-13-40
    // passes even though it is not a real calendar date.
    if !due_date_pattern().is_match(due_date) {
        return Err(ApiError::invalid_value(
            "due_date",
            "due_date must match YYYY-MM-DD",
        ));
    }
    Ok(())
}

fn due_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("due date pattern compiles"))
}
