use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::time::parse_timestamp;

/// Categories the pet service turns into action points.
pub const PET_CATEGORIES: [&str; 3] = ["feeding", "cleaning", "playing"];

/// Group name for tasks that carry no tag at all.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Maps every spelling the backend has used onto the closed set.
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "todo" | "pending" => Some(Self::Todo),
            "in_progress" | "in-progress" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some(value) => Self::normalize(value).unwrap_or_else(|| {
                log::warn!("Unknown task status {:?}, treating as todo", value);
                Self::Todo
            }),
            None => Self::Todo,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Self::normalize).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "normalized_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable_points")]
    pub points: u32,
    #[serde(default)]
    pub repeat_every: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub repeat_until: Option<DateTime<Utc>>,
}

impl Task {
    /// A blank todo task; mostly useful for building fixtures and requests.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            user_id: None,
            title: title.into(),
            description: None,
            tags: vec![],
            priority: Priority::default(),
            status: TaskStatus::default(),
            due_at: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
            points: 0,
            repeat_every: None,
            repeat_until: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Not completed and not in the trash.
    pub fn is_active(&self) -> bool {
        !self.is_completed() && !self.is_deleted()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// First tag, or the uncategorized bucket.
    pub fn category(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or(UNCATEGORIZED)
    }
}

/// Envelope returned by `GET /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskPage {
    #[serde(default)]
    pub items: Vec<Task>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body for `POST /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub points: u32,
}

/// Body for `PATCH /tasks/{id}`; only set fields are sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

/// Query parameters understood by the task list endpoint.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub tag: Option<String>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub include_deleted: bool,
    pub only_deleted: bool,
}

pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalized_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|t| normalize_tag(&t))
        .filter(|t| !t.is_empty())
        .collect())
}

pub(crate) fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => {
            let parsed = parse_timestamp(&s);
            if parsed.is_none() && !s.trim().is_empty() {
                log::debug!("Ignoring malformed timestamp {:?}", s);
            }
            parsed
        }
        _ => None,
    })
}

fn nullable_points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|v| v.as_u64())
        .map(|p| p.min(u32::MAX as u64) as u32)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_aliases_collapse() {
        assert_eq!(TaskStatus::normalize("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::normalize(" Completed "), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::normalize("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::normalize("archived"), None);
    }

    #[test]
    fn decodes_loose_backend_payload() {
        let json = r#"{
            "id": 7,
            "title": "Feed Pixel",
            "status": "done",
            "priority": null,
            "tags": [" Feeding ", "", null],
            "due_at": "2025-10-20T12:00:00+00:00",
            "completed_at": "not a date",
            "updated_at": "2025-10-20T08:30:00.123456",
            "points": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.tags, vec!["feeding".to_string()]);
        assert!(task.due_at.is_some());
        assert!(task.completed_at.is_none());
        assert!(task.updated_at.is_some());
        assert_eq!(task.points, 0);
        assert_eq!(task.category(), "feeding");
    }

    #[test]
    fn missing_tags_fall_into_uncategorized() {
        let task: Task = serde_json::from_str(r#"{"id": 1, "title": "x", "tags": null}"#).unwrap();
        assert!(task.tags.is_empty());
        assert_eq!(task.category(), UNCATEGORIZED);
        assert!(task.is_active());
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({"status": "in_progress"}));
    }
}
