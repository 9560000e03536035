use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserCreated,
    UserUpdated,
    TaskCreated,
    TaskPending,
    TaskCompleted,
    TaskDeleted,
    PetCreated,
    PetUpdated,
    #[serde(untagged)]
    Other(String),
}

impl EventKind {
    pub fn label(&self) -> &str {
        match self {
            Self::UserCreated => "User Created",
            Self::UserUpdated => "User Updated",
            Self::TaskCreated => "Task Created",
            Self::TaskPending => "Task Started",
            Self::TaskCompleted => "Task Completed",
            Self::TaskDeleted => "Task Deleted",
            Self::PetCreated => "Pet Created",
            Self::PetUpdated => "Pet Updated",
            Self::Other(_) => "Event",
        }
    }
}

/// One change notification pushed by the gateway's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub label: String,
    pub message: String,
    pub timestamp: Option<String>,
}

impl Notification {
    pub fn from_event(event: &ChangeEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            label: event.kind.label().to_string(),
            message: describe_payload(&event.data),
            timestamp: event.timestamp.clone(),
        }
    }
}

fn describe_payload(data: &serde_json::Value) -> String {
    for key in ["title", "name"] {
        if let Some(text) = data.get(key).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    let id = ["id", "task_id"]
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|v| !v.is_null());
    match id {
        Some(serde_json::Value::String(s)) => format!("ID: {}", s),
        Some(other) => format!("ID: {}", other),
        None => "ID: unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_types_are_kept() {
        let event: ChangeEvent =
            serde_json::from_str(r#"{"type": "roadmap_created", "data": {"id": 4}}"#).unwrap();
        assert_eq!(event.kind, EventKind::Other("roadmap_created".to_string()));
        assert_eq!(Notification::from_event(&event).message, "ID: 4");
        assert_eq!(Notification::from_event(&event).label, "Event");
    }

    #[test]
    fn notification_prefers_title() {
        let event: ChangeEvent = serde_json::from_str(
            r#"{"type": "task_completed", "data": {"title": "Brush Pixel", "task_id": 9}, "timestamp": "2025-10-20T10:00:00"}"#,
        )
        .unwrap();
        let note = Notification::from_event(&event);
        assert_eq!(note.label, "Task Completed");
        assert_eq!(note.message, "Brush Pixel");
    }

    #[test]
    fn notification_falls_back_to_task_id() {
        let event: ChangeEvent =
            serde_json::from_str(r#"{"type": "task_deleted", "data": {"task_id": 12}}"#).unwrap();
        assert_eq!(Notification::from_event(&event).message, "ID: 12");
    }
}
