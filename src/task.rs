// Task record and its opaque identifier

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single task, serialized exactly as persisted:
/// `{"title": ..., "status": ..., "timestamp": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    /// false = pending, true = done
    pub status: bool,
    /// RFC 3339 creation instant, unique within a collection
    pub timestamp: String,
}

impl Task {
    /// Build a pending task stamped with the given creation instant
    pub fn new(title: impl Into<String>, timestamp: String) -> Self {
        Self {
            title: title.into(),
            status: false,
            timestamp,
        }
    }

    /// The task's identifier (its creation timestamp)
    pub fn id(&self) -> TaskId {
        TaskId(self.timestamp.clone())
    }
}

/// Opaque task identifier
///
/// Wraps the creation timestamp so callers address tasks by identity
/// instead of list position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// Current UTC instant as RFC 3339 with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Advance an RFC 3339 timestamp by one millisecond
///
/// Used to keep creation stamps unique when two adds land in the same
/// millisecond. A stamp that does not parse falls back to the current
/// instant.
pub(crate) fn next_millis(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => (dt.with_timezone(&Utc) + TimeDelta::milliseconds(1))
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        Err(_) => now_iso(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serialization_layout() {
        let task = Task::new("Buy milk", "2024-01-15T10:30:00.000Z".to_string());
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Buy milk","status":false,"timestamp":"2024-01-15T10:30:00.000Z"}"#
        );
    }

    #[test]
    fn test_task_deserialization() {
        let json = r#"{"title":"Call home","status":true,"timestamp":"2024-01-15T10:30:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.title, "Call home");
        assert!(task.status);
        assert_eq!(task.id().as_str(), "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn test_now_iso_parses_back() {
        let stamp = now_iso();
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn test_next_millis_advances() {
        let bumped = next_millis("2024-01-15T10:30:00.000Z");
        assert_eq!(bumped, "2024-01-15T10:30:00.001Z");
        assert!(bumped > "2024-01-15T10:30:00.000Z".to_string());
    }

    #[test]
    fn test_next_millis_carries_over_second() {
        let bumped = next_millis("2024-01-15T10:30:00.999Z");
        assert_eq!(bumped, "2024-01-15T10:30:01.000Z");
    }

    #[test]
    fn test_task_id_display() {
        let id = TaskId::from("2024-01-15T10:30:00.000Z");
        assert_eq!(id.to_string(), "2024-01-15T10:30:00.000Z");
    }
}
