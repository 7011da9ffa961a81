//! Task models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::{due_date, Id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "TO_DO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Table form, e.g. "IN PROGRESS"
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "TO_DO" | "TODO" => Ok(TaskStatus::ToDo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" | "DONE" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "invalid status '{}' (expected TO_DO, IN_PROGRESS or COMPLETED)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "LOW",
            Urgency::Medium => "MEDIUM",
            Urgency::High => "HIGH",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Urgency::Low),
            "MEDIUM" => Ok(Urgency::Medium),
            "HIGH" => Ok(Urgency::High),
            _ => Err(format!(
                "invalid urgency '{}' (expected LOW, MEDIUM or HIGH)",
                s
            )),
        }
    }
}

/// Task as returned by `/api/task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` when the server sent no due date or one that could not be read
    #[serde(default, with = "due_date::optional")]
    pub date_end: Option<NaiveDateTime>,
    pub status: TaskStatus,
    pub urgency: Urgency,
    #[serde(default, alias = "userId", alias = "user_id")]
    pub owner_id: Option<Id>,
}

/// Editable task fields, sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    #[serde(with = "due_date")]
    pub date_end: NaiveDateTime,
    pub status: TaskStatus,
    pub urgency: Urgency,
    #[serde(rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialize_server_shape() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": 12,
                "title": "Write report",
                "description": null,
                "dateEnd": "2025-06-01T17:00:00",
                "status": "IN_PROGRESS",
                "urgency": "HIGH",
                "userId": 3
            }"#,
        )
        .unwrap();

        assert_eq!(task.id, Id::from("12"));
        assert_eq!(task.description, None);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.urgency, Urgency::High);
        assert_eq!(task.owner_id, Some(Id::from("3")));
        assert_eq!(task.date_end, due_date::parse("2025-06-01T17:00"));
    }

    #[test]
    fn test_listing_survives_unreadable_due_date() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "a", "dateEnd": "2025-06-01T17:00:00-05:00", "status": "TO_DO", "urgency": "LOW"},
                {"id": 2, "title": "b", "dateEnd": "next week", "status": "TO_DO", "urgency": "LOW"},
                {"id": 3, "title": "c", "status": "TO_DO", "urgency": "LOW"}
            ]"#,
        )
        .unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].date_end, due_date::parse("2025-06-01T17:00"));
        assert_eq!(tasks[1].date_end, None);
        assert_eq!(tasks[2].date_end, None);
    }

    #[test]
    fn test_payload_field_names() {
        let payload = TaskPayload {
            title: "t".into(),
            description: String::new(),
            date_end: due_date::parse("2025-01-02T03:04").unwrap(),
            status: TaskStatus::ToDo,
            urgency: Urgency::Low,
            owner_id: Some(Id::from("9")),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["dateEnd"], "2025-01-02T03:04:00");
        assert_eq!(value["status"], "TO_DO");
        assert_eq!(value["urgency"], "LOW");
        assert_eq!(value["user_id"], "9");

        let without_owner = TaskPayload {
            owner_id: None,
            ..payload
        };
        let value = serde_json::to_value(&without_owner).unwrap();
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_status_and_urgency_parsing() {
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::ToDo);
        assert!("blocked".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::InProgress.label(), "IN PROGRESS");

        assert_eq!("medium".parse::<Urgency>().unwrap(), Urgency::Medium);
        assert!("urgent".parse::<Urgency>().is_err());
    }
}
