//! Models
//!
//! Goal and task records as exchanged with the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task inside a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque id assigned by persistence
    pub task_id: String,
    #[serde(rename = "taskText")]
    pub text: String,
    /// Fractional order key (see [`crate::order`])
    pub order: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Accumulated seconds
    #[serde(default)]
    pub time_spent: u64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create an incomplete task with no deadline
    pub fn new(task_id: impl Into<String>, text: impl Into<String>, order: f64) -> Self {
        Self {
            task_id: task_id.into(),
            text: text.into(),
            order,
            completed: false,
            deadline: None,
            time_spent: 0,
            created_at: Utc::now(),
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// A goal owning a list of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub goal_id: String,
    #[serde(rename = "goalText")]
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(rename = "taskText")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub order: f64,
}

/// Partial update of a task's editable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub task_id: String,
    #[serde(rename = "taskText", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
}

impl TaskPatch {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn time_spent(mut self, seconds: u64) -> Self {
        self.time_spent = Some(seconds);
        self
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.deadline.is_none() && self.time_spent.is_none()
    }

    /// Copy the patched fields onto a task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(text) = &self.text {
            task.text = text.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(seconds) = self.time_spent {
            task.time_spent = seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_format() {
        let task = Task::new("t1", "Write tests", 1000.0);
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["taskId"], "t1");
        assert_eq!(json["taskText"], "Write tests");
        assert_eq!(json["order"], 1000.0);
        assert_eq!(json["timeSpent"], 0);
        assert!(json.get("deadline").is_none());
    }

    #[test]
    fn test_task_defaults_on_deserialize() {
        let task: Task = serde_json::from_str(
            r#"{"taskId":"t9","taskText":"Stretch","order":2500.5,"createdAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(!task.completed);
        assert_eq!(task.time_spent, 0);
        assert_eq!(task.order, 2500.5);
    }

    #[test]
    fn test_patch_apply() {
        let mut task = Task::new("t1", "Old", 1000.0);
        let patch = TaskPatch::new("t1").text("New").time_spent(90);
        assert!(!patch.is_empty());

        patch.apply_to(&mut task);
        assert_eq!(task.text, "New");
        assert_eq!(task.time_spent, 90);
        assert_eq!(task.order, 1000.0);
        assert!(TaskPatch::new("t1").is_empty());
    }
}
