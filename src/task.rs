//! To-do tasks, as stored in the remote collection

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::date_key::DateKey;


/// The identifier of a task, as assigned by the remote store.
/// It is unique and stable for the whole lifetime of the task.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Generate a random TaskId.
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }
}
impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}



/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    /// The text the user has typed
    text: String,
    completed: bool,
    /// The day this task belongs to. This never changes once the task is created
    date: DateKey,
    /// Assigned by the server. This is only used to order tasks
    created_at: DateTime<Utc>,
}

impl Task {
    /// Create a Task instance from fields that come from the remote store
    pub fn new(id: TaskId, text: String, completed: bool, date: DateKey, created_at: DateTime<Utc>) -> Self {
        Self { id, text, completed, date, created_at }
    }

    pub fn id(&self) -> &TaskId     { &self.id          }
    pub fn text(&self) -> &str      { &self.text        }
    pub fn completed(&self) -> bool { self.completed    }
    pub fn date(&self) -> &DateKey  { &self.date        }
    pub fn created_at(&self) -> &DateTime<Utc> { &self.created_at }

    /// The partial update that flips the completion status of this task
    pub fn toggled(&self) -> TaskPatch {
        TaskPatch { completed: Some(!self.completed) }
    }

    /// Apply a partial update.
    ///
    /// Only remote collections are supposed to call this. Local views are never mutated.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}


/// The fields of a task that are sent to the remote store on creation.
/// The store assigns the ID and the creation timestamp itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub text: String,
    pub completed: bool,
    pub date: DateKey,
}

impl NewTask {
    /// A task that has not been completed yet
    pub fn pending(text: String, date: DateKey) -> Self {
        Self { text, completed: false, date }
    }

    /// Turn this into a full task, once the store has assigned its ID and timestamp
    pub fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task::new(id, self.text, self.completed, self.date, created_at)
    }
}


/// A partial update of a task. Absent fields are left untouched (and are not sent over the wire)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new(
            TaskId::from("abc"),
            "buy milk".to_string(),
            false,
            "2024-03-15".parse().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn toggled_only_carries_completion() {
        let task = sample();
        let patch = task.toggled();
        assert_eq!(patch, TaskPatch { completed: Some(true) });
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({ "completed": true }));
        assert_eq!(serde_json::to_value(&TaskPatch::default()).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn apply_keeps_everything_but_completion() {
        let mut task = sample();
        task.apply(&TaskPatch { completed: Some(true) });
        assert!(task.completed());
        assert_eq!(task.text(), "buy milk");
        assert_eq!(task.date().to_string(), "2024-03-15");

        task.apply(&TaskPatch::default());
        assert!(task.completed());
    }

    #[test]
    fn wire_format() {
        let value = serde_json::to_value(&sample()).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["date"], "2024-03-15");
        assert_eq!(value["completed"], false);
        assert!(value.get("createdAt").is_some());

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample());
    }
}
