use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::derive_due_datetime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Shopping,
    Health,
    Study,
}

impl Default for Category {
    fn default() -> Self {
        Self::Personal
    }
}

/// Ordered so that `High > Medium > Low` under the derived `Ord`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub due_time: Option<NaiveTime>,

    /// Derived from `due_date`/`due_time`; `Some` iff `due_date` is `Some`.
    /// Persisted alongside the raw fields and re-derived on load when absent.
    #[serde(default)]
    pub due_datetime: Option<NaiveDateTime>,

    #[serde(default)]
    pub reminder_minutes: u32,

    #[serde(default)]
    pub last_reminder_shown: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
}

/// Caller-supplied fields for a new task. Everything the store assigns
/// itself (id, created_at, due_datetime) is absent here.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub reminder_minutes: u32,
}

impl Task {
    pub fn from_draft(draft: TaskDraft, now: NaiveDateTime) -> Self {
        let due_datetime = derive_due_datetime(draft.due_date, draft.due_time);
        Self {
            id: Uuid::new_v4(),
            text: draft.text,
            completed: false,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            due_time: draft.due_time,
            due_datetime,
            reminder_minutes: draft.reminder_minutes,
            last_reminder_shown: None,
            created_at: now,
        }
    }

    /// Recompute `due_datetime` from the raw components. Every mutation
    /// path that touches `due_date` or `due_time` must call this.
    pub fn rederive_due_datetime(&mut self) {
        self.due_datetime = derive_due_datetime(self.due_date, self.due_time);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Info,
    Warning,
    Error,
}

/// Ephemeral UI event. Never persisted; a fresh session starts with none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Back-reference for lookup only; the task is not owned by the
    /// notification and may have been deleted since.
    pub task_id: Option<Uuid>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub task_id: Option<Uuid>,
}
