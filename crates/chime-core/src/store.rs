//! Canonical application state and its mutation API.
//!
//! The store owns the task list and the notification list. Every operation
//! is an atomic transition from one immutable [`Snapshot`] to the next:
//! readers holding a previously returned snapshot never observe a partial
//! update, because operations build a fresh snapshot and swap it in whole.
//! There are no ambient singletons; callers hold the [`Store`] and pass it
//! where it is needed.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::clock::Clock;
use crate::filter::{self, StatusFilter, ViewFilter};
use crate::task::{Category, Notification, NotificationDraft, Priority, Task, TaskDraft};

/// One immutable state value. Cheap to share via `Arc`; cloned wholesale
/// by the store when producing the next state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    pub view: ViewFilter,
    pub dark_mode: bool,
}

impl Snapshot {
    pub fn find_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// The composed read path: filter, then rank. The main view always
    /// reads through here rather than touching `tasks` directly.
    #[must_use]
    pub fn visible_tasks(&self, now: NaiveDateTime) -> Vec<Task> {
        filter::apply(&self.tasks, &self.view, now)
    }
}

/// Partial update for [`Store::update_task`]. Outer `Option` means "this
/// field is part of the patch"; for the nullable due components the inner
/// `Option` carries the new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub due_time: Option<Option<NaiveTime>>,
    pub reminder_minutes: Option<u32>,
}

pub struct Store {
    snapshot: Arc<Snapshot>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            snapshot: Arc::new(Snapshot::default()),
            clock,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, clock: Box<dyn Clock>) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            clock,
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn commit(&mut self, next: Snapshot) -> Arc<Snapshot> {
        self.snapshot = Arc::new(next);
        Arc::clone(&self.snapshot)
    }

    /// Precondition: `draft.text` is non-empty after trimming. The form
    /// layer owns that check; the store still refuses to enter the invalid
    /// state rather than storing a blank task.
    #[instrument(skip(self, draft), fields(text = %draft.text))]
    pub fn add_task(&mut self, draft: TaskDraft) -> anyhow::Result<Arc<Snapshot>> {
        if draft.text.trim().is_empty() {
            bail!("task text must not be empty");
        }

        let task = Task::from_draft(draft, self.clock.now());
        info!(id = %task.id, "task added");

        let mut next = (*self.snapshot).clone();
        next.tasks.push(task);
        Ok(self.commit(next))
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn toggle_completed(&mut self, id: Uuid) -> anyhow::Result<Arc<Snapshot>> {
        let mut next = (*self.snapshot).clone();
        let task = find_task_mut(&mut next.tasks, id)?;
        task.completed = !task.completed;
        debug!(completed = task.completed, "toggled task");
        Ok(self.commit(next))
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn delete_task(&mut self, id: Uuid) -> anyhow::Result<Arc<Snapshot>> {
        let mut next = (*self.snapshot).clone();
        let before = next.tasks.len();
        next.tasks.retain(|task| task.id != id);
        if next.tasks.len() == before {
            return Err(anyhow!("no task with id {id}"));
        }
        info!("task deleted");
        Ok(self.commit(next))
    }

    /// Applies `patch` to the task. Whenever the patch names `due_date` or
    /// `due_time`, even if only one of the pair, the derived `due_datetime`
    /// is recomputed from the merged raw components.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> anyhow::Result<Arc<Snapshot>> {
        if let Some(text) = &patch.text
            && text.trim().is_empty()
        {
            bail!("task text must not be empty");
        }

        let mut next = (*self.snapshot).clone();
        let task = find_task_mut(&mut next.tasks, id)?;

        if let Some(text) = patch.text {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(reminder_minutes) = patch.reminder_minutes {
            task.reminder_minutes = reminder_minutes;
        }

        let touches_due = patch.due_date.is_some() || patch.due_time.is_some();
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = patch.due_time {
            task.due_time = due_time;
        }
        if touches_due {
            task.rederive_due_datetime();
            debug!(due = ?task.due_datetime, "re-derived due datetime");
        }

        Ok(self.commit(next))
    }

    /// Push the task's due timestamp out by `delta`, e.g. the "+1h" snooze
    /// on a reminder. The raw date/time components are rewritten from the
    /// shifted timestamp so the derivation invariant holds.
    #[instrument(skip(self), fields(id = %id))]
    pub fn extend_due(&mut self, id: Uuid, delta: Duration) -> anyhow::Result<Arc<Snapshot>> {
        let mut next = (*self.snapshot).clone();
        let task = find_task_mut(&mut next.tasks, id)?;
        let due = task
            .due_datetime
            .ok_or_else(|| anyhow!("task {id} has no due time to extend"))?;

        let shifted = due + delta;
        task.due_date = Some(shifted.date());
        task.due_time = Some(shifted.time());
        task.rederive_due_datetime();
        info!(due = %shifted, "due time extended");
        Ok(self.commit(next))
    }

    /// Bulk replace, used by import and clear-all. No merge logic here: a
    /// merge is the caller concatenating before calling.
    #[instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.tasks = tasks;
        info!("task list replaced");
        self.commit(next)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub fn record_reminder_shown(
        &mut self,
        id: Uuid,
        timestamp: NaiveDateTime,
    ) -> anyhow::Result<Arc<Snapshot>> {
        let mut next = (*self.snapshot).clone();
        let task = find_task_mut(&mut next.tasks, id)?;
        task.last_reminder_shown = Some(timestamp);
        Ok(self.commit(next))
    }

    #[instrument(skip(self, draft))]
    pub fn push_notification(&mut self, draft: NotificationDraft) -> (Arc<Snapshot>, Uuid) {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            task_id: draft.task_id,
            timestamp: self.clock.now(),
        };
        let id = notification.id;
        debug!(%id, kind = ?notification.kind, "notification pushed");

        let mut next = (*self.snapshot).clone();
        next.notifications.push(notification);
        (self.commit(next), id)
    }

    /// Dismissing an id that is already gone is a no-op, not an error:
    /// expiry timers and manual dismissal may race within one tick.
    #[instrument(skip(self), fields(id = %id))]
    pub fn dismiss_notification(&mut self, id: Uuid) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.notifications.retain(|n| n.id != id);
        self.commit(next)
    }

    #[instrument(skip(self))]
    pub fn clear_notifications(&mut self) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.notifications.clear();
        self.commit(next)
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.view.status = status;
        self.commit(next)
    }

    pub fn set_category_filter(&mut self, category: Option<Category>) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.view.category = category;
        self.commit(next)
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.view.query = query.into();
        self.commit(next)
    }

    pub fn toggle_dark_mode(&mut self) -> Arc<Snapshot> {
        let mut next = (*self.snapshot).clone();
        next.dark_mode = !next.dark_mode;
        self.commit(next)
    }
}

fn find_task_mut(tasks: &mut [Task], id: Uuid) -> anyhow::Result<&mut Task> {
    tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("no task with id {id}"))
}
