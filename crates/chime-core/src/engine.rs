//! Reminder polling and notification lifetime, driven by explicit ticks.
//!
//! The whole app runs on one cooperative thread: the host calls
//! [`ReminderEngine::tick`] from its event loop (once a second is plenty)
//! and user actions go straight to the [`Store`] in between. A poll pass
//! always walks a single immutable snapshot, so a user action dispatched
//! during the same tick cannot change the list under it.
//!
//! Dismissal timers are data, not callbacks: each displayed notification
//! is armed exactly once with a deadline, and [`ReminderEngine::tick`]
//! retires the ones whose deadline has passed. Arming is keyed by
//! notification id, so re-rendering a notification never schedules a
//! second timer.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::Settings;
use crate::format::{DateTimeFormat, format_date_time};
use crate::schedule::should_fire;
use crate::store::Store;
use crate::task::{NotificationDraft, NotificationKind};

pub struct ReminderEngine {
    poll_interval: Duration,
    dismiss_after: Duration,
    last_poll: Option<NaiveDateTime>,
    /// Dismissal deadline per armed notification; one-shot per id.
    armed: HashMap<Uuid, NaiveDateTime>,
}

impl ReminderEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            poll_interval: Duration::seconds(settings.poll_interval_secs as i64),
            dismiss_after: Duration::seconds(settings.dismiss_after_secs as i64),
            last_poll: None,
            armed: HashMap::new(),
        }
    }

    /// One cooperative step: run a reminder pass when the poll interval has
    /// elapsed, arm dismissal timers for newly displayed notifications, and
    /// retire the expired ones.
    pub fn tick(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let now = store.now();
        let poll_due = self
            .last_poll
            .is_none_or(|last| now - last >= self.poll_interval);
        if poll_due {
            self.poll(store, now)?;
            self.last_poll = Some(now);
        }

        self.arm_dismissals(store, now);
        self.expire(store, now);
        Ok(())
    }

    /// A single reminder pass over a consistent snapshot of the task list.
    /// Fires at most one notification per lead-time crossing: the shown
    /// timestamp is recorded in the same pass, and [`should_fire`] compares
    /// it against the window start.
    #[instrument(skip(self, store))]
    pub fn poll(&mut self, store: &mut Store, now: NaiveDateTime) -> anyhow::Result<()> {
        let snapshot = store.snapshot();
        let mut fired = 0_usize;

        for task in &snapshot.tasks {
            if task.completed || task.due_datetime.is_none() || task.reminder_minutes == 0 {
                continue;
            }
            if !should_fire(
                task.due_datetime,
                task.reminder_minutes,
                task.last_reminder_shown,
                now,
            ) {
                continue;
            }

            let due_label = task
                .due_datetime
                .map(|due| format_date_time(due, DateTimeFormat::Full))
                .unwrap_or_default();
            store.push_notification(NotificationDraft {
                kind: NotificationKind::Reminder,
                title: "Task reminder".to_string(),
                message: format!("\"{}\" is due at {due_label}", task.text),
                task_id: Some(task.id),
            });
            store.record_reminder_shown(task.id, now)?;
            fired += 1;
        }

        if fired > 0 {
            info!(fired, "reminder pass fired notifications");
        } else {
            debug!("reminder pass fired nothing");
        }
        Ok(())
    }

    /// Arm a dismissal deadline for every notification that does not have
    /// one yet. Guarded per id: a second render of the same notification
    /// finds the entry and leaves it alone.
    pub fn arm_dismissals(&mut self, store: &Store, now: NaiveDateTime) {
        for notification in &store.snapshot().notifications {
            self.armed
                .entry(notification.id)
                .or_insert_with(|| now + self.dismiss_after);
        }
    }

    /// Dismiss notifications whose deadline has passed, and forget timers
    /// for notifications the user already dismissed by hand.
    pub fn expire(&mut self, store: &mut Store, now: NaiveDateTime) {
        let live: Vec<Uuid> = store
            .snapshot()
            .notifications
            .iter()
            .map(|n| n.id)
            .collect();
        self.armed.retain(|id, _| live.contains(id));

        let expired: Vec<Uuid> = self
            .armed
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            debug!(%id, "notification display timeout");
            store.dismiss_notification(id);
            self.armed.remove(&id);
        }
    }

    /// Cancel every outstanding dismissal timer and reset the poll cadence.
    /// Called when the view goes away or notifications are bulk-cleared, so
    /// no timer later acts on stale state.
    pub fn cancel_all(&mut self) {
        self.armed.clear();
        self.last_poll = None;
    }

    #[cfg(test)]
    pub(crate) fn armed_count(&self) -> usize {
        self.armed.len()
    }
}
