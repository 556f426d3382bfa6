//! Top-level wiring: one store, one reminder engine, one state file.
//!
//! Mutations go through here so every state transition is followed by a
//! write-through to disk. The write-through is best effort; a full disk or
//! missing directory degrades persistence, never the running session.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::engine::ReminderEngine;
use crate::filter::StatusFilter;
use crate::import::{self, ImportOutcome};
use crate::persist::StateFile;
use crate::stats::TaskStats;
use crate::store::{Snapshot, Store, TaskPatch};
use crate::task::{Category, Task, TaskDraft};

/// Whether an import overwrites the current list or appends to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Replace,
    Merge,
}

pub struct App {
    store: Store,
    engine: ReminderEngine,
    state_file: StateFile,
}

impl App {
    /// Load persisted state (if any) and wire everything up with the wall
    /// clock.
    #[instrument(skip(settings))]
    pub fn bootstrap(settings: &Settings) -> anyhow::Result<Self> {
        let state_file = match &settings.state_path {
            Some(path) => StateFile::at(path),
            None => StateFile::default_location().context("failed to resolve state location")?,
        };
        Self::with_parts(Box::new(SystemClock), state_file, settings)
    }

    /// Explicit wiring, used by tests and embedders that bring their own
    /// clock or state location.
    pub fn with_parts(
        clock: Box<dyn Clock>,
        state_file: StateFile,
        settings: &Settings,
    ) -> anyhow::Result<Self> {
        let snapshot = match state_file.load()? {
            Some(state) => state.into_snapshot(),
            None => Snapshot::default(),
        };
        info!(tasks = snapshot.tasks.len(), "app started");

        Ok(Self {
            store: Store::from_snapshot(snapshot, clock),
            engine: ReminderEngine::new(settings),
            state_file,
        })
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// The ranked, filtered main view.
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.store.snapshot().visible_tasks(self.store.now())
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.store.snapshot().tasks, self.store.now())
    }

    /// One cooperative step of the reminder/notification machinery. Call
    /// from the host's timer loop.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        self.engine.tick(&mut self.store)?;
        self.state_file.save_best_effort(&self.store.snapshot());
        Ok(())
    }

    /// Cancel outstanding notification timers, e.g. when the view goes
    /// away. Pending notifications are cleared with them.
    pub fn shutdown_notifications(&mut self) {
        self.store.clear_notifications();
        self.engine.cancel_all();
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> anyhow::Result<Arc<Snapshot>> {
        let snapshot = self.store.add_task(draft)?;
        self.state_file.save_best_effort(&snapshot);
        Ok(snapshot)
    }

    pub fn toggle_completed(&mut self, id: Uuid) -> anyhow::Result<Arc<Snapshot>> {
        let snapshot = self.store.toggle_completed(id)?;
        self.state_file.save_best_effort(&snapshot);
        Ok(snapshot)
    }

    pub fn delete_task(&mut self, id: Uuid) -> anyhow::Result<Arc<Snapshot>> {
        let snapshot = self.store.delete_task(id)?;
        self.state_file.save_best_effort(&snapshot);
        Ok(snapshot)
    }

    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) -> anyhow::Result<Arc<Snapshot>> {
        let snapshot = self.store.update_task(id, patch)?;
        self.state_file.save_best_effort(&snapshot);
        Ok(snapshot)
    }

    /// The "+1h" snooze from a reminder notification.
    pub fn snooze_task(&mut self, id: Uuid) -> anyhow::Result<Arc<Snapshot>> {
        let snapshot = self.store.extend_due(id, Duration::hours(1))?;
        self.state_file.save_best_effort(&snapshot);
        Ok(snapshot)
    }

    pub fn dismiss_notification(&mut self, id: Uuid) -> Arc<Snapshot> {
        self.store.dismiss_notification(id)
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) -> Arc<Snapshot> {
        let snapshot = self.store.set_status_filter(status);
        self.state_file.save_best_effort(&snapshot);
        snapshot
    }

    pub fn set_category_filter(&mut self, category: Option<Category>) -> Arc<Snapshot> {
        let snapshot = self.store.set_category_filter(category);
        self.state_file.save_best_effort(&snapshot);
        snapshot
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> Arc<Snapshot> {
        let snapshot = self.store.set_search_query(query);
        self.state_file.save_best_effort(&snapshot);
        snapshot
    }

    pub fn toggle_dark_mode(&mut self) -> Arc<Snapshot> {
        let snapshot = self.store.toggle_dark_mode();
        self.state_file.save_best_effort(&snapshot);
        snapshot
    }

    /// Import records from raw JSON (bare array or export envelope).
    /// Returns the outcome so the caller can report imported and dropped
    /// counts; partial success is expected behavior, not an error.
    #[instrument(skip(self, raw))]
    pub fn import_json(&mut self, raw: &str, mode: ImportMode) -> anyhow::Result<ImportOutcome> {
        let outcome = import::parse_import(raw, self.store.now())?;
        self.apply_import(&outcome, mode);
        Ok(outcome)
    }

    #[instrument(skip(self, raw))]
    pub fn import_csv(&mut self, raw: &str, mode: ImportMode) -> anyhow::Result<ImportOutcome> {
        let outcome = import::import_csv(raw, self.store.now())?;
        self.apply_import(&outcome, mode);
        Ok(outcome)
    }

    fn apply_import(&mut self, outcome: &ImportOutcome, mode: ImportMode) {
        let tasks = match mode {
            ImportMode::Replace => outcome.tasks.clone(),
            // Merge is concatenation by the caller of replace_all; the
            // store itself has no merge logic.
            ImportMode::Merge => {
                let mut merged = self.store.snapshot().tasks.clone();
                merged.extend(outcome.tasks.iter().cloned());
                merged
            }
        };
        let snapshot = self.store.replace_all(tasks);
        self.state_file.save_best_effort(&snapshot);
        info!(
            imported = outcome.tasks.len(),
            dropped = outcome.dropped,
            ?mode,
            "import applied"
        );
    }

    pub fn export_json(&self) -> anyhow::Result<String> {
        import::export_json(&self.store.snapshot().tasks, self.store.now())
    }

    pub fn export_csv(&self) -> String {
        import::export_csv(&self.store.snapshot().tasks)
    }

    /// Wipe the task list. The caller owns the are-you-sure dialog.
    pub fn clear_all_tasks(&mut self) -> Arc<Snapshot> {
        let snapshot = self.store.replace_all(Vec::new());
        self.state_file.save_best_effort(&snapshot);
        snapshot
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }
}
