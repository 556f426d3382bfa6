//! Single-file JSON persistence for the app snapshot.
//!
//! The whole state lives under one key, mirroring a browser-local store:
//! one file, one serialized snapshot. Writes go through a temp file and an
//! atomic rename. Notifications are ephemeral and never written.
//!
//! A failed save is an error for the caller to report, nothing more: the
//! in-memory snapshot stays authoritative for the session. Known
//! limitation: two processes sharing one state file are last-writer-wins.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::filter::{StatusFilter, ViewFilter};
use crate::store::Snapshot;
use crate::task::{Category, Task};

const STATE_FILE_NAME: &str = "state.json";
const APP_DIR_NAME: &str = "chime";

/// On-disk shape of the snapshot. Fields default individually so a state
/// file written by an older version still loads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersistedState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub filter: StatusFilter,
    #[serde(default)]
    pub selected_category: Option<Category>,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub dark_mode: bool,
}

impl PersistedState {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            tasks: snapshot.tasks.clone(),
            filter: snapshot.view.status,
            selected_category: snapshot.view.category,
            search_query: snapshot.view.query.clone(),
            dark_mode: snapshot.dark_mode,
        }
    }

    /// Rebuild a live snapshot, migrating old records: optional task fields
    /// already defaulted at parse time, and `due_datetime` re-derived when
    /// a raw date is present but the derivation was never stored.
    pub fn into_snapshot(mut self) -> Snapshot {
        for task in &mut self.tasks {
            if task.due_datetime.is_none() && task.due_date.is_some() {
                task.rederive_due_datetime();
            }
        }
        Snapshot {
            tasks: self.tasks,
            notifications: Vec::new(),
            view: ViewFilter {
                status: self.filter,
                category: self.selected_category,
                query: self.search_query,
            },
            dark_mode: self.dark_mode,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> anyhow::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| anyhow!("no platform data directory"))?;
        Ok(Self::at(base.join(APP_DIR_NAME).join(STATE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no state has been written yet; a present but
    /// unreadable file is an error with the path in context.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> anyhow::Result<Option<PersistedState>> {
        if !self.path.exists() {
            debug!("no state file yet");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading {}", self.path.display()))?;
        let state: PersistedState = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing {}", self.path.display()))?;
        info!(tasks = state.tasks.len(), "loaded state");
        Ok(Some(state))
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let state = PersistedState::from_snapshot(snapshot);
        let serialized =
            serde_json::to_string_pretty(&state).context("failed serializing state")?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        fs::write(temp.path(), serialized.as_bytes())
            .with_context(|| format!("failed writing {}", temp.path().display()))?;
        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;

        debug!(tasks = state.tasks.len(), "saved state");
        Ok(())
    }

    /// Write-through used after each mutation: log and swallow failures so
    /// the session keeps running on the in-memory snapshot.
    pub fn save_best_effort(&self, snapshot: &Snapshot) {
        if let Err(err) = self.save(snapshot) {
            warn!(error = %format!("{err:#}"), "state write-through failed; in-memory state remains authoritative");
        }
    }
}
