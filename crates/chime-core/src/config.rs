//! Optional TOML settings file for the handful of tunables the host app
//! cares about. Missing file means defaults; a present but broken file is
//! an error rather than silently ignored configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

const SETTINGS_FILE_NAME: &str = "settings.toml";
const APP_DIR_NAME: &str = "chime";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_DISMISS_AFTER_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How often the reminder pass runs.
    pub poll_interval_secs: u64,
    /// How long a notification stays on screen before auto-dismissal.
    pub dismiss_after_secs: u64,
    /// Override for the state file location.
    pub state_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            dismiss_after_secs: DEFAULT_DISMISS_AFTER_SECS,
            state_path: None,
        }
    }
}

impl Settings {
    /// Load from `path`, or from the platform config dir when `None`.
    #[tracing::instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let resolved = match path {
            Some(path) => path.to_path_buf(),
            None => match default_settings_path() {
                Some(path) => path,
                None => {
                    debug!("no platform config directory; using default settings");
                    return Ok(Self::default());
                }
            },
        };

        if !resolved.exists() {
            debug!(path = %resolved.display(), "no settings file; using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&resolved)
            .with_context(|| format!("failed reading {}", resolved.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("failed parsing {}", resolved.display()))?;
        info!(path = %resolved.display(), "loaded settings");
        Ok(settings)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}
