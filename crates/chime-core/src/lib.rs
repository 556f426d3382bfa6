//! Chime: a personal task-list core with time-aware urgency, filtering,
//! ranking, and at-most-once reminders.
//!
//! The crate is the whole application minus the rendering surface: a host
//! (GUI, TUI, whatever) constructs an [`app::App`], dispatches user actions
//! into it, reads [`app::App::visible_tasks`] for the list, and drives
//! [`app::App::tick`] from a timer. All time-dependent logic takes an
//! explicit `now` from an injectable [`clock::Clock`], so every behavior is
//! reproducible in tests.

pub mod app;
pub mod clock;
pub mod config;
pub mod engine;
pub mod filter;
pub mod format;
pub mod import;
pub mod persist;
pub mod rank;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod task;

use anyhow::anyhow;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Set up tracing for a host binary. Verbosity counts stack the usual way;
/// `RUST_LOG` wins when set.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
