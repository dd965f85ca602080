//! File logging for the terminal UI.
//!
//! The UI owns stdout/stderr while it runs, so every `tracing` event goes to
//! a daily rolling file instead. Call [`init_logging`] once at startup.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const APP_NAME: &str = "meeting-mind";
const LOG_DIR_ENV: &str = "MEETING_MIND_LOG_DIR";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Install the global subscriber and return the directory logs land in.
///
/// `RUST_LOG` overrides the default `info` filter. Later calls return the
/// first resolved directory without touching the subscriber.
pub fn init_logging(explicit_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = LOG_DIR.get() {
        return Ok(dir.clone());
    }

    let env_dir = std::env::var(LOG_DIR_ENV).ok().map(PathBuf::from);
    let resolved_dir = resolve_log_dir(explicit_dir, env_dir.as_deref(), home_dir().as_deref());
    std::fs::create_dir_all(&resolved_dir)
        .with_context(|| format!("failed to create log directory: {}", resolved_dir.display()))?;

    let appender = rolling::daily(&resolved_dir, format!("{APP_NAME}.log"));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_DIR.set(resolved_dir.clone());
    Ok(resolved_dir)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

fn resolve_log_dir(explicit: Option<&Path>, env_dir: Option<&Path>, home: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit.or(env_dir) {
        return expand_home(dir, home);
    }

    match home {
        Some(home) => home.join(".local").join("share").join(APP_NAME),
        None => PathBuf::from(".").join(APP_NAME),
    }
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    if let (Some(rest), Some(home)) = (path.to_str().and_then(|s| s.strip_prefix("~/")), home) {
        return home.join(rest);
    }
    path.to_path_buf()
}
