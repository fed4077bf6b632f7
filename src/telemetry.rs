//! Trace logging setup.
//!
//! Library code emits `tracing` events unconditionally; they go nowhere until
//! [`init_tracing`] installs a JSON-lines file subscriber.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub fn tracing_log_path() -> PathBuf {
    env::var("VOXTASK_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("voxtask_trace.jsonl"))
}

pub fn tracing_enabled(config: &AppConfig) -> bool {
    config.logs && !config.no_logs
}

/// Install the global subscriber once. Later calls are no-ops, as are calls
/// with logging disabled or an unwritable log path.
pub fn init_tracing(config: &AppConfig) {
    if !tracing_enabled(config) {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let filter = EnvFilter::try_from_env("VOXTASK_LOG_LEVEL")
            .unwrap_or_else(|_| EnvFilter::new("voxtask=debug"));
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
