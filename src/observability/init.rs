//! Tracing initialization and subscriber setup.

use super::file_writer::RotatingFile;
use crate::Config;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// # Filter Resolution
///
/// 1. `RUST_LOG`, if set and valid
/// 2. `config.trace_level`
/// 3. Default: `"info"`
///
/// # Output
///
/// With `config.log_file` set, events go to that file (no ANSI colors) through a
/// [`RotatingFile`]; otherwise to stderr.
///
/// # Initialization Behavior
///
/// - Creates the log file's directory if needed; falls back to stderr if it cannot
/// - Idempotent: safe to call multiple times (only the first call takes effect)
///
/// # Example
///
/// ```rust
/// use tickbus::observability::init_tracing;
/// use tickbus::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = config.log_file.as_ref().and_then(|path| {
        let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        match dir.map_or(Ok(()), std::fs::create_dir_all) {
            Ok(()) => Some(RotatingFile::new(path.clone())),
            Err(e) => {
                eprintln!("tickbus: cannot create log directory for {}: {e}", path.display());
                None
            }
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    let _ = match file {
        Some(file) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init(),
        None => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init(),
    };
}
