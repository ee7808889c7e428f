//! Structured logging for the runtime.
//!
//! Everything in the crate logs through `tracing` macros. This module installs
//! the subscriber that turns those events into text:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer → stderr | RotatingFile
//! ```
//!
//! # Configuration
//!
//! The level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` in the configuration file or `--trace-level`
//! 3. Default: `"info"`
//!
//! Output goes to stderr unless `log_file` / `--log-file` names a file, which
//! then rotates at 10 MiB keeping 3 backups.
//!
//! # Modules
//!
//! - [`init`]: subscriber setup
//! - [`file_writer`]: rotating log file

mod file_writer;
mod init;

pub use file_writer::{RotatingFile, MAX_BACKUP_FILES, MAX_FILE_SIZE_BYTES};
pub use init::init_tracing;
