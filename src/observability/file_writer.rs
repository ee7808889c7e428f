//! Log file writer with size-based rotation and backup retention.
//!
//! Keeps a long-running device from filling its storage with logs: once the
//! active file passes a size threshold it is renamed with a timestamp suffix, a
//! fresh file is started, and only the newest backups are kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum file size before rotation (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
pub const MAX_BACKUP_FILES: usize = 3;

/// A size-rotating log file.
///
/// # Rotation Strategy
///
/// 1. Check the file size before each write
/// 2. If it exceeds the limit, rotate:
///    - Rename the current file to `<name>.<timestamp>`
///    - Open a new empty file on the next write
///    - Remove backups beyond the retention count, oldest first
///
/// Not synchronized itself; wrap it in a `Mutex` to share it, which is what
/// [`init_tracing`](super::init_tracing) does.
pub struct RotatingFile {
    path: PathBuf,
    file: Option<File>,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFile {
    /// Creates a writer for `path` with the default limits.
    ///
    /// The file is opened lazily on first write, so construction never fails.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limits(path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    /// Creates a writer with explicit rotation limits.
    #[must_use]
    pub const fn with_limits(path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            path,
            file: None,
            max_bytes,
            backups,
        }
    }

    /// Path of the active file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_and_rotate(&mut self) -> io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.path) {
            if metadata.len() > self.max_bytes {
                self.file = None;
                self.rotate()?;
            }
        }
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        let mut backup = self.backup_path(stamp);
        let mut bump = stamp;
        while backup.exists() {
            bump += 1;
            backup = self.backup_path(bump);
        }

        if self.path.exists() {
            fs::rename(&self.path, &backup)?;
        }
        self.cleanup_old_backups()
    }

    fn backup_path(&self, stamp: u128) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{stamp}"));
        self.path.with_file_name(name)
    }

    /// Removes backups beyond the retention count, newest kept.
    ///
    /// Individual deletion errors are ignored so cleanup always finishes.
    fn cleanup_old_backups(&self) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let Some(prefix) = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("{name}."))
        else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid log file name"));
        };

        let mut backups: Vec<(u128, PathBuf)> = fs::read_dir(parent)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter_map(|path| {
                let stamp = path
                    .file_name()?
                    .to_str()?
                    .strip_prefix(&prefix)?
                    .parse::<u128>()
                    .ok()?;
                Some((stamp, path))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, old) in backups.iter().skip(self.backups) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_and_rotate()?;

        if self.file.is_none() {
            self.file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        match &mut self.file {
            Some(file) => file.write(buf),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "log file unavailable")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}
