use chrono::{SecondsFormat, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Append-only operator log, separate from diagnostics.
pub trait AuditLog: Send + Sync {
    fn append(&self, message: &str);
}

/// Writes `[2025-08-01T00:20:00.000Z] message` lines to a text file.
///
/// Lines are handed to a background writer thread, one message per line,
/// so callers never block on file I/O. Dropping the log flushes it.
pub struct FileAuditLog {
    path: PathBuf,
    writer: NonBlocking,
    _guard: WorkerGuard,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| io::Error::other(format!("no file name in {}", path.display())))?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)
            .map_err(io::Error::other)?;
        // lossless: audit lines wait for buffer space instead of being dropped
        let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(appender);

        Ok(Self {
            path,
            writer,
            _guard: guard,
        })
    }
}

pub fn format_line(message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("[{timestamp}] {message}\n")
}

impl AuditLog for FileAuditLog {
    fn append(&self, message: &str) {
        // audit failures must never abort a sync
        let mut writer = self.writer.clone();
        if let Err(e) = writer.write_all(format_line(message).as_bytes()) {
            warn!(error = %e, path = %self.path.display(), "Could not write audit log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload_log.txt");
        let log = FileAuditLog::new(&path).unwrap();

        log.append("Server started");
        log.append("Sync successful after 1 attempt(s)");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Server started"));
        assert!(lines[1].ends_with("] Sync successful after 1 attempt(s)"));
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("upload_log.txt");

        for message in ["first run", "second run"] {
            let log = FileAuditLog::new(&path).unwrap();
            log.append(message);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first run"));
        assert!(lines[1].ends_with("] second run"));
    }

    #[test]
    fn timestamp_is_iso_utc_with_millis() {
        let line = format_line("x");
        let ts = &line[1..line.find(']').unwrap()];
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(ts.len(), "2025-08-01T00:20:00.000Z".len());
    }
}
