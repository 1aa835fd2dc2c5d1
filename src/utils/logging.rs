//! Diagnostics and session transcript logging.
//!
//! Two separate concerns: `tracing` carries structured diagnostics
//! (enabled via `RUST_LOG`, written to a file so the TUI stays clean),
//! and [`TranscriptLog`] appends the visible conversation to a
//! user-chosen file, one message per paragraph.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Diagnostics go to
/// `atlas-chat.log` in the working directory when `RUST_LOG` selects
/// anything; without the env var this is a no-op filter.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::var("RUST_LOG").is_err() {
        return Ok(());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("atlas-chat.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

pub struct TranscriptLog {
    file_path: Option<String>,
    is_active: bool,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(path) = &log_file {
            test_file_access(path)?;
        }
        let is_active = log_file.is_some();
        Ok(TranscriptLog {
            file_path: log_file,
            is_active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new().create(true).append(true).open(file_path)?;
        let mut writer = BufWriter::new(file);
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between messages, matching the screen layout.
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path).file_name().unwrap_or_default().to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path).file_name().unwrap_or_default().to_string_lossy()
            ),
        }
    }
}

fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_log_is_a_no_op() {
        let log = TranscriptLog::new(None).expect("new");
        assert!(!log.is_active());
        assert!(log.log_message("anything").is_ok());
        assert_eq!(log.status_string(), "disabled");
    }

    #[test]
    fn active_log_appends_paragraphs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat.log");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned())).expect("new");

        log.log_message("You: hi").expect("write");
        log.log_message("hello there").expect("write");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "You: hi\n\nhello there\n\n");
        assert!(log.status_string().starts_with("active"));
    }
}
