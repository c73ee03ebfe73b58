//! Append-only job log files

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// `dd/mm/YYYY-HH:MM:SS`, used by the heartbeat
pub const HEARTBEAT_FORMAT: &str = "%d/%m/%Y-%H:%M:%S";

/// `YYYY-mm-dd HH:MM:SS`, used by reminders and reports
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-mm-dd HH:MM:SS.ffffff`, used by the low-stock section header
pub const PRECISE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Local wall-clock time in the given format
pub fn timestamp(format: &str) -> String {
    Local::now().format(format).to_string()
}

/// A plain-text log file that is only ever appended to
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` in one write, creating parent directories first.
    pub async fn append(&self, text: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await
    }

    /// Append each line followed by a newline
    pub async fn append_lines<I, S>(&self, lines: I) -> std::io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        self.append(&text).await
    }
}
