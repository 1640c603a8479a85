//! Reading the attendance log CSV.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{Error, attendance::RecognitionStatus, timestamp::parse_timestamp};

/// One parsed row of the attendance log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// The student's ID as written in the log.
    pub student_id: String,
    /// The student's display name.
    pub student_name: String,
    /// When the attempt happened.
    pub timestamp: OffsetDateTime,
    /// Whether the attempt matched the student.
    pub status: RecognitionStatus,
}

#[derive(Debug, Deserialize)]
struct LogRow {
    student_id: String,
    student_name: String,
    timestamp: String,
    status: String,
}

/// The attendance log CSV on disk.
///
/// The file is read on every request so that a refresh, or a recognition
/// service appending to the log, is visible without restarting the server.
#[derive(Debug, Clone)]
pub struct AttendanceLog {
    path: PathBuf,
}

impl AttendanceLog {
    /// Create a log backed by the CSV file at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid entry from the log.
    ///
    /// A missing or unreadable file is an empty log.
    pub async fn read(&self) -> Vec<LogEntry> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!("attendance log {} does not exist yet", self.path.display());
                return Vec::new();
            }
            Err(error) => {
                tracing::error!(
                    "could not read attendance log {}: {error}",
                    self.path.display()
                );
                return Vec::new();
            }
        };

        parse_log(&text)
            .inspect_err(|error| tracing::error!("{error}"))
            .unwrap_or_default()
    }

    /// Overwrite the log with `contents`, creating its directory if needed.
    ///
    /// # Errors
    /// Returns [Error::LogDownload] if `contents` is not an attendance log or
    /// the file could not be written.
    pub async fn replace(&self, contents: &[u8]) -> Result<(), Error> {
        let text = std::str::from_utf8(contents)
            .map_err(|error| Error::LogDownload(format!("log is not valid UTF-8: {error}")))?;
        parse_log(text).map_err(|error| Error::LogDownload(error.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                Error::LogDownload(format!("could not create {}: {error}", parent.display()))
            })?;
        }

        tokio::fs::write(&self.path, contents).await.map_err(|error| {
            Error::LogDownload(format!("could not write {}: {error}", self.path.display()))
        })
    }
}

/// Parse the text of an attendance log.
///
/// Rows that are malformed, or whose timestamp or status cannot be parsed, are
/// skipped with a warning.
///
/// # Errors
/// Returns [Error::InvalidCSV] if the header is missing one of the
/// `student_id`, `student_name`, `timestamp` and `status` columns.
pub fn parse_log(text: &str) -> Result<Vec<LogEntry>, Error> {
    const COLUMNS: [&str; 4] = ["student_id", "student_name", "timestamp", "status"];

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;

    // An empty file has no header and holds no entries.
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(missing) = COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(Error::InvalidCSV(format!("missing column \"{missing}\"")));
    }

    let mut entries = Vec::new();

    for (index, row) in reader.deserialize::<LogRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;

        let row = match row {
            Ok(row) => row,
            Err(error) => {
                tracing::warn!("skipping malformed attendance log line {line}: {error}");
                continue;
            }
        };

        let Some(timestamp) = parse_timestamp(&row.timestamp) else {
            tracing::warn!(
                "skipping attendance log line {line}: invalid timestamp \"{}\"",
                row.timestamp
            );
            continue;
        };

        let Ok(status) = row.status.parse::<f64>() else {
            tracing::warn!(
                "skipping attendance log line {line}: invalid status \"{}\"",
                row.status
            );
            continue;
        };

        entries.push(LogEntry {
            student_id: row.student_id,
            student_name: row.student_name,
            timestamp,
            status: if status == 1.0 {
                RecognitionStatus::Success
            } else {
                RecognitionStatus::Failed
            },
        });
    }

    Ok(entries)
}
