use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

pub const DEFAULT_TAIL: usize = 50;

/// Appends one visit line. Failures are logged and never returned, so a
/// broken log file cannot block a lookup.
pub fn record(path: &Path, session: Uuid, action: &str) {
    if let Err(err) = append(path, Local::now().naive_local(), session, action) {
        tracing::warn!(path = %path.display(), error = %err, "could not write visitor log");
    }
}

pub fn append(
    path: &Path,
    at: NaiveDateTime,
    session: Uuid,
    action: &str,
) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", format_line(at, session, action))
}

pub fn format_line(at: NaiveDateTime, session: Uuid, action: &str) -> String {
    // Keep each visit on one line.
    let action = action.replace(['\n', '\r'], " ");
    format!(
        "{} - Session: {session} - Page: {action}",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Last `lines` entries, oldest first. A log that does not exist yet is empty.
pub fn tail(path: &Path, lines: usize) -> std::io::Result<Vec<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let all: Vec<&str> = content.lines().filter(|line| !line.is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].iter().map(|line| line.to_string()).collect())
}
