use anyhow::Context;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::executor::BuildOutcome;
use crate::parser::entry::LogEntry;

/// Everything needed to diagnose a finished build after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub timestamp: DateTime<Local>,
    pub command: Vec<String>,
    pub outcome: Option<BuildOutcome>,
    pub entries: Vec<LogEntry>,
}

impl BuildReport {
    pub fn new(command: Vec<String>, outcome: Option<BuildOutcome>, entries: Vec<LogEntry>) -> Self {
        Self {
            timestamp: Local::now(),
            command,
            outcome,
            entries,
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create report directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize build report")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write build report: {}", path.display()))?;

        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build report: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse build report: {}", path.display()))
    }
}

/// Plain-text dump of the raw log lines, one per line.
pub fn write_log_text(path: &Path, entries: &[LogEntry]) -> anyhow::Result<()> {
    let content = entries
        .iter()
        .map(|e| e.raw_line.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    fs::write(path, content)
        .with_context(|| format!("Failed to write logs to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{BuildOutcome, OutcomeKind};
    use crate::parser::entry::LogLevel;

    #[test]
    fn test_report_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("build.json");

        let report = BuildReport::new(
            vec!["pyinstaller".into(), "app.py".into()],
            Some(BuildOutcome::exited(2)),
            vec![LogEntry::tagged(LogLevel::Error, "Build failed with return code 2")],
        );
        report.save(&path).unwrap();

        let loaded = BuildReport::load(&path).unwrap();
        assert_eq!(loaded.command, report.command);
        let outcome = loaded.outcome.unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Failed);
        assert_eq!(outcome.exit_code, Some(2));
        assert_eq!(loaded.entries[0].raw_line, "[ERROR] Build failed with return code 2");
    }

    #[test]
    fn test_write_log_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.log");
        let entries = vec![
            LogEntry::tagged(LogLevel::Info, "Starting"),
            LogEntry::tagged(LogLevel::Success, "Done"),
        ];

        write_log_text(&path, &entries).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[INFO] Starting\n[SUCCESS] Done"
        );
    }
}
