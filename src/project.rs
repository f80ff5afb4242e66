use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{fix::FixOptions, logging::LogLevel};

/// Persisted fix settings used by CLI workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixSettings {
    pub options: FixOptions,
    pub log_level: String,
    /// Write a `<output>.report.json` next to the fixed scene.
    pub write_report: bool,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            options: FixOptions::default(),
            log_level: LogLevel::Info.as_str().to_string(),
            write_report: true,
        }
    }
}

impl FixSettings {
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level)
    }
}

/// Save fix settings to a JSON file.
pub fn save_fix_settings(path: &Path, settings: &FixSettings) -> Result<()> {
    let content =
        serde_json::to_string_pretty(settings).context("failed to serialize fix settings as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save fix settings: {}", path.display()))?;
    Ok(())
}

/// Load fix settings from a JSON file.
pub fn load_fix_settings(path: &Path) -> Result<FixSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load fix settings: {}", path.display()))?;
    let settings: FixSettings =
        serde_json::from_str(&content).context("failed to parse fix settings JSON")?;
    Ok(settings)
}
