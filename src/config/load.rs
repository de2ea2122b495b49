use crate::config::types::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_SETTINGS_FILE: &str = "settings.json";

impl Settings {
    /// Loads settings from `path`, or from `settings.json` in the working
    /// directory when no path is given. A missing default file falls back to
    /// the built-in defaults; an explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_file(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Self::read_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings from {}", path.display()))
    }
}
