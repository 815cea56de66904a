use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::state::Settings;

const APP_DIR: &str = "listening-cue";
const SETTINGS_FILE: &str = "settings.json";

/// `<data dir>/listening-cue/settings.json`, when the platform has a data dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Load settings, falling back to defaults when the file is missing or bad.
pub fn load_settings(path: &Path) -> Settings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No stored settings at {}. Using defaults.", path.display());
            return Settings::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read settings from {}: {}. Using defaults.", path.display(), e);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

impl Settings {
    /// Settings from [`default_settings_path`], or defaults when there is no
    /// data dir or no usable file there.
    pub fn load_default() -> Self {
        match default_settings_path() {
            Some(path) => load_settings(&path),
            None => {
                tracing::warn!("No data directory on this platform. Using default settings.");
                Settings::default()
            }
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create settings directory")?;
    }
    let data = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = Settings {
            metadata_timeout_ms: 4_000,
            start_muted: true,
            ..Settings::default()
        };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn load_default_reads_the_default_path() {
        let expected = default_settings_path()
            .map(|path| load_settings(&path))
            .unwrap_or_default();
        assert_eq!(Settings::load_default(), expected);
    }

    #[test]
    fn default_path_ends_with_settings_file() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("listening-cue/settings.json"));
        }
    }
}
