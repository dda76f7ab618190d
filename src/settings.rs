use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    audio::{default_catalog, validate_catalog, SoundTrack, DEFAULT_VOLUME},
    log_info, log_warn,
};

const ENABLE_LOGS: bool = true;

pub const SETTINGS_ENV: &str = "FOCUSLOOP_SETTINGS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub volume: f32,
    pub tracks: Vec<SoundTrack>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            tracks: default_catalog(),
        }
    }
}

/// Settings read once at startup. Only the volume is ever written back, and
/// never over a file that failed to parse.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: Some(path),
                data: UserSettings::default(),
            });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        match serde_json::from_str(&contents) {
            Ok(data) => {
                log_info!("Loaded settings from {}", path.display());
                Ok(Self {
                    path: Some(path),
                    data,
                })
            }
            Err(err) => {
                log_warn!(
                    "Ignoring malformed settings in {} (left untouched): {}",
                    path.display(),
                    err
                );
                Ok(Self::in_memory())
            }
        }
    }

    /// Defaults that are never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: UserSettings::default(),
        }
    }

    /// Uses the file named by `FOCUSLOOP_SETTINGS`, or in-memory defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::new(PathBuf::from(path)),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn volume(&self) -> f32 {
        self.data.volume
    }

    /// The sound catalog. Falls back to the built-in one when the configured
    /// catalog is empty or has ids that clash ignoring case.
    pub fn tracks(&self) -> Vec<SoundTrack> {
        if self.data.tracks.is_empty() {
            return default_catalog();
        }
        match validate_catalog(&self.data.tracks) {
            Ok(()) => self.data.tracks.clone(),
            Err(err) => {
                log_warn!("Using built-in sounds: {}", err);
                default_catalog()
            }
        }
    }

    pub fn update_volume(&mut self, volume: f32) -> Result<()> {
        self.data.volume = volume;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.volume(), 0.5);
        assert_eq!(store.tracks(), default_catalog());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"tracks":[{"id":"Fan","locator":"/tmp/fan.ogg","glyph":"wind"}]}"#,
        )
        .unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.volume(), 0.5);
        assert_eq!(store.tracks().len(), 1);
        assert_eq!(store.tracks()[0].id, "Fan");
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.volume(), 0.5);
    }

    #[test]
    fn test_malformed_file_survives_volume_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let original =
            r#"{"tracks":[{"id":"Fan","locator":"/tmp/fan.ogg","glyph":"wind"},]}"#;
        fs::write(&path, original).unwrap();

        let mut store = SettingsStore::new(path.clone()).unwrap();
        store.update_volume(0.6).unwrap();

        assert_eq!(store.volume(), 0.6);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_legacy_tick_interval_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"volume":0.4,"tickIntervalMs":1}"#).unwrap();

        let mut store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.volume(), 0.4);

        store.update_volume(0.7).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("tickIntervalMs"));
    }

    #[test]
    fn test_clashing_track_ids_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"tracks":[
                {"id":"Rain","locator":"synth:rain","glyph":"cloud"},
                {"id":"rain","locator":"synth:waves","glyph":"waves"}
            ]}"#,
        )
        .unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.tracks(), default_catalog());
    }

    #[test]
    fn test_update_volume_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::new(path.clone()).unwrap();
        store.update_volume(0.2).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.volume(), 0.2);
    }

    #[test]
    fn test_in_memory_never_writes() {
        let mut store = SettingsStore::in_memory();
        store.update_volume(0.9).unwrap();
        assert_eq!(store.volume(), 0.9);
    }

    #[test]
    fn test_empty_catalog_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"tracks":[]}"#).unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.tracks().len(), 3);
    }
}
