use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "sound-settings.json";

/// Playback toggles shared by the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundSettings {
    /// Background music is played.
    pub play_background_music: bool,
    /// Ambient and weather sounds are played.
    pub play_background_sounds: bool,
    /// Sound effects are played.
    pub play_sound_effects: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            play_background_music: true,
            play_background_sounds: true,
            play_sound_effects: true,
        }
    }
}

/// Persistence for [`SoundSettings`].
pub trait SettingsStore {
    /// Load the stored settings, or defaults when nothing was saved yet.
    fn load(&self) -> Result<SoundSettings>;
    fn save(&self, settings: &SoundSettings) -> Result<()>;
}

/// Settings stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store in the per-user config directory.
    pub fn default_location() -> Self {
        Self::new(Self::settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn settings_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "sound-manager", "sound-manager") {
            proj_dirs.config_dir().join(SETTINGS_FILE)
        } else {
            PathBuf::from(format!(".{SETTINGS_FILE}"))
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<SoundSettings> {
        if !self.path.exists() {
            return Ok(SoundSettings::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file {}", self.path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", self.path.display()))?;
        Ok(settings)
    }

    fn save(&self, settings: &SoundSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store. Clones share the same saved value.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    saved: Arc<Mutex<Option<SoundSettings>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `settings`.
    pub fn with_settings(settings: SoundSettings) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(settings))),
        }
    }

    /// The last saved value, if any.
    pub fn saved(&self) -> Option<SoundSettings> {
        *self.saved.lock()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<SoundSettings> {
        Ok((*self.saved.lock()).unwrap_or_default())
    }

    fn save(&self, settings: &SoundSettings) -> Result<()> {
        *self.saved.lock() = Some(*settings);
        Ok(())
    }
}
