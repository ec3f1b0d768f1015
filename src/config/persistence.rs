//! Preference file persistence for Quillpad
//!
//! Settings live in a single JSON file under the platform config directory.
//! Loading never fails hard: missing, empty or corrupted files fall back to
//! defaults. Saving writes a sibling temp file and renames it into place.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "quillpad";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Extension of the temporary file used during atomic writes
const PENDING_EXTENSION: &str = "json.tmp";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\quillpad\`
/// - **macOS**: `~/Library/Application Support/quillpad/`
/// - **Linux**: `~/.config/quillpad/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load / Save
// ─────────────────────────────────────────────────────────────────────────────

/// Read and sanitize settings from `path`.
///
/// A missing or blank file yields defaults; unreadable or invalid content is
/// an error.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!("Config file at {} contains invalid JSON: {}", path.display(), e);
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

/// Write `settings` to `path` as pretty JSON, atomically.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            debug!("Creating config directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
                path: dir.to_path_buf(),
                source: Box::new(e),
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let pending = path.with_extension(PENDING_EXTENSION);
    fs::write(&pending, &json).map_err(|e| Error::ConfigSave {
        path: pending.clone(),
        source: Box::new(e),
    })?;
    fs::rename(&pending, path).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    info!("Configuration saved to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Preference Store
// ─────────────────────────────────────────────────────────────────────────────

/// Settings bound to the file they are persisted in.
///
/// `get`/`set` address top-level settings fields by their JSON key.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    settings: Settings,
}

impl PreferenceStore {
    /// Open the store at `path`, loading whatever is there.
    ///
    /// Unreadable files are logged and replaced by defaults in memory; the
    /// file itself is left alone until the next `save`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings_from(&path)
            .unwrap_or_warn_default(Settings::default(), "Failed to load preferences");
        Self { path, settings }
    }

    /// Open the store at the platform config location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(get_config_file_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, replacing in-memory settings.
    pub fn load(&mut self) -> Result<()> {
        self.settings = load_settings_from(&self.path)?;
        Ok(())
    }

    /// Persist the current settings.
    pub fn save(&self) -> Result<()> {
        save_settings_to(&self.settings, &self.path)
    }

    /// Persist, logging instead of failing. Returns whether it worked.
    pub fn save_silent(&self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save configuration: {}", e);
                false
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Value of a top-level setting, or `None` for an unknown key.
    pub fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(&self.settings) {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    /// Replace a top-level setting.
    ///
    /// The value must deserialize into the field's type; the result is
    /// sanitized like a loaded file. Unknown keys are rejected.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut map = match serde_json::to_value(&self.settings)? {
            Value::Object(map) => map,
            _ => {
                return Err(Error::ConfigParse {
                    message: "settings did not serialize to an object".to_string(),
                    source: None,
                })
            }
        };
        if !map.contains_key(key) {
            return Err(Error::ConfigParse {
                message: format!("unknown preference '{}'", key),
                source: None,
            });
        }
        map.insert(key.to_string(), value);

        let mut updated: Settings = serde_json::from_value(Value::Object(map))?;
        updated.sanitize();
        debug!("Preference '{}' updated", key);
        self.settings = updated;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
