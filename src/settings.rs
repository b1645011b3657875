//! The persisted night mode settings record and its store.

use crate::error::{Error, Result};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the host-provided plugin settings directory.
pub const SETTINGS_DIR_ENV: &str = "DECKY_PLUGIN_SETTINGS_DIR";

/// File name of the settings record inside its directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const MAX_PERCENT: u8 = 100;
const MAX_HOUR: u8 = 23;

/// Night mode preferences.
///
/// Always fully populated: a record is either parsed whole from disk or
/// replaced by [`SettingsRecord::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Master switch for night mode.
    pub enabled: bool,
    /// Brightness *reduction* in percent (0-100). 30 means 70% brightness.
    pub brightness: u8,
    /// Blue light filter intensity in percent (0-100).
    pub blue_light: u8,
    /// Whether the night window should switch night mode automatically.
    pub auto_enable: bool,
    /// Hour (0-23) the night window opens.
    pub start_time: u8,
    /// Hour (0-23) the night window closes. May be earlier than `start_time`.
    pub end_time: u8,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            enabled: false,
            brightness: 50,
            blue_light: 0,
            auto_enable: false,
            start_time: 22,
            end_time: 6,
        }
    }
}

impl SettingsRecord {
    /// Check every field is within its documented range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidValue`] for the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        check_range(SettingsField::Brightness, self.brightness, MAX_PERCENT)?;
        check_range(SettingsField::BlueLight, self.blue_light, MAX_PERCENT)?;
        check_range(SettingsField::StartTime, self.start_time, MAX_HOUR)?;
        check_range(SettingsField::EndTime, self.end_time, MAX_HOUR)?;
        Ok(())
    }

    /// Set a single field from its textual form.
    ///
    /// Booleans accept `true`/`false`, `on`/`off`, `1`/`0`. The record is
    /// left untouched if parsing or validation fails.
    pub fn set(&mut self, field: SettingsField, value: &str) -> Result<()> {
        let mut updated = *self;
        match field {
            SettingsField::Enabled => updated.enabled = parse_bool(field, value)?,
            SettingsField::AutoEnable => updated.auto_enable = parse_bool(field, value)?,
            SettingsField::Brightness => updated.brightness = parse_u8(field, value)?,
            SettingsField::BlueLight => updated.blue_light = parse_u8(field, value)?,
            SettingsField::StartTime => updated.start_time = parse_u8(field, value)?,
            SettingsField::EndTime => updated.end_time = parse_u8(field, value)?,
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn check_range(field: SettingsField, value: u8, max: u8) -> Result<()> {
    if value > max {
        return Err(Error::InvalidValue {
            field: field.key(),
            value,
            max,
        });
    }
    Ok(())
}

fn parse_bool(field: SettingsField, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidFieldValue {
            field: field.key(),
            value: value.to_string(),
        }),
    }
}

fn parse_u8(field: SettingsField, value: &str) -> Result<u8> {
    value.trim().parse().map_err(|_| Error::InvalidFieldValue {
        field: field.key(),
        value: value.to_string(),
    })
}

/// One field of a [`SettingsRecord`], named by its persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    /// `enabled`
    Enabled,
    /// `brightness`
    Brightness,
    /// `blueLight`
    BlueLight,
    /// `autoEnable`
    AutoEnable,
    /// `startTime`
    StartTime,
    /// `endTime`
    EndTime,
}

impl SettingsField {
    /// All fields in persisted order.
    pub const ALL: [SettingsField; 6] = [
        SettingsField::Enabled,
        SettingsField::Brightness,
        SettingsField::BlueLight,
        SettingsField::AutoEnable,
        SettingsField::StartTime,
        SettingsField::EndTime,
    ];

    /// The key used in the settings file.
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::Enabled => "enabled",
            SettingsField::Brightness => "brightness",
            SettingsField::BlueLight => "blueLight",
            SettingsField::AutoEnable => "autoEnable",
            SettingsField::StartTime => "startTime",
            SettingsField::EndTime => "endTime",
        }
    }

    /// Whether changing this field changes what is shown on screen right now.
    pub fn affects_display(self) -> bool {
        matches!(
            self,
            SettingsField::Enabled | SettingsField::Brightness | SettingsField::BlueLight
        )
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingsField {
    type Err = Error;

    /// Accepts the persisted key, case-insensitively, with `-`/`_` ignored
    /// (so `blue-light` and `blue_light` both mean `blueLight`).
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.key().to_ascii_lowercase() == wanted)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

// =============================================================================
// SettingsStore
// =============================================================================

/// Durable storage for the [`SettingsRecord`].
///
/// By default the location is resolved on every call: the host settings
/// directory from [`SETTINGS_DIR_ENV`] if set, otherwise
/// `~/.config/pastmidnight/settings.json`.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// A store that resolves its location from the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pinned to an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// The settings file this store reads and writes.
    ///
    /// # Errors
    /// Returns [`Error::NoSettingsPath`] when nothing could be resolved.
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        resolve_settings_path(std::env::var_os(SETTINGS_DIR_ENV), dirs::home_dir())
            .ok_or(Error::NoSettingsPath)
    }

    /// Load the settings record, falling back to defaults.
    ///
    /// A missing file, an unreadable file, malformed JSON, a missing field or
    /// an out-of-range value all yield [`SettingsRecord::default`]. Nothing is
    /// merged from a partially valid file.
    pub fn load(&self) -> SettingsRecord {
        match self.try_load() {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("no settings file yet, using defaults");
                SettingsRecord::default()
            }
            Err(e) => {
                error!("error loading settings: {}", e);
                SettingsRecord::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<SettingsRecord>> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(None);
        }
        let record = read_record(&path)?;
        debug!("loaded settings from {}: {:?}", path.display(), record);
        Ok(Some(record))
    }

    /// Persist the settings record, replacing any previous content.
    ///
    /// Returns `false` (after logging) if the record is invalid or the file
    /// could not be written.
    pub fn save(&self, record: &SettingsRecord) -> bool {
        match self.try_save(record) {
            Ok(path) => {
                info!("settings saved to {}", path.display());
                true
            }
            Err(e) => {
                error!("error saving settings: {}", e);
                false
            }
        }
    }

    fn try_save(&self, record: &SettingsRecord) -> Result<PathBuf> {
        record.validate()?;
        let path = self.path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

fn read_record(path: &Path) -> Result<SettingsRecord> {
    let content = fs::read_to_string(path)?;
    let record: SettingsRecord = serde_json::from_str(&content)?;
    if let Err(e) = record.validate() {
        warn!("discarding settings from {}", path.display());
        return Err(e);
    }
    Ok(record)
}

/// Pick the settings file from the host directory or the home directory.
///
/// An empty host directory value counts as unset.
pub fn resolve_settings_path(
    host_dir: Option<OsString>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(dir) = host_dir.filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir).join(SETTINGS_FILE_NAME));
    }
    home_dir.map(|home| {
        home.join(".config")
            .join("pastmidnight")
            .join(SETTINGS_FILE_NAME)
    })
}
