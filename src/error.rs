//! Error types for settings storage and display control.

use std::path::PathBuf;

/// Errors raised inside the settings store and display applier.
///
/// None of these escape the public operations: [`SettingsStore`](crate::SettingsStore)
/// and [`DisplayApplier`](crate::DisplayApplier) log them and fall back to a
/// safe default instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while touching the settings file or a backlight surface.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A settings value was outside its valid range.
    #[error("Invalid value {value} for {field} (expected 0-{max})")]
    InvalidValue {
        /// The persisted field name.
        field: &'static str,
        /// The value provided.
        value: u8,
        /// Maximum allowed value.
        max: u8,
    },

    /// No settings field has the given name.
    #[error("Unknown settings field '{0}'")]
    UnknownField(String),

    /// A textual value could not be parsed for the given field.
    #[error("Cannot parse '{value}' for {field}")]
    InvalidFieldValue {
        /// The persisted field name.
        field: &'static str,
        /// The raw text provided.
        value: String,
    },

    /// Neither the host settings directory nor a home directory is available.
    #[error("No settings location could be resolved")]
    NoSettingsPath,

    /// An external command ran but reported failure.
    #[error("{program} exited with status {status:?}: {stderr}")]
    CommandFailed {
        /// The program that was run.
        program: String,
        /// Its exit code, if it exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// An external command could not be started.
    #[error("Failed to launch {program}: {source}")]
    CommandLaunch {
        /// The program that was run.
        program: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// The backlight `max_brightness` surface did not hold a usable number.
    #[error("Invalid max brightness in {path}: '{raw}'")]
    InvalidMaxBrightness {
        /// The surface that was read.
        path: PathBuf,
        /// Its trimmed contents.
        raw: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
