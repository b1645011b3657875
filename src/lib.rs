//! Night mode settings and display control for handheld Linux devices.
//!
//! This crate stores a small set of night mode preferences and applies them
//! to the display: brightness through the backlight (or `xrandr` as a
//! fallback) and blue light filtering through `gamescope-color-temp`.
//!
//! # Requirements
//!
//! - Linux with a backlight device under `/sys/class/backlight`, or an X
//!   session with `xrandr`
//! - `gamescope-color-temp` for blue light filtering
//! - Write access to the backlight surface (the process must already hold it)
//!
//! # Example
//!
//! ```no_run
//! use pastmidnight_core::{DisplayApplier, HardwareConfig, SettingsStore};
//!
//! let store = SettingsStore::new();
//! let mut settings = store.load();
//!
//! settings.enabled = true;
//! settings.brightness = 30; // dim by 30%
//! settings.blue_light = 50; // 4950K
//!
//! if store.save(&settings) {
//!     let applier = DisplayApplier::new(HardwareConfig::from_env());
//!     applier.apply(&settings);
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockRunner`] to test code without touching the display:
//!
//! ```
//! use pastmidnight_core::{DisplayApplier, HardwareConfig, MockRunner};
//!
//! let config = HardwareConfig::default().with_backlight_dir("/nonexistent");
//! let applier = DisplayApplier::with_runner(config, MockRunner::new());
//! applier.reset_display();
//! assert_eq!(applier.runner().invocations().len(), 2);
//! ```
//!
//! # Failure handling
//!
//! Nothing here returns an error for a missing tool or a broken settings
//! file. Failures are logged through the [`log`] facade and the display or
//! settings fall back to a safe default.

#![warn(missing_docs)]

mod applier;
mod config;
mod error;
mod mock;
mod plugin;
mod runner;
mod schedule;
mod settings;
mod state;

// Re-export public API
pub use applier::{
    DisplayApplier, MIN_TEMPERATURE, NEUTRAL_TEMPERATURE, backlight_target, color_temperature_for,
};
pub use config::HardwareConfig;
pub use error::{Error, Result};
pub use mock::{Invocation, MockRunner};
pub use plugin::Plugin;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use schedule::{NightWindow, scheduled_record};
pub use settings::{
    SETTINGS_DIR_ENV, SETTINGS_FILE_NAME, SettingsField, SettingsRecord, SettingsStore,
    resolve_settings_path,
};
pub use state::{BrightnessOutcome, DisplayState};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plugin_in(dir: &TempDir) -> Plugin<MockRunner> {
        let config = HardwareConfig::default().with_backlight_dir(dir.path().join("backlight"));
        Plugin::new(
            SettingsStore::with_path(dir.path().join("config").join(SETTINGS_FILE_NAME)),
            DisplayApplier::with_runner(config, MockRunner::new()),
        )
    }

    #[test]
    fn test_load_apply_save_cycle() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("backlight")).unwrap();
        std::fs::write(dir.path().join("backlight/max_brightness"), "255\n").unwrap();
        std::fs::write(dir.path().join("backlight/brightness"), "255\n").unwrap();
        let plugin = plugin_in(&dir);

        let mut settings = plugin.get_settings();
        assert_eq!(settings, SettingsRecord::default());

        settings.enabled = true;
        settings.brightness = 40;
        settings.blue_light = 100;
        assert!(plugin.save_settings(&settings));
        assert!(plugin.apply_settings(&plugin.get_settings()));

        let written = std::fs::read_to_string(dir.path().join("backlight/brightness")).unwrap();
        assert_eq!(written.trim(), "153");
        assert_eq!(
            plugin.applier().state(),
            DisplayState {
                brightness: Some(60),
                brightness_method: Some(BrightnessOutcome::Backlight {
                    target: 153,
                    max: 255
                }),
                temperature: Some(MIN_TEMPERATURE),
            }
        );
        assert!(plugin.applier().runner().calls_to("xrandr").is_empty());

        plugin.on_unload();
        let written = std::fs::read_to_string(dir.path().join("backlight/brightness")).unwrap();
        assert_eq!(written.trim(), "255");
        assert_eq!(plugin.applier().state().temperature, Some(NEUTRAL_TEMPERATURE));
    }

    #[test]
    fn test_corrupt_settings_recover_on_next_save() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(&dir);
        let path = plugin.store().path().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert_eq!(plugin.get_settings(), SettingsRecord::default());

        let (settings, ok) = plugin
            .update_setting(SettingsField::BlueLight, "30")
            .unwrap();
        assert!(ok);
        assert_eq!(settings.blue_light, 30);
        assert_eq!(plugin.get_settings(), settings);
    }

    #[test]
    fn test_disabled_apply_never_filters() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(&dir);

        for blue_light in [0, 50, 100] {
            let settings = SettingsRecord {
                enabled: false,
                brightness: 80,
                blue_light,
                ..Default::default()
            };
            assert!(plugin.apply_settings(&settings));
            assert_eq!(plugin.applier().state().brightness, Some(100));
            assert_eq!(plugin.applier().state().temperature, Some(6500));
        }
    }
}
