//! Pushing night mode settings to the display.

use crate::config::HardwareConfig;
use crate::error::{Error, Result};
use crate::runner::{CommandRunner, SystemRunner};
use crate::settings::SettingsRecord;
use crate::state::{BrightnessOutcome, DisplayState};

use log::{debug, error, info, warn};
use std::fs;
use std::sync::{Mutex, PoisonError};

/// Color temperature with no filtering applied.
pub const NEUTRAL_TEMPERATURE: u32 = 6500;
/// Color temperature at full blue light filtering.
pub const MIN_TEMPERATURE: u32 = 3400;

const FULL_BRIGHTNESS: u8 = 100;

/// Applies a [`SettingsRecord`] to the display.
///
/// Brightness goes through the backlight surfaces first and falls back to
/// `xrandr`; color temperature goes through the gamescope tool. No failure
/// is ever returned from these methods, it is logged and the display is
/// left in its previous or neutral state.
///
/// # Example
///
/// ```
/// use pastmidnight_core::{DisplayApplier, HardwareConfig, MockRunner, SettingsRecord};
///
/// let config = HardwareConfig::default().with_backlight_dir("/nonexistent");
/// let applier = DisplayApplier::with_runner(config, MockRunner::new());
///
/// let record = SettingsRecord { enabled: true, brightness: 30, ..Default::default() };
/// assert!(applier.apply(&record));
/// assert_eq!(applier.state().brightness, Some(70));
/// assert_eq!(applier.state().temperature, Some(6500));
/// ```
pub struct DisplayApplier<R = SystemRunner> {
    config: HardwareConfig,
    runner: R,
    state: Mutex<DisplayState>,
}

impl DisplayApplier<SystemRunner> {
    /// Create an applier that runs the real tools.
    pub fn new(config: HardwareConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> DisplayApplier<R> {
    /// Create an applier with a custom command runner.
    pub fn with_runner(config: HardwareConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            state: Mutex::new(DisplayState::default()),
        }
    }

    /// The hardware locations in use.
    pub fn config(&self) -> &HardwareConfig {
        &self.config
    }

    /// The command runner in use.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Get a snapshot of what was last pushed to the display.
    pub fn state(&self) -> DisplayState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_state(&self, f: impl FnOnce(&mut DisplayState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *state);
    }

    /// Make the display reflect `record`.
    ///
    /// A disabled record resets the display and returns `true` whatever its
    /// other fields hold. An enabled record dims to `100 - brightness`
    /// percent and either filters blue light or resets the color
    /// temperature. Returns `false` only if the record itself is unusable.
    pub fn apply(&self, record: &SettingsRecord) -> bool {
        if !record.enabled {
            info!("night mode disabled, resetting display");
            self.reset_display();
            return true;
        }

        if let Err(e) = record.validate() {
            error!("error applying settings: {}", e);
            return false;
        }

        info!(
            "applying settings: brightness reduction {}%, blue light {}%",
            record.brightness, record.blue_light
        );

        let actual_brightness = FULL_BRIGHTNESS - record.brightness;
        self.set_brightness(actual_brightness);

        if record.blue_light > 0 {
            self.set_color_temperature(record.blue_light);
        } else {
            self.reset_color_temperature();
        }

        true
    }

    /// Set display brightness to `percent` (0-100) using the first method that works.
    pub fn set_brightness(&self, percent: u8) -> BrightnessOutcome {
        let percent = percent.min(FULL_BRIGHTNESS);

        let outcome = match self.set_backlight(percent) {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => {
                debug!(
                    "no backlight surfaces in {}",
                    self.config.backlight_dir.display()
                );
                None
            }
            Err(e) => {
                warn!("direct backlight control failed: {}", e);
                None
            }
        };

        let outcome = outcome.or_else(|| match self.set_windowed_brightness(percent) {
            Ok(()) => {
                info!("set brightness via {} to {}%", self.config.xrandr, percent);
                Some(BrightnessOutcome::Windowed)
            }
            Err(e) => {
                debug!("windowed brightness failed: {}", e);
                None
            }
        });

        match outcome {
            Some(outcome) => {
                self.update_state(|state| {
                    state.brightness = Some(percent);
                    state.brightness_method = Some(outcome);
                });
                outcome
            }
            None => {
                warn!("could not set brightness - no method available");
                BrightnessOutcome::Unchanged
            }
        }
    }

    fn set_backlight(&self, percent: u8) -> Result<Option<BrightnessOutcome>> {
        let brightness_path = self.config.brightness_path();
        let max_path = self.config.max_brightness_path();
        if !brightness_path.exists() || !max_path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&max_path)?;
        let max: u32 = raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidMaxBrightness {
                path: max_path.clone(),
                raw: raw.trim().to_string(),
            })?;

        let target = backlight_target(percent, max);
        fs::write(&brightness_path, target.to_string())?;

        info!("set brightness to {}% ({}/{})", percent, target, max);
        Ok(Some(BrightnessOutcome::Backlight { target, max }))
    }

    fn set_windowed_brightness(&self, percent: u8) -> Result<()> {
        let args = vec![
            "--output".to_string(),
            self.config.output.clone(),
            "--brightness".to_string(),
            format!("{:.2}", f64::from(percent) / 100.0),
        ];
        self.runner
            .run(&self.config.xrandr, &args)?
            .check(&self.config.xrandr)?;
        Ok(())
    }

    /// Filter blue light at `intensity` percent (0-100).
    ///
    /// Returns whether the color temperature tool accepted the value.
    pub fn set_color_temperature(&self, intensity: u8) -> bool {
        self.push_temperature(color_temperature_for(intensity))
    }

    /// Return the color temperature to neutral.
    pub fn reset_color_temperature(&self) -> bool {
        self.push_temperature(NEUTRAL_TEMPERATURE)
    }

    fn push_temperature(&self, temperature: u32) -> bool {
        let program = &self.config.color_temp_tool;
        let result = self
            .runner
            .run(program, &[temperature.to_string()])
            .and_then(|output| output.check(program));

        match result {
            Ok(_) => {
                info!("set color temperature to {}K", temperature);
                self.update_state(|state| state.temperature = Some(temperature));
                true
            }
            Err(e) => {
                error!("error setting color temperature to {}K: {}", temperature, e);
                false
            }
        }
    }

    /// Full brightness and neutral color temperature, regardless of settings.
    pub fn reset_display(&self) {
        self.set_brightness(FULL_BRIGHTNESS);
        self.reset_color_temperature();
    }
}

/// Raw backlight value for `percent` of `max`, rounded to nearest.
pub fn backlight_target(percent: u8, max: u32) -> u32 {
    let percent = percent.min(FULL_BRIGHTNESS);
    (f64::from(percent) / 100.0 * f64::from(max)).round() as u32
}

/// Color temperature in Kelvin for a blue light intensity (0-100).
///
/// Linear from [`NEUTRAL_TEMPERATURE`] at 0 to [`MIN_TEMPERATURE`] at 100.
pub fn color_temperature_for(intensity: u8) -> u32 {
    let intensity = f64::from(intensity.min(100));
    let span = f64::from(NEUTRAL_TEMPERATURE - MIN_TEMPERATURE);
    (f64::from(NEUTRAL_TEMPERATURE) - span * intensity / 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use std::path::Path;
    use tempfile::TempDir;

    const TOOL: &str = "gamescope-color-temp";

    fn backlight_dir(max: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("max_brightness"), max).unwrap();
        fs::write(dir.path().join("brightness"), "0").unwrap();
        dir
    }

    fn applier_for(dir: &Path) -> DisplayApplier<MockRunner> {
        DisplayApplier::with_runner(
            HardwareConfig::default().with_backlight_dir(dir),
            MockRunner::new(),
        )
    }

    fn written_brightness(dir: &TempDir) -> u32 {
        fs::read_to_string(dir.path().join("brightness"))
            .unwrap()
            .trim()
            .parse()
            .unwrap()
    }

    fn temperatures(applier: &DisplayApplier<MockRunner>) -> Vec<String> {
        applier
            .runner()
            .calls_to(TOOL)
            .into_iter()
            .map(|args| args.join(" "))
            .collect()
    }

    #[test]
    fn test_color_temperature_mapping() {
        assert_eq!(color_temperature_for(0), 6500);
        assert_eq!(color_temperature_for(50), 4950);
        assert_eq!(color_temperature_for(100), 3400);
        assert_eq!(color_temperature_for(33), 5477);
        assert_eq!(color_temperature_for(250), 3400);
    }

    #[test]
    fn test_backlight_target_rounds() {
        assert_eq!(backlight_target(100, 3200), 3200);
        assert_eq!(backlight_target(70, 3200), 2240);
        assert_eq!(backlight_target(0, 3200), 0);
        assert_eq!(backlight_target(33, 255), 84);
    }

    #[test]
    fn test_disabled_resets_display() {
        let dir = backlight_dir("3200\n");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: false,
            brightness: 90,
            blue_light: 100,
            ..Default::default()
        };

        assert!(applier.apply(&record));
        assert_eq!(written_brightness(&dir), 3200);
        assert_eq!(temperatures(&applier), vec!["6500"]);
        assert_eq!(applier.state().brightness, Some(100));
        assert_eq!(applier.state().temperature, Some(NEUTRAL_TEMPERATURE));
    }

    #[test]
    fn test_disabled_ignores_invalid_fields() {
        let dir = backlight_dir("100");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: false,
            brightness: 200,
            ..Default::default()
        };
        assert!(applier.apply(&record));
        assert_eq!(written_brightness(&dir), 100);
    }

    #[test]
    fn test_brightness_reduction_without_filter() {
        let dir = backlight_dir("3200");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: true,
            brightness: 30,
            blue_light: 0,
            ..Default::default()
        };

        assert!(applier.apply(&record));
        assert_eq!(written_brightness(&dir), 2240);
        assert_eq!(temperatures(&applier), vec!["6500"]);
        assert_eq!(
            applier.state().brightness_method,
            Some(BrightnessOutcome::Backlight {
                target: 2240,
                max: 3200
            })
        );
    }

    #[test]
    fn test_full_filter_no_reduction() {
        let dir = backlight_dir("3200");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: true,
            brightness: 0,
            blue_light: 100,
            ..Default::default()
        };

        assert!(applier.apply(&record));
        assert_eq!(written_brightness(&dir), 3200);
        assert_eq!(temperatures(&applier), vec!["3400"]);
        assert_eq!(applier.state().brightness, Some(100));
    }

    #[test]
    fn test_half_and_half() {
        let dir = backlight_dir("3200");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: true,
            brightness: 50,
            blue_light: 50,
            ..Default::default()
        };

        assert!(applier.apply(&record));
        assert_eq!(written_brightness(&dir), 1600);
        assert_eq!(temperatures(&applier), vec!["4950"]);
    }

    #[test]
    fn test_missing_backlight_falls_back_to_xrandr() {
        let dir = TempDir::new().unwrap();
        let applier = applier_for(&dir.path().join("absent"));

        assert_eq!(applier.set_brightness(70), BrightnessOutcome::Windowed);
        assert_eq!(
            applier.runner().calls_to("xrandr"),
            vec![vec!["--output", "eDP", "--brightness", "0.70"]]
        );
        assert_eq!(applier.state().brightness, Some(70));
    }

    #[test]
    fn test_half_backlight_surfaces_falls_back_to_xrandr() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("brightness"), "5").unwrap();
        let applier = applier_for(dir.path());

        assert_eq!(applier.set_brightness(40), BrightnessOutcome::Windowed);
        assert_eq!(applier.runner().calls_to("xrandr").len(), 1);
    }

    #[test]
    fn test_no_brightness_method_leaves_brightness_unchanged() {
        let dir = TempDir::new().unwrap();
        let applier = applier_for(&dir.path().join("absent"));
        applier.runner().fail_with("xrandr", 1);

        assert_eq!(applier.set_brightness(50), BrightnessOutcome::Unchanged);
        assert_eq!(applier.runner().calls_to("xrandr").len(), 1);
        assert_eq!(applier.state().brightness, None);
    }

    #[test]
    fn test_xrandr_not_installed_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let applier = applier_for(&dir.path().join("absent"));
        applier.runner().missing("xrandr");
        applier.runner().missing(TOOL);

        let record = SettingsRecord {
            enabled: true,
            blue_light: 40,
            ..Default::default()
        };
        assert!(applier.apply(&record));
        assert_eq!(applier.state(), DisplayState::default());
    }

    #[test]
    fn test_garbage_max_brightness_falls_back_to_xrandr() {
        let dir = backlight_dir("not a number");
        let applier = applier_for(dir.path());

        assert_eq!(applier.set_brightness(100), BrightnessOutcome::Windowed);
        assert_eq!(written_brightness(&dir), 0);
        assert_eq!(
            applier.runner().calls_to("xrandr"),
            vec![vec!["--output", "eDP", "--brightness", "1.00"]]
        );
    }

    #[test]
    fn test_color_temperature_failure_is_swallowed() {
        let dir = backlight_dir("3200");
        let applier = applier_for(dir.path());
        applier.runner().fail_with(TOOL, 2);

        assert!(!applier.set_color_temperature(50));
        assert!(!applier.reset_color_temperature());
        assert_eq!(applier.state().temperature, None);

        let record = SettingsRecord {
            enabled: true,
            blue_light: 50,
            ..Default::default()
        };
        assert!(applier.apply(&record));
    }

    #[test]
    fn test_enabled_invalid_record_fails() {
        let dir = backlight_dir("3200");
        let applier = applier_for(dir.path());
        let record = SettingsRecord {
            enabled: true,
            blue_light: 120,
            ..Default::default()
        };

        assert!(!applier.apply(&record));
        assert!(applier.runner().invocations().is_empty());
        assert_eq!(written_brightness(&dir), 0);
    }

    #[test]
    fn test_custom_tools() {
        let dir = TempDir::new().unwrap();
        let config = HardwareConfig {
            output: "HDMI-1".to_string(),
            xrandr: "/usr/bin/xrandr".to_string(),
            color_temp_tool: "wlsunset-once".to_string(),
            ..HardwareConfig::default().with_backlight_dir(dir.path().join("absent"))
        };
        let applier = DisplayApplier::with_runner(config, MockRunner::new());

        applier.reset_display();
        let calls = applier.runner().invocations();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "/usr/bin/xrandr");
        assert_eq!(calls[0].args[1], "HDMI-1");
        assert_eq!(calls[1].program, "wlsunset-once");
        assert_eq!(calls[1].args, vec!["6500"]);
    }
}
