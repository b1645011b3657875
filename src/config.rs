//! Where the display controls live on this machine.

use std::path::{Path, PathBuf};

/// Backlight device used on the Steam Deck.
pub const DEFAULT_BACKLIGHT_DIR: &str = "/sys/class/backlight/amdgpu_bl0";
/// Primary output name passed to `xrandr`.
pub const DEFAULT_OUTPUT: &str = "eDP";
/// Windowed-display brightness tool.
pub const DEFAULT_XRANDR: &str = "xrandr";
/// Color temperature tool shipped with gamescope.
pub const DEFAULT_COLOR_TEMP_TOOL: &str = "gamescope-color-temp";

const BACKLIGHT_DIR_ENV: &str = "PASTMIDNIGHT_BACKLIGHT_DIR";
const OUTPUT_ENV: &str = "PASTMIDNIGHT_OUTPUT";
const XRANDR_ENV: &str = "PASTMIDNIGHT_XRANDR";
const COLOR_TEMP_TOOL_ENV: &str = "PASTMIDNIGHT_COLOR_TEMP_TOOL";

/// Locations of the hardware control surfaces and external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareConfig {
    /// Directory holding the `brightness` and `max_brightness` surfaces.
    pub backlight_dir: PathBuf,
    /// Output `xrandr` should adjust.
    pub output: String,
    /// Program used for the windowed-display fallback.
    pub xrandr: String,
    /// Program taking a Kelvin value as its only argument.
    pub color_temp_tool: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backlight_dir: PathBuf::from(DEFAULT_BACKLIGHT_DIR),
            output: DEFAULT_OUTPUT.to_string(),
            xrandr: DEFAULT_XRANDR.to_string(),
            color_temp_tool: DEFAULT_COLOR_TEMP_TOOL.to_string(),
        }
    }
}

impl HardwareConfig {
    /// Defaults, overridden by any non-empty `PASTMIDNIGHT_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            backlight_dir: get(BACKLIGHT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.backlight_dir),
            output: get(OUTPUT_ENV).unwrap_or(defaults.output),
            xrandr: get(XRANDR_ENV).unwrap_or(defaults.xrandr),
            color_temp_tool: get(COLOR_TEMP_TOOL_ENV).unwrap_or(defaults.color_temp_tool),
        }
    }

    /// Use a different backlight device directory.
    pub fn with_backlight_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.backlight_dir = dir.as_ref().to_path_buf();
        self
    }

    /// The writable brightness surface.
    pub fn brightness_path(&self) -> PathBuf {
        self.backlight_dir.join("brightness")
    }

    /// The read-only maximum brightness surface.
    pub fn max_brightness_path(&self) -> PathBuf {
        self.backlight_dir.join("max_brightness")
    }
}
