//! Display state snapshot.

/// How brightness was last pushed to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessOutcome {
    /// Written straight to the backlight surface.
    Backlight {
        /// Raw value written to `brightness`.
        target: u32,
        /// Value read from `max_brightness`.
        max: u32,
    },
    /// Set through the windowed-display brightness command.
    Windowed,
    /// No method worked; brightness was left as it was.
    Unchanged,
}

/// A snapshot of what the applier last pushed to the display.
///
/// Fields stay `None` until a method succeeds for them.
/// Use [`DisplayApplier::state`](crate::DisplayApplier::state) to obtain a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Brightness percent (0-100) last applied.
    pub brightness: Option<u8>,
    /// Method used for the last applied brightness.
    pub brightness_method: Option<BrightnessOutcome>,
    /// Color temperature in Kelvin last applied.
    pub temperature: Option<u32>,
}
