//! The auto-enable night window.

use crate::settings::SettingsRecord;

/// Hours during which night mode should be on, as `[start, end)`.
///
/// A window whose end is before its start wraps past midnight. A window
/// whose start equals its end is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    /// First hour inside the window.
    pub start: u8,
    /// First hour after the window.
    pub end: u8,
}

impl NightWindow {
    /// Create a window from start and end hours.
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// The window stored in a settings record.
    pub fn from_record(record: &SettingsRecord) -> Self {
        Self::new(record.start_time, record.end_time)
    }

    /// Whether `hour` (0-23) falls inside the window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start < self.end {
            (self.start..self.end).contains(&hour)
        } else if self.start > self.end {
            hour >= self.start || hour < self.end
        } else {
            false
        }
    }
}

/// The record that should be applied at `hour`.
///
/// With auto-enable off this is `record` unchanged; otherwise `enabled`
/// follows the night window.
pub fn scheduled_record(record: &SettingsRecord, hour: u8) -> SettingsRecord {
    if !record.auto_enable {
        return *record;
    }
    SettingsRecord {
        enabled: NightWindow::from_record(record).contains(hour),
        ..*record
    }
}
