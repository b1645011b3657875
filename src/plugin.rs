//! Host lifecycle hooks and the settings call surface.

use crate::applier::DisplayApplier;
use crate::config::HardwareConfig;
use crate::error::Result;
use crate::runner::{CommandRunner, SystemRunner};
use crate::schedule::scheduled_record;
use crate::settings::{SettingsField, SettingsRecord, SettingsStore};

use log::{info, warn};

/// Night mode plugin: a settings store paired with a display applier.
///
/// A host calls [`Plugin::on_load`] once at startup and [`Plugin::on_unload`]
/// before going away; everything in between goes through the settings
/// methods.
pub struct Plugin<R = SystemRunner> {
    store: SettingsStore,
    applier: DisplayApplier<R>,
}

impl Plugin<SystemRunner> {
    /// A plugin using the environment-resolved store and hardware locations.
    pub fn from_env() -> Self {
        Self::new(
            SettingsStore::new(),
            DisplayApplier::new(HardwareConfig::from_env()),
        )
    }
}

impl<R: CommandRunner> Plugin<R> {
    /// Pair a store with an applier.
    pub fn new(store: SettingsStore, applier: DisplayApplier<R>) -> Self {
        Self { store, applier }
    }

    /// The settings store.
    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// The display applier.
    pub fn applier(&self) -> &DisplayApplier<R> {
        &self.applier
    }

    /// Initialization hook: restore night mode if it was left on.
    pub fn on_load(&self) {
        info!("PastMidnight plugin started");
        let settings = self.store.load();
        if settings.enabled {
            self.applier.apply(&settings);
        }
    }

    /// Unload hook: put the display back to normal.
    pub fn on_unload(&self) {
        info!("PastMidnight plugin unloading, resetting display");
        self.applier.reset_display();
    }

    /// Current settings, or defaults.
    pub fn get_settings(&self) -> SettingsRecord {
        self.store.load()
    }

    /// Persist `settings` without touching the display.
    pub fn save_settings(&self, settings: &SettingsRecord) -> bool {
        self.store.save(settings)
    }

    /// Apply `settings` without persisting them.
    pub fn apply_settings(&self, settings: &SettingsRecord) -> bool {
        self.applier.apply(settings)
    }

    /// Change one field of the stored settings.
    ///
    /// The new record is saved, then applied when the field changes what is
    /// on screen. Returns the updated record and whether both steps
    /// succeeded.
    ///
    /// # Errors
    /// Returns an error, leaving storage untouched, if `value` does not parse
    /// or is out of range for `field`.
    pub fn update_setting(
        &self,
        field: SettingsField,
        value: &str,
    ) -> Result<(SettingsRecord, bool)> {
        let mut settings = self.store.load();
        settings.set(field, value)?;

        let mut ok = self.store.save(&settings);
        if field.affects_display() {
            ok &= self.applier.apply(&settings);
        }
        Ok((settings, ok))
    }

    /// Apply the stored settings as they should look at `hour` (0-23).
    ///
    /// With auto-enable on, night mode follows the night window; the stored
    /// record itself is not rewritten.
    pub fn apply_scheduled(&self, hour: u8) -> bool {
        if hour > 23 {
            warn!("ignoring scheduled apply for invalid hour {}", hour);
            return false;
        }
        let stored = self.store.load();
        let effective = scheduled_record(&stored, hour);
        if stored.auto_enable {
            info!(
                "hour {} is {} the night window ({}-{})",
                hour,
                if effective.enabled { "inside" } else { "outside" },
                stored.start_time,
                stored.end_time
            );
        }
        self.applier.apply(&effective)
    }
}
