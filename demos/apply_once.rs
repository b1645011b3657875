//! Example: Apply the stored night mode settings once.
//!
//! Run with: `cargo run --example apply_once`

use pastmidnight_core::{DisplayApplier, HardwareConfig, SettingsStore};

fn main() {
    // Initialize logging (optional)
    env_logger::init();

    let store = SettingsStore::new();
    match store.path() {
        Ok(path) => println!("Settings file: {}", path.display()),
        Err(e) => println!("No settings file: {}", e),
    }

    let settings = store.load();
    println!("Loaded: {:?}", settings);

    let applier = DisplayApplier::new(HardwareConfig::from_env());
    if applier.apply(&settings) {
        println!("Display state: {:?}", applier.state());
    } else {
        eprintln!("Settings could not be applied");
    }
}
