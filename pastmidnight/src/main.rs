use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Timelike;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use pastmidnight_core::{
    DisplayApplier, HardwareConfig, Plugin, SettingsField, SettingsRecord, SettingsStore,
    SystemRunner,
};

#[derive(Parser)]
#[command(version, about = "Night mode for handheld Linux displays", long_about = None)]
struct Args {
    /// Settings file to use instead of the host or home location
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host start hook: re-apply night mode if it was left on
    Init,
    /// Host unload hook: restore full brightness and neutral colors
    Unload,
    /// Print the stored settings as JSON
    Show,
    /// Apply the stored settings now
    Apply,
    /// Change one setting, saving it and re-applying when it affects the display
    Set {
        /// enabled, brightness, blue-light, auto-enable, start-time or end-time
        field: SettingsField,
        /// New value (true/false for switches, a number otherwise)
        value: String,
    },
    /// Restore full brightness and neutral colors without touching the settings
    Reset,
    /// Apply the stored settings for the night window at the given hour
    Auto {
        /// Hour of day (0-23), defaults to the current local hour
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..24))]
        hour: Option<u8>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.log_file.as_deref());

    let plugin = match args.settings {
        Some(path) => Plugin::new(
            SettingsStore::with_path(path),
            DisplayApplier::new(HardwareConfig::from_env()),
        ),
        None => Plugin::from_env(),
    };

    if run(&plugin, args.command) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(plugin: &Plugin<SystemRunner>, command: Command) -> bool {
    match command {
        Command::Init => {
            plugin.on_load();
            true
        }
        Command::Unload => {
            plugin.on_unload();
            true
        }
        Command::Show => match serde_json::to_string_pretty(&plugin.get_settings()) {
            Ok(json) => {
                println!("{}", json);
                true
            }
            Err(e) => {
                eprintln!("Cannot print settings: {}", e);
                false
            }
        },
        Command::Apply => plugin.apply_settings(&plugin.get_settings()),
        Command::Set { field, value } => match plugin.update_setting(field, &value) {
            Ok((settings, ok)) => {
                println!("{} = {}", field, field_value(&settings, field));
                ok
            }
            Err(e) => {
                eprintln!("{}", e);
                false
            }
        },
        Command::Reset => {
            plugin.applier().reset_display();
            true
        }
        Command::Auto { hour } => {
            let hour = hour.unwrap_or_else(|| chrono::Local::now().hour() as u8);
            plugin.apply_scheduled(hour)
        }
    }
}

fn field_value(settings: &SettingsRecord, field: SettingsField) -> String {
    match field {
        SettingsField::Enabled => settings.enabled.to_string(),
        SettingsField::Brightness => settings.brightness.to_string(),
        SettingsField::BlueLight => settings.blue_light.to_string(),
        SettingsField::AutoEnable => settings.auto_enable.to_string(),
        SettingsField::StartTime => settings.start_time.to_string(),
        SettingsField::EndTime => settings.end_time.to_string(),
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[PastMidnight] {} {} {}",
            buf.timestamp(),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
        }
    }

    builder.init();
}
