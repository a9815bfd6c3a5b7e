use clap::Subcommand;
use foco_core::{Action, AppConfig, Settings, SettingsPatch};

use super::{apply, open_controller, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    List,
    /// Get one setting
    Get {
        /// Setting key (e.g. "focus-time", "soundEnabled")
        key: String,
    },
    /// Change one setting
    Set {
        /// Setting key
        key: String,
        /// New value; minutes for durations, comma-separated for blocked sites
        value: String,
    },
    /// Restore the default settings
    Reset,
}

pub fn run(config: &AppConfig, action: SettingsAction) -> CmdResult {
    let mut controller = open_controller(config)?;

    match action {
        SettingsAction::List => {
            let json = serde_json::to_string_pretty(&controller.state().settings)?;
            println!("{json}");
        }
        SettingsAction::Get { key } => {
            println!("{}", controller.state().settings.get(&key)?);
        }
        SettingsAction::Set { key, value } => {
            let patch = SettingsPatch::from_key_value(&key, &value)?;
            apply(&mut controller, Action::UpdateSettings(patch))?;
            println!("ok");
        }
        SettingsAction::Reset => {
            let defaults = Settings::default();
            let patch = SettingsPatch {
                focus_time: Some(defaults.focus_time),
                short_break: Some(defaults.short_break),
                long_break: Some(defaults.long_break),
                sessions_until_long_break: Some(defaults.sessions_until_long_break),
                sound_enabled: Some(defaults.sound_enabled),
                blocked_sites: Some(defaults.blocked_sites),
            };
            apply(&mut controller, Action::UpdateSettings(patch))?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
