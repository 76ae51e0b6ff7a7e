//! Print the resolved settings

use crate::config::SettingsSource;
use crate::output::print_json;
use anyhow::Result;
use fathom_core::SearchSettings;

/// Show which settings a search would run with
pub async fn settings_command(settings: SearchSettings, source: SettingsSource) -> Result<()> {
    match source {
        SettingsSource::File(path) => eprintln!("Settings loaded from {}", path.display()),
        SettingsSource::Defaults => eprintln!("No settings file found, using defaults"),
    }
    print_json(&settings)
}
