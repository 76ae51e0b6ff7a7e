//! CLI settings discovery

pub mod loader;

pub use loader::{CliConfigLoader, SettingsSource};
