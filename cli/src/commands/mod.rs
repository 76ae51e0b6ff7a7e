//! CLI command implementations

pub mod search;
pub mod settings;

pub use search::{content_command, names_command, paths_command, resolve_root, FileSearchArgs};
pub use settings::settings_command;
