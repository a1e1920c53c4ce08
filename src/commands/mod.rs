// Command handlers module
pub mod check;
pub mod config;
pub mod status;

use anyhow::Result;
use std::path::Path;

use crate::config::Config;

// Re-export command handlers for easy access
pub use check::handle_check_command;
pub use config::handle_config_action;
pub use status::handle_status_command;

/// Load `--config` when given, otherwise the default file (created on first use)
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
