//! Cross-platform configuration paths using the `dirs` crate.
//!
//! Layout:
//!
//!   Windows: %APPDATA%\srconv\settings.toml
//!   macOS:   ~/Library/Application Support/srconv/settings.toml
//!   Linux:   ~/.config/srconv/settings.toml

use std::path::PathBuf;

/// Resolved configuration locations.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl ConfigPaths {
    const APP_NAME: &'static str = "srconv";

    /// Falls back to the current directory if the platform has no standard
    /// config directory.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
