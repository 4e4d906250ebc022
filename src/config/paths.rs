//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir, settings + favorites):
//!   Windows: %APPDATA%\mandi-bridge\
//!   macOS:   ~/Library/Application Support/mandi-bridge/
//!   Linux:   ~/.config/mandi-bridge/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `favorites.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `favorites.json` (the persisted watchlist).
    pub favorites_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "mandi-bridge";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let favorites_file = config_dir.join("favorites.json");

        Self {
            config_dir,
            settings_file,
            favorites_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
