// Config path utilities.
// Resolves the per-user configuration location for ghprofile.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Get the base config directory (~/.config/ghprofile on Linux).
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghprofile").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
