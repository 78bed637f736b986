use std::env;
use std::path::PathBuf;

/// Overrides the data root when set.
pub const HOME_VAR: &str = "DATA_UPDATER_HOME";

/// Returns the root directory holding updater state.
pub fn default_app_dir() -> PathBuf {
    if let Some(home) = env::var_os(HOME_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }

    let base = match env::consts::OS {
        "windows" => env::var_os("LOCALAPPDATA")
            .or_else(|| env::var_os("APPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."));

    base.join("data-updater")
}

/// Versions of the data files shipped inside the installed build.
pub fn build_versions_file() -> PathBuf {
    default_app_dir().join("build_versions.json")
}

/// Versions this client has downloaded so far.
pub fn download_state_file() -> PathBuf {
    default_app_dir().join("downloads.json")
}
