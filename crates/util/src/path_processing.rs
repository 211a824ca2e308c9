use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Application directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "paddock";

/// Expand a leading `~` (Unix or Windows separator) to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if p == "~" {
        return home();
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(p)
}

/// `<config dir>/paddock/<file_name>`, falling back to the working directory
/// when the platform has no config directory.
pub fn config_file_path(file_name: &str) -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(file_name)
}
