use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const STORE_FILE: &str = "vocaquiz.json";
pub const BACKUPS_DIR: &str = "backups";
pub const SETTINGS_FILE: &str = "settings.json";

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "vocaquiz", "Vocaquiz") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Card file and backup directory under `root`.
pub fn store_paths(root: &Path) -> (PathBuf, PathBuf) {
    (root.join(STORE_FILE), root.join(BACKUPS_DIR))
}

pub fn settings_file(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}
