use std::path::PathBuf;

use directories::ProjectDirs;

/// Returns the root Leadflow directory path.
///
/// Resolution order:
/// 1. `LEADFLOW_ROOT` environment variable (if set)
/// 2. Current working directory + `.leadflow`
pub fn leadflow_root() -> PathBuf {
    if let Ok(root) = std::env::var("LEADFLOW_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".leadflow")
    }
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    leadflow_root().join("config.yaml")
}

/// Returns the path to the persistent session storage file.
///
/// Session values belong to the user rather than the project, so the
/// platform data directory is preferred. `LEADFLOW_STORAGE` overrides it;
/// when no data directory can be resolved the file lives under the root.
pub fn storage_path() -> PathBuf {
    if let Ok(path) = std::env::var("LEADFLOW_STORAGE") {
        return PathBuf::from(path);
    }
    if std::env::var("LEADFLOW_ROOT").is_ok() {
        return leadflow_root().join("storage.json");
    }
    ProjectDirs::from("app", "leadflow", "leadflow")
        .map(|dirs| dirs.data_dir().join("storage.json"))
        .unwrap_or_else(|| leadflow_root().join("storage.json"))
}
