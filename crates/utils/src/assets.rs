use std::{env, path::PathBuf};

use directories::ProjectDirs;

const ASSET_DIR_ENV: &str = "DAYFLOW_ASSET_DIR";

/// Directory holding the sqlite database and other runtime assets.
///
/// Overridable via DAYFLOW_ASSET_DIR for tests and containers; otherwise the
/// platform data dir.
pub fn asset_dir() -> PathBuf {
    if let Ok(dir) = env::var(ASSET_DIR_ENV) {
        return PathBuf::from(dir);
    }

    ProjectDirs::from("app", "dayflow", "dayflow")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            tracing::warn!("no platform data dir available, falling back to ./data");
            PathBuf::from("./data")
        })
}
