use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use crate::error::AppError;

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Filename-safe local timestamp, second precision.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Path for an output artifact: `<dir>/<name>-<timestamp>.<ext>`.
///
/// Creates the directory on first use so demo scripts can write without
/// any setup.
pub fn output_path(dir: &Path, name: &str, ext: &str) -> Result<PathBuf, AppError> {
    ensure_dir(dir)?;
    Ok(dir.join(format!("{name}-{}.{ext}", timestamp())))
}

/// Pause the current task for `ms` milliseconds.
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
