use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::browser::Driver;
use crate::error::TestResult;

/// `<dir>/<test-name>_<epoch-millis>.png`, with path-hostile characters replaced.
pub fn screenshot_path(dir: &Path, test_name: &str, epoch_millis: i64) -> PathBuf {
    let safe: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("{safe}_{epoch_millis}.png"))
}

fn write_screenshot(path: &Path, png: &[u8]) -> TestResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, png)?;
    Ok(())
}

async fn try_capture(driver: &dyn Driver, dir: &Path, test_name: &str) -> TestResult<PathBuf> {
    let png = driver.screenshot().await?;
    let path = screenshot_path(dir, test_name, Utc::now().timestamp_millis());
    write_screenshot(&path, &png)?;
    Ok(fs::canonicalize(&path).or_else(|_| std::path::absolute(&path))?)
}

/// Best-effort capture of the current viewport. Failures are logged and yield `None`.
pub async fn capture_screenshot(
    driver: &dyn Driver,
    dir: &Path,
    test_name: &str,
) -> Option<PathBuf> {
    match try_capture(driver, dir, test_name).await {
        Ok(path) => {
            log::info!("Screenshot for {test_name} saved to {}", path.display());
            Some(path)
        }
        Err(err) => {
            log::warn!("Failed to capture screenshot for {test_name}: {err}");
            None
        }
    }
}
