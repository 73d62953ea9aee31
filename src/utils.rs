//! Shared path helpers for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File name of the collection report.
pub const COLLECTION_FILE: &str = "book_collection.txt";

/// File name of the genre list.
pub const GENRES_FILE: &str = "genres.txt";

/// Gets the cross-platform data directory for shelf.
///
/// Returns `{data_dir}/shelf` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("shelf"))
}

/// Ensures the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
