//! Shared Container Paths
//!
//! Resolves the shared container directory that both processes (the app
//! and the intents extension) use for the store file, the shared cache
//! slot, and the config file.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::store_location("could not determine home directory"))
}

/// Get the shared container directory (~/.shopping-list/) addressable by
/// both processes
pub fn shared_container_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".shopping-list"))
}

/// Get the config file path (~/.shopping-list/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(shared_container_dir()?.join("config.json"))
}

/// Get the shared key-value slot file holding the encoded cart sequence
pub fn shared_slot_path() -> AppResult<PathBuf> {
    Ok(shared_container_dir()?.join("shared-cart.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the shared container directory, creating it if it doesn't exist
pub fn ensure_shared_container_dir() -> AppResult<PathBuf> {
    let path = shared_container_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
