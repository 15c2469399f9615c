use crate::errors::{DeskError, DeskErrorType, Result};
use directories::{BaseDirs, UserDirs};
use std::path::{Path, PathBuf};

pub fn get_main_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        DeskError::new(
            DeskErrorType::NotFound,
            "Unable to determine the user data directory".to_string(),
        )
    })?;
    let user_data_dir: &Path = base_dirs.data_dir();
    let package_root: PathBuf = user_data_dir.join("sakura");
    if !package_root.exists() {
        std::fs::create_dir_all(&package_root)?;
    }
    Ok(package_root)
}

/// The storage directory holds the session database, logs and config.
/// An explicit directory wins over the per-user default.
pub fn get_storage_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let storage_dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => get_main_dir()?,
    };
    if !storage_dir.exists() {
        std::fs::create_dir_all(&storage_dir)?;
    }
    Ok(storage_dir)
}

pub fn get_database_dir(storage_dir: &Path) -> PathBuf {
    storage_dir.join(".db")
}

pub fn get_log_dir(storage_dir: &Path) -> Result<PathBuf> {
    let log_dir = storage_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

pub fn get_config_file(storage_dir: &Path) -> PathBuf {
    storage_dir.join("config.json")
}

pub fn get_default_socket() -> Result<PathBuf> {
    let user_dirs = UserDirs::new().ok_or_else(|| {
        DeskError::new(
            DeskErrorType::NotFound,
            "Unable to determine the home directory".to_string(),
        )
    })?;
    Ok(user_dirs.home_dir().join(".sakura.sock"))
}
