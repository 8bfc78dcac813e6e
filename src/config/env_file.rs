//! Optional `.env`-style file loading
//!
//! The file named by `PLUGIN_ENV_FILE` is loaded before any flag or
//! environment variable is read. Variables already present in the process
//! environment win over the file.

use std::path::PathBuf;

pub const ENV_FILE_VAR: &str = "PLUGIN_ENV_FILE";

/// What happened when looking for the env file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileStatus {
    /// `PLUGIN_ENV_FILE` was not set
    NotConfigured,
    Loaded(PathBuf),
    /// The file was configured but could not be read or parsed
    Failed { path: PathBuf, message: String },
}

/// Load the env file named by `PLUGIN_ENV_FILE`, if any.
///
/// Never fails: a broken env file is reported through the returned status
/// so the caller can log it once logging is initialised.
pub fn load_env_file() -> EnvFileStatus {
    match std::env::var_os(ENV_FILE_VAR) {
        Some(path) if !path.is_empty() => load_from(PathBuf::from(path)),
        _ => EnvFileStatus::NotConfigured,
    }
}

fn load_from(path: PathBuf) -> EnvFileStatus {
    match dotenvy::from_path(&path) {
        Ok(()) => EnvFileStatus::Loaded(path),
        Err(e) => EnvFileStatus::Failed {
            path,
            message: e.to_string(),
        },
    }
}
