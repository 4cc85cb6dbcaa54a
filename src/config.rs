//! Runtime configuration read from the environment.
//!
//! Completion-service settings (`OPENAI_*`) are resolved by
//! [`CompletionClientBuilder`](crate::completion::CompletionClientBuilder);
//! this module covers the local resources.

use std::path::PathBuf;

use anyhow::Result;

pub const DATABASE_ENV: &str = "CARENAV_DATABASE";
pub const ZIP_FILE_ENV: &str = "CARENAV_ZIP_FILE";
pub const BIND_ENV: &str = "CARENAV_BIND";

pub const DEFAULT_ZIP_FILE: &str = "uszips.csv";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Paths and addresses the service needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub zip_file: PathBuf,
    pub bind: String,
}

impl Config {
    /// Reads configuration from the environment, falling back to defaults.
    ///
    /// Blank variables count as unset.
    ///
    /// # Errors
    ///
    /// Fails only when `CARENAV_DATABASE` is unset and the platform has no
    /// data directory.
    pub fn from_env() -> Result<Self> {
        let database_path = match env_var(DATABASE_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        Ok(Self {
            database_path,
            zip_file: PathBuf::from(env_var(ZIP_FILE_ENV).unwrap_or_else(|| DEFAULT_ZIP_FILE.into())),
            bind: env_var(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.into()),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the path as `{data_dir}/carenav/providers.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
pub fn default_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("carenav").join("providers.db"))
}
