mod config;
pub mod store;

pub use config::{Config, DefaultsConfig, LoggingConfig, StorageConfig};
pub use store::StateStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/habitrealm[-dev]/` based on HABITREALM_ENV.
///
/// Set HABITREALM_ENV=dev to use the development data directory, or
/// HABITREALM_HOME to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITREALM_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITREALM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitrealm-dev")
            } else {
                base_dir.join("habitrealm")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
