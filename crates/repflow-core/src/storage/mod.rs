mod config;

pub use config::{CastConfig, Config, SessionTimingConfig};

use std::path::PathBuf;

/// Returns `~/.config/repflow[-dev]/` based on REPFLOW_ENV.
///
/// Set REPFLOW_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REPFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("repflow-dev")
    } else {
        base_dir.join("repflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
