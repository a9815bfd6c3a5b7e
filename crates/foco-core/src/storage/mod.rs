mod config;
pub mod database;
mod state_store;

pub use config::AppConfig;
pub use database::Database;
pub use state_store::{MemoryStore, SqliteStore, StateStore, STATE_KEY};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `FOCO_DATA_DIR` wins when set. Otherwise `~/.config/foco`, or
/// `~/.config/foco-dev` with `FOCO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("FOCO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("foco-dev")
            } else {
                base_dir.join("foco")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
