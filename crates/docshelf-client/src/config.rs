//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client runs with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use docshelf_shared::constants::{DEFAULT_API_URL, DEFAULT_UPLOAD_DELAY_MS, MAX_FILE_SIZE};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory holding `docshelf.db`.
    /// Env: `DOCSHELF_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Simulated upload latency.
    /// Env: `DOCSHELF_UPLOAD_DELAY_MS`
    /// Default: `2000`
    pub upload_delay: Duration,

    /// Largest accepted upload in bytes.
    /// Env: `DOCSHELF_MAX_FILE_SIZE`
    /// Default: 50 MiB
    pub max_file_size: usize,

    /// Base URL of the REST backend.
    /// Env: `DOCSHELF_API_URL`
    /// Default: `http://localhost:3001/api`
    pub api_url: String,

    /// Byte quota for in-memory storage.  When set, the client runs against
    /// an ephemeral in-memory store instead of the database.
    /// Env: `DOCSHELF_STORAGE_QUOTA`
    /// Default: unset
    pub storage_quota: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            upload_delay: Duration::from_millis(DEFAULT_UPLOAD_DELAY_MS),
            max_file_size: MAX_FILE_SIZE,
            api_url: DEFAULT_API_URL.to_string(),
            storage_quota: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("DOCSHELF_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = lookup("DOCSHELF_UPLOAD_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.upload_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %val, "Invalid DOCSHELF_UPLOAD_DELAY_MS, using default"),
            }
        }

        if let Some(val) = lookup("DOCSHELF_MAX_FILE_SIZE") {
            match val.parse::<usize>() {
                Ok(n) => config.max_file_size = n,
                Err(_) => tracing::warn!(value = %val, "Invalid DOCSHELF_MAX_FILE_SIZE, using default"),
            }
        }

        if let Some(url) = lookup("DOCSHELF_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(val) = lookup("DOCSHELF_STORAGE_QUOTA") {
            if let Ok(n) = val.parse::<usize>() {
                config.storage_quota = Some(n);
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
