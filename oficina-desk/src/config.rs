//! Desk configuration
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | OFICINA_API_URL | http://localhost:3333 | API base URL |
//! | OFICINA_DATA_DIR | ./.oficina | local storage directory |
//! | OFICINA_TIMEOUT_SECS | 30 | request timeout |
//! | LOG_LEVEL | info | log filter (overridden by RUST_LOG) |
//! | LOG_DIR | unset | directory for daily log files |

use std::path::PathBuf;

use oficina_client::ClientConfig;

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl DeskConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("OFICINA_API_URL")
                .unwrap_or_else(|_| "http://localhost:3333".into()),
            data_dir: std::env::var("OFICINA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".oficina")),
            timeout_secs: std::env::var("OFICINA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_url).with_timeout(self.timeout_secs)
    }
}
