use anyhow::{Context, Result};
use serde::Deserialize;

/// Complete host runtime configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally reachable base URL, used for OAuth and webhook callbacks
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Where callers land when an action has nothing better to redirect to
    #[serde(default = "default_page")]
    pub default_page: String,
}

fn default_port() -> u16 {
    3001
}

fn default_public_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_page() -> String {
    "/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_url: default_public_url(),
            default_page: default_page(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long a stored session value stays readable (seconds)
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: i64,
    /// How often expired sessions are swept (seconds)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_session_ttl() -> i64 {
    900
}

fn default_cleanup_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Connector parameter storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_parameters_db")]
    pub parameters_db: String,
}

fn default_parameters_db() -> String {
    "parameters.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            parameters_db: default_parameters_db(),
        }
    }
}

impl SyncConfig {
    /// Apply `SYNC_*` environment overrides on top of the file values.
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var("SYNC_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(v) = std::env::var("SYNC_PUBLIC_URL") {
            self.server.public_url = v;
        }
        if let Ok(v) = std::env::var("SYNC_PARAMETERS_DB") {
            self.storage.parameters_db = v;
        }
        if let Ok(v) = std::env::var("SYNC_SESSION_TTL_SECONDS") {
            if let Ok(ttl) = v.parse::<i64>() {
                self.session.ttl_seconds = ttl;
            }
        }
        self
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<SyncConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: SyncConfig = toml::from_str(&contents).context("Failed to parse config file")?;
    Ok(config)
}
