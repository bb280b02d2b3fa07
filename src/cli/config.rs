//! Operator configuration file handling.
//!
//! TOML config for deployment settings: which RPC endpoint and indexer
//! to talk to, timeouts, fan-out limits, logging. Protocol constants
//! (gas, default bond, native decimals) are not operator-tunable; they
//! live in `ComposerConfig` defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use daotx::ComposerConfig;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default chain RPC endpoint (mainnet).
const DEFAULT_RPC_URL: &str = "https://rpc.mainnet.near.org";

/// Default DAO indexer endpoint.
const DEFAULT_INDEXER_URL: &str = "https://api.app.astrodao.com";

/// Default per-call network deadline, seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default cap on concurrent policy fetches.
const DEFAULT_CONCURRENCY: usize = 8;

/// daotx operator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaotxConfig {
    /// Network endpoints and deadlines
    #[serde(default)]
    pub network: NetworkConfig,

    /// Eligibility fan-out settings
    #[serde(default)]
    pub eligibility: EligibilityConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Chain JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// DAO indexer base URL (membership lookups)
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Eligibility resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Cap on simultaneous policy fetches
    #[serde(default = "default_concurrency")]
    pub policy_fetch_concurrency: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_indexer_url() -> String {
    DEFAULT_INDEXER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            indexer_url: default_indexer_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            policy_fetch_concurrency: default_concurrency(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl DaotxConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: DaotxConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# daotx configuration (operator settings)
#
# Endpoints and deadlines are deployment choices. Protocol constants
# (gas per action, the default proposal bond, native decimals) are
# fixed by the DAO contract surface and are not configurable here.

[network]
# Chain JSON-RPC endpoint
rpc_url = "{DEFAULT_RPC_URL}"

# DAO indexer base URL (membership lookups for `daotx eligibility`)
indexer_url = "{DEFAULT_INDEXER_URL}"

# Per-call deadline in seconds
timeout_secs = {DEFAULT_TIMEOUT_SECS}

[eligibility]
# Cap on simultaneous policy fetches during eligibility resolution
policy_fetch_concurrency = {DEFAULT_CONCURRENCY}

[logging]
# Log level: trace, debug, info, warn, error
level = "info"
"#
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }

    /// The immutable composer settings this operator config implies.
    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            request_timeout: Duration::from_secs(self.network.timeout_secs),
            policy_fetch_concurrency: self.eligibility.policy_fetch_concurrency,
            ..ComposerConfig::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }
}

/// Default config file path: `<config dir>/daotx/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daotx")
        .join("config.toml")
}
