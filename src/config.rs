//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::wallet::ProviderKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_store_file")]
    pub file_name: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tipjar").to_string_lossy().to_string())
        .unwrap_or_else(|| "./tipjar_data".to_string())
}

fn default_store_file() -> String {
    "storage.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_store_file(),
        }
    }
}

impl StoreConfig {
    /// Path to the store file
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.file_name)
    }
}

/// Wallet provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// "demo" or "external"
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Wallet bridge URL (external provider only)
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    /// Timeout for algod requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Timeout for wallet bridge requests (signing waits on the user)
    #[serde(default = "default_sign_timeout")]
    pub sign_timeout_ms: u64,

    /// Rounds to wait for confirmation
    #[serde(default = "default_confirmation_rounds")]
    pub confirmation_rounds: u64,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Demo
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8420".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_sign_timeout() -> u64 {
    120_000
}

fn default_confirmation_rounds() -> u64 {
    4
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            bridge_url: default_bridge_url(),
            request_timeout_ms: default_request_timeout(),
            sign_timeout_ms: default_sign_timeout(),
            confirmation_rounds: default_confirmation_rounds(),
        }
    }
}

/// Algorand network selection
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
    Betanet,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
            Network::Betanet => write!(f, "betanet"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "betanet" => Ok(Network::Betanet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// Node and explorer endpoints for one network
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEndpoints {
    pub algod_server: String,

    #[serde(default)]
    pub algod_token: String,

    #[serde(default)]
    pub explorer_url: String,
}

impl NetworkEndpoints {
    fn algonode(prefix: &str, explorer: &str) -> Self {
        Self {
            algod_server: format!("https://{}-api.algonode.cloud", prefix),
            algod_token: String::new(),
            explorer_url: explorer.to_string(),
        }
    }
}

/// Network configuration with per-network presets
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub name: Network,

    #[serde(default = "default_testnet")]
    pub testnet: NetworkEndpoints,

    #[serde(default = "default_mainnet")]
    pub mainnet: NetworkEndpoints,

    #[serde(default = "default_betanet")]
    pub betanet: NetworkEndpoints,
}

fn default_testnet() -> NetworkEndpoints {
    NetworkEndpoints::algonode("testnet", "https://testnet.algoexplorer.io")
}

fn default_mainnet() -> NetworkEndpoints {
    NetworkEndpoints::algonode("mainnet", "https://algoexplorer.io")
}

fn default_betanet() -> NetworkEndpoints {
    NetworkEndpoints::algonode("betanet", "https://betanet.algoexplorer.io")
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: Network::default(),
            testnet: default_testnet(),
            mainnet: default_mainnet(),
            betanet: default_betanet(),
        }
    }
}

impl NetworkConfig {
    /// Endpoints of the selected network
    pub fn active(&self) -> &NetworkEndpoints {
        match self.name {
            Network::Testnet => &self.testnet,
            Network::Mainnet => &self.mainnet,
            Network::Betanet => &self.betanet,
        }
    }

    fn active_mut(&mut self) -> &mut NetworkEndpoints {
        match self.name {
            Network::Testnet => &mut self.testnet,
            Network::Mainnet => &mut self.mainnet,
            Network::Betanet => &mut self.betanet,
        }
    }

    /// Explorer link for a transaction
    pub fn explorer_tx_url(&self, tx_id: &str) -> String {
        format!("{}/tx/{}", self.active().explorer_url, tx_id)
    }
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Smallest accepted tip in ALGO; unbounded when unset
    #[serde(default)]
    pub min_tip: Option<f64>,

    /// Largest accepted tip in ALGO; unbounded when unset
    #[serde(default)]
    pub max_tip: Option<f64>,

    /// Preset tip buttons in ALGO
    #[serde(default = "default_preset_amounts")]
    pub preset_amounts: Vec<f64>,

    #[serde(default = "default_transaction_note")]
    pub transaction_note: String,

    /// Public site URL used in embed codes
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// How long a notice stays visible
    #[serde(default = "default_message_dismiss")]
    pub message_dismiss_secs: u64,
}

fn default_app_name() -> String {
    "Creator Tip Jar".to_string()
}

fn default_preset_amounts() -> Vec<f64> {
    vec![1.0, 5.0, 10.0, 25.0]
}

fn default_transaction_note() -> String {
    "Tip from Creator Tip Jar".to_string()
}

fn default_site_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_message_dismiss() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            min_tip: None,
            max_tip: None,
            preset_amounts: default_preset_amounts(),
            transaction_note: default_transaction_note(),
            site_url: default_site_url(),
            message_dismiss_secs: default_message_dismiss(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tipjar").join("config.toml")),
            Some(PathBuf::from("./tipjar.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(data_dir) = lookup("TIPJAR_DATA_DIR") {
            self.store.data_dir = data_dir;
        }

        // Wallet overrides
        if let Some(provider) = lookup("TIPJAR_WALLET_PROVIDER") {
            match provider.parse() {
                Ok(kind) => self.wallet.provider = kind,
                Err(e) => tracing::warn!("Ignoring TIPJAR_WALLET_PROVIDER: {}", e),
            }
        }
        if let Some(url) = lookup("TIPJAR_BRIDGE_URL") {
            self.wallet.bridge_url = url;
        }

        // Network overrides; the network is picked before its endpoints
        if let Some(network) = lookup("TIPJAR_NETWORK") {
            match network.parse() {
                Ok(name) => self.network.name = name,
                Err(e) => tracing::warn!("Ignoring TIPJAR_NETWORK: {}", e),
            }
        }
        if let Some(url) = lookup("TIPJAR_ALGOD_URL") {
            self.network.active_mut().algod_server = url;
        }
        if let Some(token) = lookup("TIPJAR_ALGOD_TOKEN") {
            self.network.active_mut().algod_token = token;
        }

        // Logging overrides
        if let Some(level) = lookup("TIPJAR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TIPJAR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Creator Tip Jar Configuration
#
# Environment variables override these settings:
# - TIPJAR_DATA_DIR
# - TIPJAR_WALLET_PROVIDER
# - TIPJAR_BRIDGE_URL
# - TIPJAR_NETWORK
# - TIPJAR_ALGOD_URL
# - TIPJAR_ALGOD_TOKEN
# - TIPJAR_LOG_LEVEL
# - TIPJAR_LOG_FORMAT

[store]
# Directory holding the record store
data_dir = "~/.local/share/tipjar"

# Store file name inside data_dir
file_name = "storage.json"

[wallet]
# Wallet provider: "demo" (fabricated addresses, no network) or "external"
provider = "demo"

# Wallet bridge used by the external provider
bridge_url = "http://127.0.0.1:8420"

# algod request timeout (ms)
request_timeout_ms = 10000

# Wallet bridge timeout (ms); signing waits for the user
sign_timeout_ms = 120000

# Rounds to wait for a transaction to confirm
confirmation_rounds = 4

[network]
# Network: testnet, mainnet or betanet
name = "testnet"

[network.testnet]
algod_server = "https://testnet-api.algonode.cloud"
algod_token = ""
explorer_url = "https://testnet.algoexplorer.io"

[network.mainnet]
algod_server = "https://mainnet-api.algonode.cloud"
algod_token = ""
explorer_url = "https://algoexplorer.io"

[app]
name = "Creator Tip Jar"

# Accepted tip range (ALGO). Any positive amount is accepted when unset.
# min_tip = 0.1
# max_tip = 1000.0

# Preset tip amounts (ALGO)
preset_amounts = [1.0, 5.0, 10.0, 25.0]

# Note attached to every tip transaction
transaction_note = "Tip from Creator Tip Jar"

# Public site URL used in embed codes
site_url = "http://localhost:8000"

# Seconds a notice stays visible
message_dismiss_secs = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wallet.provider, ProviderKind::Demo);
        assert_eq!(config.network.name, Network::Testnet);
        assert_eq!(
            config.network.active().algod_server,
            "https://testnet-api.algonode.cloud"
        );
        assert_eq!(config.app.min_tip, None);
        assert_eq!(config.app.max_tip, None);
        assert!(config.store.path().ends_with("storage.json"));
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.wallet.provider, ProviderKind::Demo);
        assert_eq!(config.wallet.confirmation_rounds, 4);
        assert_eq!(config.app.preset_amounts, vec![1.0, 5.0, 10.0, 25.0]);
        assert_eq!(config.network.mainnet.explorer_url, "https://algoexplorer.io");
        assert_eq!(config.app.min_tip, None);
    }

    #[test]
    fn test_tip_range_opt_in() {
        let config = Config::parse("[app]
min_tip = 0.1
max_tip = 1000.0").unwrap();
        assert_eq!(config.app.min_tip, Some(0.1));
        assert_eq!(config.app.max_tip, Some(1000.0));
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [wallet]
            provider = "external"

            [network]
            name = "mainnet"
            "#,
        )
        .unwrap();

        assert_eq!(config.wallet.provider, ProviderKind::External);
        assert_eq!(config.wallet.bridge_url, "http://127.0.0.1:8420");
        assert_eq!(
            config.network.active().algod_server,
            "https://mainnet-api.algonode.cloud"
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::parse("[wallet]\nprovider = \"ledger\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TIPJAR_DATA_DIR", "/tmp/tips"),
            ("TIPJAR_WALLET_PROVIDER", "external"),
            ("TIPJAR_NETWORK", "betanet"),
            ("TIPJAR_ALGOD_URL", "http://localhost:4001"),
            ("TIPJAR_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.data_dir, "/tmp/tips");
        assert_eq!(config.wallet.provider, ProviderKind::External);
        assert_eq!(config.network.name, Network::Betanet);
        assert_eq!(config.network.betanet.algod_server, "http://localhost:4001");
        assert_eq!(
            config.network.testnet.algod_server,
            "https://testnet-api.algonode.cloud"
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "TIPJAR_WALLET_PROVIDER").then(|| "nope".to_string()));
        assert_eq!(config.wallet.provider, ProviderKind::Demo);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_explorer_url() {
        let config = NetworkConfig::default();
        assert_eq!(
            config.explorer_tx_url("ABC"),
            "https://testnet.algoexplorer.io/tx/ABC"
        );
    }
}
