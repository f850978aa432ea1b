//! Node configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete node configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KoraConfig {
    /// Node identity settings
    #[serde(default)]
    pub node: NodeSettings,

    /// Chain connection settings
    #[serde(default)]
    pub chain: ChainSettings,

    /// Orchestrator directory settings
    #[serde(default)]
    pub directory: DirectorySettings,

    /// Economics defaults
    #[serde(default)]
    pub economics: EconomicsSettings,

    /// External gateway settings
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// JSON-RPC API settings
    #[serde(default)]
    pub rpc: RpcSettings,

    /// Metrics exporter settings
    #[serde(default)]
    pub metrics: MetricsSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl KoraConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Basic node settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Node name, shown in logs and version responses
    #[serde(default = "default_node_name")]
    pub name: String,
}

fn default_node_name() -> String {
    "kora-node".to_string()
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            name: default_node_name(),
        }
    }
}

/// Chain connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSettings {
    /// JSON-RPC endpoint of the chain
    #[serde(default = "default_chain_rpc_url")]
    pub rpc_url: String,

    /// Bonding manager contract address (hex)
    #[serde(default = "default_bonding_manager")]
    pub bonding_manager: String,

    /// KOR token contract address (hex)
    #[serde(default = "default_token")]
    pub token: String,

    /// Receipt poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Receipt poll attempts before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_chain_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_bonding_manager() -> String {
    "0x35bcf3c30594191d53231e4ff333e8a770453e40".to_string()
}

fn default_token() -> String {
    "0x289ba1701c2f088cf0faf8b3705246331cb8a839".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_max_poll_attempts() -> u32 {
    30
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_chain_rpc_url(),
            bonding_manager: default_bonding_manager(),
            token: default_token(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Orchestrator directory settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// Seconds between directory refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    300
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

/// Economics defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomicsSettings {
    /// Display currency when a request doesn't name one
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_currency() -> String {
    "NGN".to_string()
}

impl Default for EconomicsSettings {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
        }
    }
}

/// External gateway settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Enable the fiat on-ramp gateway
    #[serde(default)]
    pub onramp_enabled: bool,

    /// On-ramp aggregator base URL
    #[serde(default = "default_onramp_api_url")]
    pub onramp_api_url: String,

    /// On-ramp API key
    #[serde(default)]
    pub onramp_api_key: String,

    /// URL the user is returned to after checkout
    #[serde(default = "default_onramp_return_url")]
    pub onramp_return_url: String,

    /// Enable the staking assistant gateway
    #[serde(default)]
    pub assistant_enabled: bool,

    /// Chat-completion API base URL
    #[serde(default = "default_assistant_api_url")]
    pub assistant_api_url: String,

    /// Chat-completion API key
    #[serde(default)]
    pub assistant_api_key: String,

    /// Model name sent with completion requests
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,
}

fn default_onramp_api_url() -> String {
    "https://api.onramp.example.com".to_string()
}

fn default_onramp_return_url() -> String {
    "https://app.korahq.xyz/wallet".to_string()
}

fn default_assistant_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            onramp_enabled: false,
            onramp_api_url: default_onramp_api_url(),
            onramp_api_key: String::new(),
            onramp_return_url: default_onramp_return_url(),
            assistant_enabled: false,
            assistant_api_url: default_assistant_api_url(),
            assistant_api_key: String::new(),
            assistant_model: default_assistant_model(),
        }
    }
}

/// JSON-RPC API settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Enable the JSON-RPC server
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Listen address
    #[serde(default = "default_rpc_addr")]
    pub listen_addr: String,

    /// Requests per second per client IP
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst allowance on top of the per-second limit
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_true() -> bool {
    true
}

fn default_rpc_addr() -> String {
    "127.0.0.1:8650".to_string()
}

fn default_requests_per_second() -> u32 {
    100
}

fn default_burst() -> u32 {
    200
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: default_rpc_addr(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// Metrics exporter settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Enable the Prometheus exporter
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Exporter listen address
    #[serde(default = "default_metrics_addr")]
    pub listen_addr: String,
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9650".to_string()
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: default_metrics_addr(),
        }
    }
}

/// Logging settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log filter, e.g. "info" or "kora_chain=debug,info"
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: KoraConfig = toml::from_str("").unwrap();
        assert_eq!(config.rpc.listen_addr, "127.0.0.1:8650");
        assert_eq!(config.economics.default_currency, "NGN");
        assert_eq!(config.directory.refresh_interval_secs, 300);
        assert!(config.rpc.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: KoraConfig = toml::from_str(
            r#"
            [rpc]
            listen_addr = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.rpc.requests_per_second, 100);
    }
}
