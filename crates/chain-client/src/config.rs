//! Network configuration
//!
//! Defines the chain endpoints, contract address and client timeouts. The
//! defaults target Ramestta mainnet; a TOML file may override any field.

use crate::{ChainClientError, ChainResult};
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Deployed BigBang contract on Ramestta mainnet.
pub const BIGBANG_CONTRACT: Address = address!("0x564D9d678658849Dc283EF3AF7927258582d8a86");

/// Ramestta chain id.
pub const RAMESTTA_CHAIN_ID: u64 = 1370;

/// Network configuration for the BigBang client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// EVM chain id
    pub chain_id: u64,

    /// Human readable network name
    pub network_name: String,

    /// Native token symbol
    pub native_symbol: String,

    /// JSON-RPC endpoints, tried in order on transport failure
    pub rpc_urls: Vec<String>,

    /// BigBang contract address
    pub contract_address: Address,

    /// Block explorer base URL
    pub explorer_url: String,

    /// Base URL used when building referral links
    pub referral_base_url: String,

    /// Per-request HTTP timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Interval between receipt polls
    #[serde(with = "humantime_serde")]
    pub receipt_poll_interval: Duration,

    /// Give up waiting for a receipt after this long
    #[serde(with = "humantime_serde")]
    pub receipt_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: RAMESTTA_CHAIN_ID,
            network_name: "Ramestta".to_string(),
            native_symbol: "RAMA".to_string(),
            rpc_urls: vec![
                "https://blockchain.ramestta.com".to_string(),
                "https://blockchain2.ramestta.com".to_string(),
            ],
            contract_address: BIGBANG_CONTRACT,
            explorer_url: "https://ramascan.com/".to_string(),
            referral_base_url: "https://bigbang.app".to_string(),
            request_timeout: Duration::from_secs(30),
            receipt_poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

impl NetworkConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// Missing fields fall back to the Ramestta defaults.
    pub fn load(path: impl AsRef<Path>) -> ChainResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChainClientError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ChainClientError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ChainResult<()> {
        if self.rpc_urls.is_empty() {
            return Err(ChainClientError::Config(
                "rpc_urls cannot be empty".to_string(),
            ));
        }

        for url in &self.rpc_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ChainClientError::Config(format!(
                    "rpc url must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if self.contract_address == Address::ZERO {
            return Err(ChainClientError::Config(
                "contract_address cannot be the zero address".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ChainClientError::Config(
                "request_timeout must be > 0".to_string(),
            ));
        }

        if self.receipt_poll_interval.is_zero() {
            return Err(ChainClientError::Config(
                "receipt_poll_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Explorer URL for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_defaults() {
        let config = NetworkConfig::default();

        assert_eq!(config.chain_id, 1370);
        assert_eq!(config.native_symbol, "RAMA");
        assert_eq!(config.rpc_urls.len(), 2);
        assert_eq!(config.rpc_urls[0], "https://blockchain.ramestta.com");
        assert_eq!(config.contract_address, BIGBANG_CONTRACT);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
rpc_urls = ["http://127.0.0.1:8545"]
request_timeout = "5s"
"#
        )
        .expect("write");

        let config = NetworkConfig::load(file.path()).expect("load");
        assert_eq!(config.rpc_urls, vec!["http://127.0.0.1:8545".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.chain_id, 1370);
        assert_eq!(config.contract_address, BIGBANG_CONTRACT);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "rpc_urls = 12").expect("write");

        let result = NetworkConfig::load(file.path());
        assert!(matches!(result, Err(ChainClientError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_invalid_values() {
        let mut config = NetworkConfig::default();
        config.rpc_urls.clear();
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.rpc_urls = vec!["ws://127.0.0.1:9944".to_string()];
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.contract_address = Address::ZERO;
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explorer_tx_url() {
        let config = NetworkConfig::default();
        assert_eq!(
            config.explorer_tx_url("0xabc"),
            "https://ramascan.com/tx/0xabc"
        );
    }
}
