//! Configuration: target chain, RPC endpoint, contract addresses
//!
//! Resolution order is CLI flags and environment (handled by clap), then
//! the TOML config file, then built-in defaults. The resolved
//! [`ChainConfig`] is immutable and handed to the app and the worker by
//! value; nothing mutates configuration after startup.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// The one supported network.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Default public Sepolia endpoint. Fine for a testnet tool; anything
/// serious should point at its own node via `--rpc`.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";

/// Raw shape of the optional config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub rpc: Option<String>,
    pub contract: Option<String>,
    pub token: Option<String>,
    pub spender: Option<String>,
    pub explorer: Option<String>,
    pub key_file: Option<String>,
}

/// CLI/env values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc: Option<String>,
    pub contract: Option<String>,
    pub token: Option<String>,
    pub spender: Option<String>,
    pub key_file: Option<PathBuf>,
}

/// Resolved, immutable startup configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    /// Hygiene log contract. Optional: the token queries work without it,
    /// only the hygiene reads and the mark-cleaned action require it.
    pub contract_address: Option<String>,
    pub default_token: Option<String>,
    pub default_spender: Option<String>,
    /// File holding the hex-encoded wallet key. The `DOCTOR_PRIVATE_KEY`
    /// env var wins over this when set.
    pub key_file: Option<PathBuf>,
}

impl ChainConfig {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        fn pick(first: Option<String>, second: Option<String>) -> Option<String> {
            first
                .or(second)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }

        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            rpc_url: pick(overrides.rpc, file.rpc)
                .map(|rpc| normalize_http_endpoint(&rpc))
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            explorer_url: pick(None, file.explorer)
                .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
            contract_address: pick(overrides.contract, file.contract),
            default_token: pick(overrides.token, file.token),
            default_spender: pick(overrides.spender, file.spender),
            key_file: overrides
                .key_file
                .or_else(|| file.key_file.map(PathBuf::from)),
        }
    }

    /// Explorer page for a transaction hash.
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

pub fn load() -> FileConfig {
    let Some(path) = config_path() else {
        return FileConfig::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return FileConfig::default(),
    };
    toml::from_str::<FileConfig>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DOCTOR_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("allowance-doctor").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(
            home.join(".config")
                .join("allowance-doctor")
                .join("config.toml"),
        );
    }

    directories::ProjectDirs::from("io", "allowance-doctor", "allowance-doctor")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("allowance-doctor"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("allowance-doctor"));
    }
    directories::ProjectDirs::from("io", "allowance-doctor", "allowance-doctor")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_file_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("allowance-doctor.log"))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_beat_file_values() {
        let file = FileConfig {
            rpc: Some("http://file:8545".into()),
            token: Some("0xfile".into()),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            rpc: Some("http://cli:8545".into()),
            ..Overrides::default()
        };
        let config = ChainConfig::resolve(overrides, file);
        assert_eq!(config.rpc_url, "http://cli:8545");
        assert_eq!(config.default_token.as_deref(), Some("0xfile"));
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let config = ChainConfig::resolve(Overrides::default(), FileConfig::default());
        assert_eq!(config.chain_id, SEPOLIA_CHAIN_ID);
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert!(config.contract_address.is_none());
        assert!(config.default_token.is_none());
    }

    #[test]
    fn bare_endpoints_get_a_scheme() {
        let overrides = Overrides {
            rpc: Some("localhost:8545".into()),
            ..Overrides::default()
        };
        let config = ChainConfig::resolve(overrides, FileConfig::default());
        assert_eq!(config.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let file = FileConfig {
            contract: Some("   ".into()),
            ..FileConfig::default()
        };
        let config = ChainConfig::resolve(Overrides::default(), file);
        assert!(config.contract_address.is_none());
    }

    #[test]
    fn tx_url_joins_cleanly() {
        let mut config = ChainConfig::resolve(Overrides::default(), FileConfig::default());
        config.explorer_url = "https://sepolia.etherscan.io/".into();
        assert_eq!(
            config.tx_url("0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
    }
}
