// crates/chih-daemon/src/config.rs
//
// Runtime configuration for the Chih staking daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use chih_core::{AccountId, Amount, ChihError};
use chih_ledger::{Chih, EmissionMode};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for the daemon key and ledger snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hex account id of the Rate Authority. Defaults to the daemon's own key.
    #[serde(default)]
    pub owner: Option<String>,

    /// Symbol of the staked (and rewarded) asset.
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,

    /// Emission rate as a decimal token amount per second.
    #[serde(default = "default_reward_rate")]
    pub reward_rate: String,

    /// How `reward_rate` is shared among stakers.
    #[serde(default)]
    pub emission_mode: EmissionMode,

    /// Reward reserve minted into the pool on first start, in tokens.
    #[serde(default = "default_reward_reserve")]
    pub reward_reserve: String,

    /// Tokens the development faucet mints per account ("0" disables it).
    #[serde(default = "default_faucet_amount")]
    pub faucet_amount: String,

    /// Seconds between ledger snapshots (0 disables periodic snapshots;
    /// a final snapshot is still written on shutdown).
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,
}

fn default_data_dir() -> String {
    "~/.chih/data".to_string()
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50061
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_asset_symbol() -> String {
    "CHIH".to_string()
}

fn default_reward_rate() -> String {
    "0.000001".to_string()
}

fn default_reward_reserve() -> String {
    "10000000".to_string()
}

fn default_faucet_amount() -> String {
    "0".to_string()
}

fn default_snapshot_interval_secs() -> u64 {
    30
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            owner: None,
            asset_symbol: default_asset_symbol(),
            reward_rate: default_reward_rate(),
            emission_mode: EmissionMode::default(),
            reward_reserve: default_reward_reserve(),
            faucet_amount: default_faucet_amount(),
            snapshot_interval_secs: default_snapshot_interval_secs(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reward rate in 18-decimal fixed point.
    pub fn reward_rate_wei(&self) -> Result<u128, ChihError> {
        Ok(Chih::parse(&self.reward_rate)?.wei)
    }

    pub fn reward_reserve_wei(&self) -> Result<Amount, ChihError> {
        Ok(Chih::parse(&self.reward_reserve)?.wei)
    }

    pub fn faucet_amount_wei(&self) -> Result<Amount, ChihError> {
        Ok(Chih::parse(&self.faucet_amount)?.wei)
    }

    /// Configured owner, if any.
    pub fn owner_account(&self) -> Result<Option<AccountId>, ChihError> {
        self.owner.as_deref().map(str::parse).transpose()
    }
}
