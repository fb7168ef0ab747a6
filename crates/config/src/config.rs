//! Core configuration structures for the cipher-dca system

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Batch engine configuration
    pub engine: EngineSettings,

    /// Swap adapter configuration
    pub adapter: AdapterSettings,

    /// Relayer service configuration
    pub relayer: RelayerSettings,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            adapter: AdapterSettings::default(),
            relayer: RelayerSettings::default(),
            log_level: default_log_level(),
        }
    }
}

/// Batch engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Administrator identity
    pub admin: String,

    /// Custody account the engine settles and pays from
    pub account: String,

    /// Denom delivered to claimants
    pub base_denom: String,

    /// Member count that closes a batch
    #[serde(default = "default_k_target")]
    pub k_target: u32,

    /// Fallback batch age in seconds
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            admin: "admin".to_string(),
            account: "batcher".to_string(),
            base_denom: "weth".to_string(),
            k_target: default_k_target(),
            dt_seconds: default_dt_seconds(),
        }
    }
}

/// Which swap adapter variant to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterVariant {
    /// In-process test double
    Mock,
    /// Production execution-endpoint adapter
    Uniswap,
}

/// Swap adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSettings {
    pub variant: AdapterVariant,

    /// Router identity swaps execute against
    pub router: String,

    /// Execution endpoint URL (uniswap variant only)
    #[serde(default)]
    pub execution_url: String,

    /// Denom spent by batches
    pub quote_denom: String,

    /// Denom delivered to the engine
    pub base_denom: String,

    /// Pool fee tier (one of 500, 3000, 10000)
    #[serde(default = "default_fee_tier")]
    pub fee_tier: u32,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            variant: AdapterVariant::Mock,
            router: "mock-router".to_string(),
            execution_url: String::new(),
            quote_denom: "usdc".to_string(),
            base_denom: "weth".to_string(),
            fee_tier: default_fee_tier(),
        }
    }
}

/// Relayer service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayerSettings {
    /// Identity the relayer submits results under
    pub identity: String,

    /// Attempts per decryption request before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial retry delay in milliseconds
    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,

    /// Retry delay cap in milliseconds
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

impl Default for RelayerSettings {
    fn default() -> Self {
        Self {
            identity: "fhe-relayer".to_string(),
            max_attempts: default_max_attempts(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_k_target() -> u32 {
    10
}

fn default_dt_seconds() -> u64 {
    3_600
}

fn default_fee_tier() -> u32 {
    3_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_initial_ms() -> u64 {
    100
}

fn default_retry_max_ms() -> u64 {
    30_000
}
