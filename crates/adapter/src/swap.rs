use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fee tiers accepted by the production router.
pub const ALLOWED_FEE_TIERS: [u32; 3] = [500, 3_000, 10_000];

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("adapter not configured")]
    NotConfigured,

    #[error("unauthorized swap caller: {caller}")]
    UnauthorizedCaller { caller: String },

    #[error("output below minimum: realized {realized}, minimum {min}")]
    OutputBelowMinimum { realized: u128, min: u128 },

    #[error("swap failed: {0}")]
    SwapFailed(String),
}

/// Router and asset parameters shared by all adapter variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Router identity the swap executes against
    pub router: String,

    /// Denom spent by the batch (the aggregated input asset)
    pub quote_denom: String,

    /// Denom delivered to the engine (the claimable output asset)
    pub base_denom: String,

    /// Pool fee tier, one of [`ALLOWED_FEE_TIERS`]
    pub fee_tier: u32,
}

impl AdapterConfig {
    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.router.is_empty() {
            return Err(AdapterError::InvalidConfiguration(
                "router must not be empty".to_string(),
            ));
        }
        if self.quote_denom.is_empty() || self.base_denom.is_empty() {
            return Err(AdapterError::InvalidConfiguration(
                "quote and base denoms must not be empty".to_string(),
            ));
        }
        if !ALLOWED_FEE_TIERS.contains(&self.fee_tier) {
            return Err(AdapterError::InvalidConfiguration(format!(
                "unsupported fee tier: {}",
                self.fee_tier
            )));
        }
        Ok(())
    }
}

/// Capability interface over the external asset-exchange mechanism.
///
/// Implementations are shared behind `Arc<dyn SwapAdapter>`; the engine
/// treats every `swap` call as untrusted external code.
#[async_trait]
pub trait SwapAdapter: Send + Sync {
    /// Administrator-time setup. Rejects unsupported fee tiers and empty
    /// identities with `InvalidConfiguration`.
    fn configure(&self, config: AdapterConfig) -> Result<(), AdapterError>;

    /// Restrict which caller may invoke `swap`.
    fn set_batcher(&self, batcher: &str);

    /// Current configuration, if any. The original deployment tooling reads
    /// this back after configuring.
    fn config(&self) -> Option<AdapterConfig>;

    /// Swap `amount_in` of the quote denom for the base denom and return the
    /// realized output. All-or-nothing: a realized output below
    /// `min_amount_out` fails the whole call and moves no assets.
    async fn swap(
        &self,
        caller: &str,
        amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fee_tier: u32) -> AdapterConfig {
        AdapterConfig {
            router: "router-1".to_string(),
            quote_denom: "usdc".to_string(),
            base_denom: "weth".to_string(),
            fee_tier,
        }
    }

    #[test]
    fn accepts_known_fee_tiers() {
        for tier in ALLOWED_FEE_TIERS {
            assert!(config(tier).validate().is_ok());
        }
    }

    #[test]
    fn rejects_unknown_fee_tier() {
        assert!(matches!(
            config(1_234).validate(),
            Err(AdapterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_empty_identities() {
        let mut cfg = config(3_000);
        cfg.router = String::new();
        assert!(cfg.validate().is_err());

        let mut cfg = config(3_000);
        cfg.base_denom = String::new();
        assert!(cfg.validate().is_err());
    }
}
