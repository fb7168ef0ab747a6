//! Validation for loaded configurations
//!
//! Mirrors the engine's and adapter's own rules so a bad configuration fails
//! at load time with a named field instead of at the first operation.

use crate::{AdapterVariant, AppConfig, ConfigError, Result};

const ALLOWED_FEE_TIERS: [u32; 3] = [500, 3_000, 10_000];

pub fn validate(config: &AppConfig) -> Result<()> {
    if config.engine.admin.is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.admin must not be empty".to_string(),
        ));
    }
    if config.engine.account.is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.account must not be empty".to_string(),
        ));
    }
    if config.engine.base_denom.is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.base_denom must not be empty".to_string(),
        ));
    }
    if config.engine.k_target == 0 {
        return Err(ConfigError::ValidationError(
            "engine.k_target must be nonzero".to_string(),
        ));
    }

    if config.adapter.router.is_empty() {
        return Err(ConfigError::ValidationError(
            "adapter.router must not be empty".to_string(),
        ));
    }
    if config.adapter.quote_denom.is_empty() || config.adapter.base_denom.is_empty() {
        return Err(ConfigError::ValidationError(
            "adapter denoms must not be empty".to_string(),
        ));
    }
    if !ALLOWED_FEE_TIERS.contains(&config.adapter.fee_tier) {
        return Err(ConfigError::ValidationError(format!(
            "adapter.fee_tier must be one of 500, 3000, 10000, got {}",
            config.adapter.fee_tier
        )));
    }
    if config.adapter.variant == AdapterVariant::Uniswap && config.adapter.execution_url.is_empty()
    {
        return Err(ConfigError::ValidationError(
            "adapter.execution_url is required for the uniswap variant".to_string(),
        ));
    }
    if config.adapter.base_denom != config.engine.base_denom {
        return Err(ConfigError::ValidationError(format!(
            "adapter.base_denom ({}) must match engine.base_denom ({})",
            config.adapter.base_denom, config.engine.base_denom
        )));
    }

    if config.relayer.identity.is_empty() {
        return Err(ConfigError::ValidationError(
            "relayer.identity must not be empty".to_string(),
        ));
    }
    if config.relayer.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "relayer.max_attempts must be nonzero".to_string(),
        ));
    }

    Ok(())
}
