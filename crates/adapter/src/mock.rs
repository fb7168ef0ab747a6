use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::{AdapterConfig, AdapterError, AssetCustody, InMemoryBank, SwapAdapter};

/// Test-double adapter backed by the in-memory bank.
///
/// Mirrors the behavior of the production path at a fixed exchange rate:
/// consumes its own quote-denom inventory and credits the base denom to the
/// configured batcher account. The inventory must be funded up front with
/// [`InMemoryBank::mint`].
pub struct MockAdapter {
    bank: Arc<InMemoryBank>,

    /// Custody account holding this adapter's quote inventory
    account: String,

    config: RwLock<Option<AdapterConfig>>,
    batcher: RwLock<Option<String>>,

    /// Base units produced per quote unit consumed
    rate: RwLock<Decimal>,

    fail_next: AtomicBool,
}

impl MockAdapter {
    pub fn new(bank: Arc<InMemoryBank>, account: impl Into<String>) -> Self {
        Self {
            bank,
            account: account.into(),
            config: RwLock::new(None),
            batcher: RwLock::new(None),
            rate: RwLock::new(Decimal::ONE),
            fail_next: AtomicBool::new(false),
        }
    }

    /// The custody account whose quote inventory backs swaps.
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn set_rate(&self, rate: Decimal) {
        *self.rate.write().unwrap() = rate;
    }

    /// Make the next `swap` call fail, for retry scenarios.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn quote(&self, amount_in: u128) -> Result<u128, AdapterError> {
        let rate = *self.rate.read().unwrap();
        let input = Decimal::from_i128_with_scale(amount_in as i128, 0);
        let out = (input * rate).floor();
        out.to_u128()
            .ok_or_else(|| AdapterError::SwapFailed("output out of range".to_string()))
    }
}

#[async_trait]
impl SwapAdapter for MockAdapter {
    fn configure(&self, config: AdapterConfig) -> Result<(), AdapterError> {
        config.validate()?;
        *self.config.write().unwrap() = Some(config);
        Ok(())
    }

    fn set_batcher(&self, batcher: &str) {
        *self.batcher.write().unwrap() = Some(batcher.to_string());
    }

    fn config(&self) -> Option<AdapterConfig> {
        self.config.read().unwrap().clone()
    }

    async fn swap(
        &self,
        caller: &str,
        amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128, AdapterError> {
        match self.batcher.read().unwrap().as_deref() {
            Some(batcher) if batcher == caller => {}
            _ => {
                return Err(AdapterError::UnauthorizedCaller {
                    caller: caller.to_string(),
                })
            }
        }
        let config = self
            .config
            .read()
            .unwrap()
            .clone()
            .ok_or(AdapterError::NotConfigured)?;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AdapterError::SwapFailed("injected failure".to_string()));
        }

        let amount_out = self.quote(amount_in)?;
        if amount_out < min_amount_out {
            return Err(AdapterError::OutputBelowMinimum {
                realized: amount_out,
                min: min_amount_out,
            });
        }

        // all checks passed; move assets: quote inventory burns, base output
        // lands in the batcher's custody
        self.bank
            .burn(&config.quote_denom, &self.account, amount_in)
            .map_err(|e| AdapterError::SwapFailed(e.to_string()))?;
        self.bank.mint(&config.base_denom, caller, amount_out);

        debug!(amount_in, amount_out, "mock swap settled");
        Ok(amount_out)
    }
}
