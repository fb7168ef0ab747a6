use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::{AdapterConfig, AdapterError, SwapAdapter};

/// Production adapter that executes swaps through an external execution
/// endpoint fronting the v3 router.
///
/// The endpoint owns transaction submission and confirmation; this client
/// only carries the configured router/asset/fee parameters and re-checks the
/// minimum-output bound on the reported result.
pub struct UniswapAdapter {
    execution_url: String,
    client: reqwest::Client,
    config: RwLock<Option<AdapterConfig>>,
    batcher: RwLock<Option<String>>,
}

#[derive(Serialize)]
struct SwapRequest<'a> {
    router: &'a str,
    token_in: &'a str,
    token_out: &'a str,
    fee: u32,
    amount_in: u128,
    min_amount_out: u128,
    recipient: &'a str,
}

#[derive(Deserialize)]
struct SwapResponse {
    amount_out: u128,
}

impl UniswapAdapter {
    pub fn new(execution_url: impl Into<String>) -> Self {
        Self {
            execution_url: execution_url.into(),
            client: reqwest::Client::new(),
            config: RwLock::new(None),
            batcher: RwLock::new(None),
        }
    }
}

#[async_trait]
impl SwapAdapter for UniswapAdapter {
    fn configure(&self, config: AdapterConfig) -> Result<(), AdapterError> {
        config.validate()?;
        debug!(
            router = %config.router,
            fee_tier = config.fee_tier,
            "adapter configured"
        );
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

        let request = SwapRequest {
            router: &config.router,
            token_in: &config.quote_denom,
            token_out: &config.base_denom,
            fee: config.fee_tier,
            amount_in,
            min_amount_out,
            recipient: caller,
        };

        let response = self
            .client
            .post(format!("{}/swap", self.execution_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AdapterError::SwapFailed(format!("execution request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, "execution endpoint rejected swap");
            return Err(AdapterError::SwapFailed(format!(
                "execution endpoint returned {status}: {body}"
            )));
        }

        let result: SwapResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::SwapFailed(format!("malformed execution response: {e}")))?;

        // the endpoint enforces the bound on-path; re-check so a misbehaving
        // endpoint cannot under-deliver silently
        if result.amount_out < min_amount_out {
            return Err(AdapterError::OutputBelowMinimum {
                realized: result.amount_out,
                min: min_amount_out,
            });
        }

        debug!(amount_in, amount_out = result.amount_out, "swap executed");
        Ok(result.amount_out)
    }
}
