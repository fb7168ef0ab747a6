use cipher_dca_engine::BatchEngine;
use cipher_dca_types::{BatchId, EngineEvent, IntentId};
use cosmwasm_std::{Binary, Uint128};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{DecryptionGateway, ExponentialBackoff, RelayerError};

#[derive(Clone, Debug)]
pub struct RelayerServiceConfig {
    /// Identity this service submits results under; must match the engine's
    /// configured relayer
    pub identity: String,

    /// Attempts per decryption request before giving up
    pub max_attempts: u32,

    pub retry_initial: Duration,
    pub retry_max: Duration,
}

impl RelayerServiceConfig {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            max_attempts: 5,
            retry_initial: Duration::from_millis(100),
            retry_max: Duration::from_secs(30),
        }
    }
}

/// Drives the engine's decryption-request events through the gateway and back
/// into `submit_decryption_result`, retrying retryable failures.
pub struct RelayerService {
    engine: Arc<BatchEngine>,
    gateway: Arc<dyn DecryptionGateway>,
    config: RelayerServiceConfig,
}

impl RelayerService {
    pub fn new(
        engine: Arc<BatchEngine>,
        gateway: Arc<dyn DecryptionGateway>,
        config: RelayerServiceConfig,
    ) -> Self {
        Self {
            engine,
            gateway,
            config,
        }
    }

    /// Consume engine events until the channel closes. Handling failures are
    /// logged, never fatal; a stuck batch stays retryable by operators.
    pub async fn run(&self) -> Result<(), RelayerError> {
        let mut events = self.engine.subscribe();
        info!(identity = %self.config.identity, "relayer listening");
        loop {
            match events.recv().await {
                Ok(EngineEvent::DecryptionRequested {
                    batch_id,
                    aggregate_ciphertext,
                    intent_ids,
                }) => {
                    if let Err(err) = self
                        .handle_request(batch_id, &aggregate_ciphertext, &intent_ids)
                        .await
                    {
                        error!(batch_id, error = %err, "decryption request handling failed");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged; requests may need manual replay");
                }
                Err(RecvError::Closed) => {
                    info!("engine event channel closed; relayer stopping");
                    return Ok(());
                }
            }
        }
    }

    /// Decrypt one batch's aggregate and submit the result, with backoff on
    /// retryable engine failures. Returns the realized swap output.
    pub async fn handle_request(
        &self,
        batch_id: BatchId,
        aggregate: &Binary,
        intent_ids: &[IntentId],
    ) -> Result<Uint128, RelayerError> {
        info!(
            batch_id,
            members = intent_ids.len(),
            "decryption requested"
        );
        let totals = self
            .gateway
            .decrypt_aggregate(batch_id, aggregate, intent_ids)
            .await?;

        let mut backoff =
            ExponentialBackoff::new(self.config.retry_initial, self.config.retry_max);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .engine
                .submit_decryption_result(
                    &self.config.identity,
                    batch_id,
                    totals.total_in,
                    totals.min_out_hint,
                )
                .await
            {
                Ok(amount_out) => {
                    info!(batch_id, amount_out = %amount_out, "batch settled");
                    return Ok(amount_out);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = backoff.next_delay();
                    warn!(
                        batch_id,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retryable settlement failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_retryable() => {
                    return Err(RelayerError::RetriesExhausted {
                        attempts: attempt,
                        last_error: err.to_string(),
                    });
                }
                Err(err) => return Err(RelayerError::Submit(err)),
            }
        }
    }
}
