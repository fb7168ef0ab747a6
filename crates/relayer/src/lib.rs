//! Relayer: the external process that observes the engine's decryption
//! requests, drives the off-engine aggregation/decryption step through a
//! [`DecryptionGateway`], and submits the plaintext totals back to the
//! engine.

mod backoff;
mod gateway;
mod service;

pub use backoff::ExponentialBackoff;
pub use gateway::{DecryptedBatchTotal, DecryptionGateway, GatewayError, MockGateway};
pub use service::{RelayerService, RelayerServiceConfig};

use cipher_dca_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayerError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("result submission failed: {0}")]
    Submit(#[from] EngineError),

    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}
