use async_trait::async_trait;
use cipher_dca_types::{BatchId, IntentId};
use cosmwasm_std::{Binary, Uint128};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Plaintext totals recovered from a batch's aggregate ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptedBatchTotal {
    /// Sum of member input amounts, in quote-denom units
    pub total_in: Uint128,

    /// Minimum acceptable swap output for the whole batch
    pub min_out_hint: Uint128,
}

/// Seam to the external decryption machinery. How the aggregate is actually
/// decrypted is outside this system; the relayer only consumes the totals.
#[async_trait]
pub trait DecryptionGateway: Send + Sync {
    async fn decrypt_aggregate(
        &self,
        batch_id: BatchId,
        aggregate: &Binary,
        intent_ids: &[IntentId],
    ) -> Result<DecryptedBatchTotal, GatewayError>;
}

/// Stand-in gateway that prices every member at a fixed per-member amount
/// with no output floor.
pub struct MockGateway {
    per_member: u128,
}

impl MockGateway {
    pub fn new(per_member: u128) -> Self {
        Self { per_member }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        // 1 quote unit at 6 decimals per member
        Self::new(1_000_000)
    }
}

#[async_trait]
impl DecryptionGateway for MockGateway {
    async fn decrypt_aggregate(
        &self,
        _batch_id: BatchId,
        _aggregate: &Binary,
        intent_ids: &[IntentId],
    ) -> Result<DecryptedBatchTotal, GatewayError> {
        let total = self.per_member.saturating_mul(intent_ids.len() as u128);
        Ok(DecryptedBatchTotal {
            total_in: Uint128::new(total),
            min_out_hint: Uint128::zero(),
        })
    }
}
