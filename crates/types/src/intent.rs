use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;
use sha2::{Digest, Sha256};

use crate::BatchId;

/// Unique intent identifier. Ids are issued sequentially starting at 1;
/// id 0 is never valid.
pub type IntentId = u64;

/// The five ciphertext slots of a submitted trade intent.
///
/// The engine never interprets these fields; they are opaque handles produced
/// by the client-side encryption layer and only decrypted, in aggregate, by
/// the external gateway.
#[cw_serde]
pub struct EncryptedPayload {
    /// Total spendable budget ciphertext
    pub budget: Binary,

    /// Per-period purchase amount ciphertext
    pub per_period: Binary,

    /// Purchase cadence ciphertext
    pub period: Binary,

    /// Minimum acceptable output ciphertext
    pub min_out: Binary,

    /// Client attestation blob (may be empty)
    pub proof: Binary,
}

impl EncryptedPayload {
    pub fn new(
        budget: impl Into<Binary>,
        per_period: impl Into<Binary>,
        period: impl Into<Binary>,
        min_out: impl Into<Binary>,
        proof: impl Into<Binary>,
    ) -> Self {
        Self {
            budget: budget.into(),
            per_period: per_period.into(),
            period: period.into(),
            min_out: min_out.into(),
            proof: proof.into(),
        }
    }

    /// The payload's ciphertext fields in canonical submission order.
    pub fn fields(&self) -> [&Binary; 5] {
        [
            &self.budget,
            &self.per_period,
            &self.period,
            &self.min_out,
            &self.proof,
        ]
    }

    /// In-order concatenation of all ciphertext fields, used when building a
    /// batch's aggregate ciphertext.
    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for field in self.fields() {
            out.extend_from_slice(field.as_slice());
        }
        out
    }

    /// Short hex digest of the payload for log lines. Never used for
    /// authentication.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for field in self.fields() {
            hasher.update(field.as_slice());
        }
        let digest: [u8; 32] = hasher.finalize().into();
        hex::encode(&digest[..8])
    }
}

/// An intent as recorded by the ledger: identity, ownership, and the verbatim
/// encrypted payload.
#[cw_serde]
pub struct IntentRecord {
    pub id: IntentId,
    pub owner: String,
    pub payload: EncryptedPayload,
    pub submitted_at: u64,
}

/// Batch-membership status of an intent, as derived by the engine.
#[cw_serde]
pub enum IntentStatus {
    /// Submitted to the ledger but never joined into a batch
    Unassigned,

    /// Member of a batch that has not yet been claimed against
    Queued { batch_id: BatchId },

    /// The intent's batch executed and its share was claimed
    Settled { batch_id: BatchId },
}
