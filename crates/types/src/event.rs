use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128};

use crate::{BatchId, IntentId};

/// Observable engine events. `DecryptionRequested` is the sole contract
/// between the engine and the off-engine aggregation pipeline; everything
/// else is informational.
#[cw_serde]
pub enum EngineEvent {
    /// An open batch closed for new members
    BatchReady {
        batch_id: BatchId,
        member_count: u64,
    },

    /// Emitted exactly once per batch, atomically with `BatchReady`. Carries
    /// everything the relayer needs to run the external decryption step.
    DecryptionRequested {
        batch_id: BatchId,
        aggregate_ciphertext: Binary,
        intent_ids: Vec<IntentId>,
    },

    /// The relayer's result was accepted and the net swap completed
    BatchExecuted {
        batch_id: BatchId,
        total_in: Uint128,
        amount_out: Uint128,
    },

    /// An administrator changed engine configuration
    ConfigUpdated { field: String },
}
