use cipher_dca_adapter::{AdapterError, CustodyError};
use cipher_dca_ledger::LedgerError;
use cipher_dca_types::{BatchId, BatchState, IntentId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not owner")]
    NotOwner,

    #[error("unknown intent: {0}")]
    UnknownIntent(IntentId),

    #[error("intent already queued: {intent_id}")]
    AlreadyQueued { intent_id: IntentId },

    #[error("engine paused")]
    Paused,

    #[error("caller is not the configured relayer")]
    NotRelayer,

    #[error("unknown batch: {0}")]
    UnknownBatch(BatchId),

    #[error("invalid batch state: batch {batch_id} is {state}")]
    InvalidBatchState { batch_id: BatchId, state: BatchState },

    #[error("adapter swap failed: {0}")]
    AdapterSwapFailed(#[from] AdapterError),

    #[error("batch not executed: {batch_id}")]
    BatchNotExecuted { batch_id: BatchId },

    #[error("intent {intent_id} is not a member of batch {batch_id}")]
    NotBatchMember {
        batch_id: BatchId,
        intent_id: IntentId,
    },

    #[error("already claimed: batch {batch_id}, intent {intent_id}")]
    AlreadyClaimed {
        batch_id: BatchId,
        intent_id: IntentId,
    },

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("reentrant call")]
    Reentrant,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("claim transfer failed: {0}")]
    TransferFailed(#[from] CustodyError),
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownIntent(id) => EngineError::UnknownIntent(id),
        }
    }
}

impl EngineError {
    /// Whether the caller may retry the same call later. Terminal kinds will
    /// never succeed no matter how often they are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::AdapterSwapFailed(_)
                | EngineError::Reentrant
                | EngineError::TransferFailed(_)
                | EngineError::Paused
        )
    }
}
