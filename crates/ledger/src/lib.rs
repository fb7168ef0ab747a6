//! Thin identity-and-ownership store for encrypted trade intents.
//!
//! The ledger issues monotonically increasing ids, records each intent's
//! owner and opaque payload verbatim, and nothing else; all batching logic
//! lives in the engine.

use std::collections::HashMap;

use cipher_dca_types::{EncryptedPayload, IntentId, IntentRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unknown intent: {0}")]
    UnknownIntent(IntentId),
}

#[derive(Debug)]
pub struct IntentLedger {
    intents: HashMap<IntentId, IntentRecord>,
    next_id: IntentId,
}

impl IntentLedger {
    pub fn new() -> Self {
        Self {
            intents: HashMap::new(),
            next_id: 1,
        }
    }

    /// Record a new intent and return its id. The payload is stored verbatim;
    /// its content is meaningless to the ledger.
    pub fn submit(
        &mut self,
        owner: impl Into<String>,
        payload: EncryptedPayload,
        now: u64,
    ) -> IntentId {
        let id = self.next_id;
        self.next_id += 1;
        self.intents.insert(
            id,
            IntentRecord {
                id,
                owner: owner.into(),
                payload,
                submitted_at: now,
            },
        );
        id
    }

    pub fn owner_of(&self, id: IntentId) -> Result<&str, LedgerError> {
        self.intents
            .get(&id)
            .map(|record| record.owner.as_str())
            .ok_or(LedgerError::UnknownIntent(id))
    }

    pub fn get(&self, id: IntentId) -> Option<&IntentRecord> {
        self.intents.get(&id)
    }

    /// The id the next `submit` will return. Exposed so external bookkeeping
    /// can correlate submission order to ids.
    pub fn next_id(&self) -> IntentId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

impl Default for IntentLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(tag: u8) -> EncryptedPayload {
        EncryptedPayload::new(
            vec![tag],
            vec![tag, 1],
            vec![tag, 2],
            vec![tag, 3],
            Vec::<u8>::new(),
        )
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut ledger = IntentLedger::new();
        assert_eq!(ledger.next_id(), 1);
        assert_eq!(ledger.submit("alice", payload(1), 100), 1);
        assert_eq!(ledger.submit("bob", payload(2), 101), 2);
        assert_eq!(ledger.next_id(), 3);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn owner_lookup() {
        let mut ledger = IntentLedger::new();
        let id = ledger.submit("alice", payload(1), 100);
        assert_eq!(ledger.owner_of(id).unwrap(), "alice");
        assert!(matches!(
            ledger.owner_of(99),
            Err(LedgerError::UnknownIntent(99))
        ));
    }

    #[test]
    fn payload_is_stored_verbatim() {
        let mut ledger = IntentLedger::new();
        let original = payload(7);
        let id = ledger.submit("alice", original.clone(), 100);
        let record = ledger.get(id).unwrap();
        assert_eq!(record.payload, original);
        assert_eq!(record.submitted_at, 100);
    }

    #[test]
    fn id_zero_is_never_issued() {
        let ledger = IntentLedger::new();
        assert!(ledger.owner_of(0).is_err());
    }
}
