use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use std::fmt;

use crate::IntentId;

/// Sequential batch identifier, starting at 0.
pub type BatchId = u64;

/// Lifecycle state of a batch. Transitions are strictly
/// `Open -> AwaitingSettlement -> Executed`; no state is ever skipped or
/// re-entered.
#[cw_serde]
pub enum BatchState {
    /// Accepting joins
    Open,

    /// Membership frozen; a decryption request has been emitted and the
    /// engine is waiting for the relayer's result
    AwaitingSettlement,

    /// The net swap ran and the output amount is recorded
    Executed,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Open => write!(f, "open"),
            BatchState::AwaitingSettlement => write!(f, "awaiting_settlement"),
            BatchState::Executed => write!(f, "executed"),
        }
    }
}

/// A group of intents settled together as one net swap.
#[cw_serde]
pub struct Batch {
    pub id: BatchId,

    /// Member intent ids in join order, no duplicates. Frozen once the batch
    /// leaves `Open`.
    pub members: Vec<IntentId>,

    pub created_at: u64,
    pub state: BatchState,

    /// Aggregate input reported by the relayer; zero until executed
    pub total_in: Uint128,

    /// Realized swap output; zero until executed
    pub amount_out: Uint128,
}

impl Batch {
    /// A fresh batch in the `Open` state.
    pub fn open(id: BatchId, created_at: u64) -> Self {
        Self {
            id,
            members: Vec::new(),
            created_at,
            state: BatchState::Open,
            total_in: Uint128::zero(),
            amount_out: Uint128::zero(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, intent_id: IntentId) -> bool {
        self.members.contains(&intent_id)
    }

    /// Count trigger: the batch reached its target size.
    pub fn count_trigger(&self, k_target: u32) -> bool {
        self.members.len() as u64 >= u64::from(k_target)
    }

    /// Age trigger: the batch has members and its fallback window elapsed.
    pub fn age_trigger(&self, dt_seconds: u64, now: u64) -> bool {
        !self.members.is_empty() && now.saturating_sub(self.created_at) >= dt_seconds
    }

    /// Per-member payout: floor(output / member count). Zero for an empty
    /// batch.
    pub fn share(&self) -> Uint128 {
        let n = self.members.len() as u128;
        if n == 0 {
            return Uint128::zero();
        }
        self.amount_out
            .checked_div(Uint128::new(n))
            .unwrap_or_default()
    }

    /// Floor-division residual that stays in engine custody after every
    /// member claims.
    pub fn dust(&self) -> Uint128 {
        let paid = self
            .share()
            .checked_mul(Uint128::new(self.members.len() as u128))
            .unwrap_or_default();
        self.amount_out.saturating_sub(paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executed(members: u64, amount_out: u128) -> Batch {
        let mut batch = Batch::open(0, 0);
        batch.members = (1..=members).collect();
        batch.state = BatchState::Executed;
        batch.amount_out = Uint128::new(amount_out);
        batch
    }

    #[test]
    fn share_is_floor_division() {
        let batch = executed(3, 1_000_000);
        assert_eq!(batch.share(), Uint128::new(333_333));
        assert_eq!(batch.dust(), Uint128::new(1));
    }

    #[test]
    fn even_split_leaves_no_dust() {
        let batch = executed(2, 2_000_000);
        assert_eq!(batch.share(), Uint128::new(1_000_000));
        assert_eq!(batch.dust(), Uint128::zero());
    }

    #[test]
    fn empty_batch_share_is_zero() {
        let batch = executed(0, 1_000_000);
        assert_eq!(batch.share(), Uint128::zero());
    }

    #[test]
    fn count_trigger_fires_at_target() {
        let mut batch = Batch::open(0, 100);
        batch.members = vec![1];
        assert!(!batch.count_trigger(2));
        batch.members.push(2);
        assert!(batch.count_trigger(2));
    }

    #[test]
    fn age_trigger_requires_members() {
        let mut batch = Batch::open(0, 100);
        assert!(!batch.age_trigger(60, 1_000));
        batch.members.push(1);
        assert!(!batch.age_trigger(60, 159));
        assert!(batch.age_trigger(60, 160));
    }
}
