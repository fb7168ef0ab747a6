use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("insufficient balance: account {account} holds {available}, needs {needed}")]
    InsufficientBalance {
        account: String,
        available: u128,
        needed: u128,
    },

    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

/// Asset custody seam. The engine pays claims through this interface, so the
/// transfer is external code from the engine's point of view and must be
/// treated as reentrancy-capable.
#[async_trait]
pub trait AssetCustody: Send + Sync {
    async fn balance_of(&self, denom: &str, account: &str) -> u128;

    async fn transfer(
        &self,
        denom: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), CustodyError>;
}

/// In-process balance book used by the mock stack and tests.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    balances: RwLock<HashMap<(String, String), u128>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air. Funding hook for scenarios; not
    /// part of the custody interface.
    pub fn mint(&self, denom: &str, account: &str, amount: u128) {
        let mut balances = self.balances.write().unwrap();
        let entry = balances
            .entry((denom.to_string(), account.to_string()))
            .or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove funds from an account, failing on shortfall.
    pub fn burn(&self, denom: &str, account: &str, amount: u128) -> Result<(), CustodyError> {
        let mut balances = self.balances.write().unwrap();
        let key = (denom.to_string(), account.to_string());
        let available = balances.get(&key).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                account: account.to_string(),
                available,
                needed: amount,
            });
        }
        balances.insert(key, available - amount);
        Ok(())
    }
}

#[async_trait]
impl AssetCustody for InMemoryBank {
    async fn balance_of(&self, denom: &str, account: &str) -> u128 {
        self.balances
            .read()
            .unwrap()
            .get(&(denom.to_string(), account.to_string()))
            .copied()
            .unwrap_or(0)
    }

    async fn transfer(
        &self,
        denom: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), CustodyError> {
        let mut balances = self.balances.write().unwrap();
        let from_key = (denom.to_string(), from.to_string());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                account: from.to_string(),
                available,
                needed: amount,
            });
        }
        balances.insert(from_key, available - amount);
        let to_entry = balances
            .entry((denom.to_string(), to.to_string()))
            .or_insert(0);
        *to_entry = to_entry.saturating_add(amount);
        Ok(())
    }
}
