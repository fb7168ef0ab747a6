//! Adversarial tests: malicious custody and adapter implementations that call
//! back into the engine while it is mid-operation. The engine must fail every
//! nested call with `Reentrant` while the outer call completes and pays out
//! exactly once.

use async_trait::async_trait;
use cipher_dca_adapter::{
    AdapterConfig, AdapterError, AssetCustody, CustodyError, InMemoryBank, MockAdapter,
    SwapAdapter,
};
use cipher_dca_engine::{BatchEngine, EngineConfig, EngineError, EngineParams, ManualClock};
use cipher_dca_ledger::IntentLedger;
use cipher_dca_types::{BatchState, EncryptedPayload, IntentId};
use cosmwasm_std::Uint128;
use std::sync::{Arc, Mutex, RwLock};

const ADMIN: &str = "admin";
const BATCHER: &str = "batcher";
const RELAYER: &str = "relayer";

// ═══════════════════════════════════════════════════════════════════════════
// MALICIOUS DOUBLES
// ═══════════════════════════════════════════════════════════════════════════

/// Custody implementation that re-enters `claim` from inside the payout
/// transfer, then performs the real transfer.
struct ReenteringBank {
    inner: InMemoryBank,
    engine: RwLock<Option<Arc<BatchEngine>>>,
    /// (caller, batch_id, intent_id) to replay from inside `transfer`
    attack: RwLock<Option<(String, u64, IntentId)>>,
    observed: Mutex<Vec<EngineError>>,
}

impl ReenteringBank {
    fn new() -> Self {
        Self {
            inner: InMemoryBank::new(),
            engine: RwLock::new(None),
            attack: RwLock::new(None),
            observed: Mutex::new(Vec::new()),
        }
    }

    fn arm(&self, engine: Arc<BatchEngine>, caller: &str, batch_id: u64, intent_id: IntentId) {
        *self.engine.write().unwrap() = Some(engine);
        *self.attack.write().unwrap() = Some((caller.to_string(), batch_id, intent_id));
    }

    fn observed(&self) -> Vec<EngineError> {
        std::mem::take(&mut self.observed.lock().unwrap())
    }
}

#[async_trait]
impl AssetCustody for ReenteringBank {
    async fn balance_of(&self, denom: &str, account: &str) -> u128 {
        self.inner.balance_of(denom, account).await
    }

    async fn transfer(
        &self,
        denom: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), CustodyError> {
        let engine = self.engine.read().unwrap().clone();
        let attack = self.attack.write().unwrap().take();
        if let (Some(engine), Some((caller, batch_id, intent_id))) = (engine, attack) {
            let nested = engine.claim(&caller, batch_id, intent_id).await;
            self.observed
                .lock()
                .unwrap()
                .push(nested.expect_err("nested claim must be rejected"));
        }
        self.inner.transfer(denom, from, to, amount).await
    }
}

/// What a malicious adapter tries to re-enter while the engine awaits its
/// swap.
enum ReenterTarget {
    Join { caller: String, intent_id: IntentId },
    SubmitResult { batch_id: u64 },
}

/// Adapter that calls back into the engine from inside `swap`, then reports a
/// 1:1 fill without moving any assets.
struct ReenterAdapter {
    engine: RwLock<Option<Arc<BatchEngine>>>,
    target: RwLock<Option<ReenterTarget>>,
    observed: Mutex<Vec<EngineError>>,
}

impl ReenterAdapter {
    fn new() -> Self {
        Self {
            engine: RwLock::new(None),
            target: RwLock::new(None),
            observed: Mutex::new(Vec::new()),
        }
    }

    fn arm(&self, engine: Arc<BatchEngine>, target: ReenterTarget) {
        *self.engine.write().unwrap() = Some(engine);
        *self.target.write().unwrap() = Some(target);
    }

    fn observed(&self) -> Vec<EngineError> {
        std::mem::take(&mut self.observed.lock().unwrap())
    }
}

#[async_trait]
impl SwapAdapter for ReenterAdapter {
    fn configure(&self, _config: AdapterConfig) -> Result<(), AdapterError> {
        Ok(())
    }

    fn set_batcher(&self, _batcher: &str) {}

    fn config(&self) -> Option<AdapterConfig> {
        None
    }

    async fn swap(
        &self,
        _caller: &str,
        amount_in: u128,
        _min_amount_out: u128,
    ) -> Result<u128, AdapterError> {
        let engine = self.engine.read().unwrap().clone();
        let target = self.target.write().unwrap().take();
        if let (Some(engine), Some(target)) = (engine, target) {
            let nested = match target {
                ReenterTarget::Join { caller, intent_id } => {
                    engine.join(&caller, intent_id).map(|_| ())
                }
                ReenterTarget::SubmitResult { batch_id } => engine
                    .submit_decryption_result(
                        RELAYER,
                        batch_id,
                        Uint128::new(amount_in),
                        Uint128::zero(),
                    )
                    .await
                    .map(|_| ()),
            };
            self.observed
                .lock()
                .unwrap()
                .push(nested.expect_err("nested call must be rejected"));
        }
        Ok(amount_in)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SETUP
// ═══════════════════════════════════════════════════════════════════════════

fn engine_with(
    adapter: Arc<dyn SwapAdapter>,
    custody: Arc<dyn AssetCustody>,
    k_target: u32,
) -> (Arc<BatchEngine>, Arc<RwLock<IntentLedger>>) {
    let ledger = Arc::new(RwLock::new(IntentLedger::new()));
    let engine = Arc::new(
        BatchEngine::new(
            EngineConfig {
                admin: ADMIN.to_string(),
                account: BATCHER.to_string(),
                base_denom: "weth".to_string(),
                params: EngineParams {
                    k_target,
                    dt_seconds: 3_600,
                },
            },
            ledger.clone(),
            adapter,
            custody,
            Arc::new(ManualClock::new(1_000)),
        )
        .unwrap(),
    );
    engine.set_relayer(ADMIN, RELAYER).unwrap();
    (engine, ledger)
}

fn submit(ledger: &Arc<RwLock<IntentLedger>>, owner: &str, tag: u8) -> IntentId {
    ledger.write().unwrap().submit(
        owner,
        EncryptedPayload::new(vec![tag], vec![tag], vec![tag], vec![tag], Vec::<u8>::new()),
        1_000,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn reentrant_claim_is_blocked_while_outer_claim_pays_once() {
    let bank = Arc::new(InMemoryBank::new());
    let custody = Arc::new(ReenteringBank::new());
    let adapter = Arc::new(MockAdapter::new(bank.clone(), "mock-adapter"));
    adapter
        .configure(AdapterConfig {
            router: "mock-router".to_string(),
            quote_denom: "usdc".to_string(),
            base_denom: "weth".to_string(),
            fee_tier: 3_000,
        })
        .unwrap();
    adapter.set_batcher(BATCHER);

    let (engine, ledger) = engine_with(adapter, custody.clone(), 2);

    let id1 = submit(&ledger, "alice", 1);
    let id2 = submit(&ledger, "bob", 2);
    engine.join("alice", id1).unwrap();
    engine.join("bob", id2).unwrap();

    // the mock adapter pays output into its own bank, not the reentering
    // custody; fund the engine account on the custody the engine pays from
    bank.mint("usdc", "mock-adapter", 2_000_000);
    custody.inner.mint("weth", BATCHER, 2_000_000);

    engine
        .submit_decryption_result(RELAYER, 0, Uint128::new(2_000_000), Uint128::zero())
        .await
        .unwrap();

    // re-enter claim(0, id1) from inside the payout transfer of claim(0, id1)
    custody.arm(engine.clone(), "alice", 0, id1);

    let share = engine.claim("alice", 0, id1).await.unwrap();
    assert_eq!(share, Uint128::new(1_000_000));

    let observed = custody.observed();
    assert_eq!(observed.len(), 1);
    assert!(matches!(observed[0], EngineError::Reentrant));

    // paid exactly once despite the nested attempt
    assert_eq!(custody.balance_of("weth", "alice").await, 1_000_000);
    assert!(engine.is_claimed(0, id1));

    // and the pair is spent for good
    assert!(matches!(
        engine.claim("alice", 0, id1).await,
        Err(EngineError::AlreadyClaimed { .. })
    ));
    assert_eq!(custody.balance_of("weth", "alice").await, 1_000_000);
}

#[tokio::test]
async fn nested_join_during_swap_is_blocked() {
    let adapter = Arc::new(ReenterAdapter::new());
    let custody = Arc::new(InMemoryBank::new());
    let (engine, ledger) = engine_with(adapter.clone(), custody, 1);

    let id1 = submit(&ledger, "alice", 1);
    let id2 = submit(&ledger, "bob", 2);
    engine.join("alice", id1).unwrap();

    adapter.arm(
        engine.clone(),
        ReenterTarget::Join {
            caller: "bob".to_string(),
            intent_id: id2,
        },
    );

    engine
        .submit_decryption_result(RELAYER, 0, Uint128::new(1_000_000), Uint128::zero())
        .await
        .unwrap();

    let observed = adapter.observed();
    assert_eq!(observed.len(), 1);
    assert!(matches!(observed[0], EngineError::Reentrant));

    // the rejected join left no trace; bob can join normally afterwards
    assert!(engine.intent_status(id2).unwrap() == cipher_dca_types::IntentStatus::Unassigned);
    engine.join("bob", id2).unwrap();
}

#[tokio::test]
async fn nested_settlement_submission_is_blocked() {
    let adapter = Arc::new(ReenterAdapter::new());
    let custody = Arc::new(InMemoryBank::new());
    let (engine, ledger) = engine_with(adapter.clone(), custody, 1);

    let id1 = submit(&ledger, "alice", 1);
    engine.join("alice", id1).unwrap();

    adapter.arm(engine.clone(), ReenterTarget::SubmitResult { batch_id: 0 });

    let out = engine
        .submit_decryption_result(RELAYER, 0, Uint128::new(1_000_000), Uint128::zero())
        .await
        .unwrap();
    assert_eq!(out, Uint128::new(1_000_000));

    let observed = adapter.observed();
    assert_eq!(observed.len(), 1);
    assert!(matches!(observed[0], EngineError::Reentrant));

    // executed exactly once, with the outer call's result
    let batch = engine.batch(0).unwrap();
    assert_eq!(batch.state, BatchState::Executed);
    assert_eq!(batch.amount_out, Uint128::new(1_000_000));
}
