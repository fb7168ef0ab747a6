use cipher_dca_adapter::{AssetCustody, SwapAdapter};
use cipher_dca_ledger::IntentLedger;
use cipher_dca_types::{Batch, BatchId, BatchState, EngineEvent, IntentId, IntentStatus};
use cosmwasm_std::{Binary, Uint128};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::guard::ReentrancyGuard;
use crate::EngineError;

/// Batch-closing parameters, mutable through `set_params`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    /// Member count that closes a batch
    pub k_target: u32,

    /// Fallback age in seconds after which a non-empty batch closes even
    /// under target
    pub dt_seconds: u64,
}

/// Construction-time engine configuration. `admin` and `account` are fixed
/// for the engine's lifetime; everything else has an administrator setter.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Sole identity allowed to call the administrative setters
    pub admin: String,

    /// Custody account that receives swap output and pays claims
    pub account: String,

    /// Denom delivered to claimants
    pub base_denom: String,

    pub params: EngineParams,
}

struct EngineState {
    params: EngineParams,
    paused: bool,
    relayer: Option<String>,
    adapter: Arc<dyn SwapAdapter>,
    batches: Vec<Batch>,
    queued: HashMap<IntentId, BatchId>,
    claimed: HashSet<(BatchId, IntentId)>,
}

impl EngineState {
    fn current_id(&self) -> BatchId {
        // the last batch is always the open one
        self.batches.len() as BatchId - 1
    }
}

/// The core batch lifecycle and settlement state machine.
///
/// All mutating operations are lock-mutate-unlock critical sections; the
/// state mutex is never held across an await. `submit_decryption_result` and
/// `claim` additionally hold the reentrancy lock across their external calls,
/// so any call back into a guarded entry point while they run fails with
/// `Reentrant`.
pub struct BatchEngine {
    admin: String,
    account: String,
    base_denom: String,
    ledger: Arc<RwLock<IntentLedger>>,
    custody: Arc<dyn AssetCustody>,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
    guard: ReentrancyGuard,
    events: broadcast::Sender<EngineEvent>,
}

impl BatchEngine {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<RwLock<IntentLedger>>,
        adapter: Arc<dyn SwapAdapter>,
        custody: Arc<dyn AssetCustody>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        if config.params.k_target == 0 {
            return Err(EngineError::InvalidConfiguration(
                "k_target must be nonzero".to_string(),
            ));
        }
        let (events, _) = broadcast::channel(256);
        let genesis = Batch::open(0, clock.now());
        Ok(Self {
            admin: config.admin,
            account: config.account,
            base_denom: config.base_denom,
            ledger,
            custody,
            clock,
            state: Mutex::new(EngineState {
                params: config.params,
                paused: false,
                relayer: None,
                adapter,
                batches: vec![genesis],
                queued: HashMap::new(),
                claimed: HashSet::new(),
            }),
            guard: ReentrancyGuard::new(),
            events,
        })
    }

    /// The custody account this engine settles and pays from.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Subscribe to engine events. The relayer consumes
    /// `DecryptionRequested` from here.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BATCH OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Queue an owned intent into the current open batch, then evaluate the
    /// closing triggers. Returns the id of the batch joined.
    pub fn join(&self, caller: &str, intent_id: IntentId) -> Result<BatchId, EngineError> {
        self.ensure_not_entered()?;
        let now = self.clock.now();
        let ledger = self.ledger.read().unwrap();
        let mut state = self.state.lock().unwrap();

        if state.paused {
            return Err(EngineError::Paused);
        }
        let owner = ledger.owner_of(intent_id)?;
        if owner != caller {
            return Err(EngineError::NotOwner);
        }
        if state.queued.contains_key(&intent_id) {
            return Err(EngineError::AlreadyQueued { intent_id });
        }

        let state = &mut *state;
        let batch_id = state.current_id();
        let open = state.batches.last_mut().expect("open batch always exists");
        open.members.push(intent_id);
        state.queued.insert(intent_id, batch_id);
        debug!(intent_id, batch_id, "intent joined batch");

        self.evaluate_triggers(state, &ledger, now);
        Ok(batch_id)
    }

    /// Re-evaluate the age trigger without requiring a join. Returns whether
    /// a batch closed. Callable by anyone as a maintenance hook.
    pub fn poll_triggers(&self) -> Result<bool, EngineError> {
        self.ensure_not_entered()?;
        let now = self.clock.now();
        let ledger = self.ledger.read().unwrap();
        let mut state = self.state.lock().unwrap();

        if state.paused {
            return Err(EngineError::Paused);
        }
        Ok(self.evaluate_triggers(&mut state, &ledger, now))
    }

    /// Accept the relayer's decrypted aggregate for a batch awaiting
    /// settlement and convert it into the net swap. On adapter failure the
    /// batch stays `AwaitingSettlement` and the call is retryable.
    ///
    /// Deliberately not gated on pause: a stuck settlement may need to
    /// complete during an incident response.
    pub async fn submit_decryption_result(
        &self,
        caller: &str,
        batch_id: BatchId,
        total_in: Uint128,
        min_out_hint: Uint128,
    ) -> Result<Uint128, EngineError> {
        let _token = self.guard.try_enter().ok_or(EngineError::Reentrant)?;

        let adapter = {
            let state = self.state.lock().unwrap();
            match state.relayer.as_deref() {
                Some(relayer) if relayer == caller => {}
                _ => return Err(EngineError::NotRelayer),
            }
            let batch = state
                .batches
                .get(batch_id as usize)
                .ok_or(EngineError::UnknownBatch(batch_id))?;
            if batch.state != BatchState::AwaitingSettlement {
                return Err(EngineError::InvalidBatchState {
                    batch_id,
                    state: batch.state.clone(),
                });
            }
            state.adapter.clone()
        };

        let amount_out = match adapter
            .swap(&self.account, total_in.u128(), min_out_hint.u128())
            .await
        {
            Ok(out) => Uint128::new(out),
            Err(err) => {
                warn!(batch_id, error = %err, "adapter swap failed; batch stays awaiting");
                return Err(EngineError::AdapterSwapFailed(err));
            }
        };

        let mut state = self.state.lock().unwrap();
        let batch = &mut state.batches[batch_id as usize];
        batch.total_in = total_in;
        batch.amount_out = amount_out;
        batch.state = BatchState::Executed;
        info!(batch_id, total_in = %total_in, amount_out = %amount_out, "batch executed");
        self.emit(EngineEvent::BatchExecuted {
            batch_id,
            total_in,
            amount_out,
        });
        Ok(amount_out)
    }

    /// Pay out the caller's proportional share of an executed batch, exactly
    /// once per member intent. The claim mark is written strictly before the
    /// custody transfer; a failed transfer rolls the mark back so the call is
    /// all-or-nothing.
    pub async fn claim(
        &self,
        caller: &str,
        batch_id: BatchId,
        intent_id: IntentId,
    ) -> Result<Uint128, EngineError> {
        let _token = self.guard.try_enter().ok_or(EngineError::Reentrant)?;

        let share = {
            let ledger = self.ledger.read().unwrap();
            let mut state = self.state.lock().unwrap();

            let batch = state
                .batches
                .get(batch_id as usize)
                .ok_or(EngineError::UnknownBatch(batch_id))?;
            if batch.state != BatchState::Executed {
                return Err(EngineError::BatchNotExecuted { batch_id });
            }
            if !batch.contains(intent_id) {
                return Err(EngineError::NotBatchMember {
                    batch_id,
                    intent_id,
                });
            }
            if ledger.owner_of(intent_id)? != caller {
                return Err(EngineError::NotOwner);
            }
            if state.claimed.contains(&(batch_id, intent_id)) {
                return Err(EngineError::AlreadyClaimed {
                    batch_id,
                    intent_id,
                });
            }
            let share = batch.share();
            if share.is_zero() {
                return Err(EngineError::NothingToClaim);
            }
            state.claimed.insert((batch_id, intent_id));
            share
        };

        match self
            .custody
            .transfer(&self.base_denom, &self.account, caller, share.u128())
            .await
        {
            Ok(()) => {
                info!(batch_id, intent_id, share = %share, claimant = caller, "share claimed");
                Ok(share)
            }
            Err(err) => {
                // roll the mark back so the claim can be retried
                self.state
                    .lock()
                    .unwrap()
                    .claimed
                    .remove(&(batch_id, intent_id));
                warn!(batch_id, intent_id, error = %err, "claim transfer failed");
                Err(EngineError::TransferFailed(err))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_params(&self, caller: &str, params: EngineParams) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if params.k_target == 0 {
            return Err(EngineError::InvalidConfiguration(
                "k_target must be nonzero".to_string(),
            ));
        }
        self.state.lock().unwrap().params = params;
        info!(
            k_target = params.k_target,
            dt_seconds = params.dt_seconds,
            "engine params updated"
        );
        self.emit(EngineEvent::ConfigUpdated {
            field: "params".to_string(),
        });
        Ok(())
    }

    pub fn set_dex_adapter(
        &self,
        caller: &str,
        adapter: Arc<dyn SwapAdapter>,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.state.lock().unwrap().adapter = adapter;
        info!("dex adapter replaced");
        self.emit(EngineEvent::ConfigUpdated {
            field: "adapter".to_string(),
        });
        Ok(())
    }

    pub fn set_relayer(&self, caller: &str, relayer: impl Into<String>) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        let relayer = relayer.into();
        self.state.lock().unwrap().relayer = Some(relayer.clone());
        info!(%relayer, "relayer updated");
        self.emit(EngineEvent::ConfigUpdated {
            field: "relayer".to_string(),
        });
        Ok(())
    }

    pub fn set_paused(&self, caller: &str, paused: bool) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.state.lock().unwrap().paused = paused;
        info!(paused, "pause flag updated");
        self.emit(EngineEvent::ConfigUpdated {
            field: "paused".to_string(),
        });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VIEWS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn batch(&self, batch_id: BatchId) -> Option<Batch> {
        self.state
            .lock()
            .unwrap()
            .batches
            .get(batch_id as usize)
            .cloned()
    }

    pub fn current_batch_id(&self) -> BatchId {
        self.state.lock().unwrap().current_id()
    }

    pub fn params(&self) -> EngineParams {
        self.state.lock().unwrap().params
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn is_claimed(&self, batch_id: BatchId, intent_id: IntentId) -> bool {
        self.state
            .lock()
            .unwrap()
            .claimed
            .contains(&(batch_id, intent_id))
    }

    /// Floor-division residual still in engine custody for an executed batch.
    pub fn residual(&self, batch_id: BatchId) -> Option<Uint128> {
        let state = self.state.lock().unwrap();
        let batch = state.batches.get(batch_id as usize)?;
        (batch.state == BatchState::Executed).then(|| batch.dust())
    }

    /// Batch-membership status of an intent, `None` if the ledger never
    /// issued the id.
    pub fn intent_status(&self, intent_id: IntentId) -> Option<IntentStatus> {
        let ledger = self.ledger.read().unwrap();
        ledger.get(intent_id)?;
        let state = self.state.lock().unwrap();
        Some(match state.queued.get(&intent_id) {
            None => IntentStatus::Unassigned,
            Some(&batch_id) if state.claimed.contains(&(batch_id, intent_id)) => {
                IntentStatus::Settled { batch_id }
            }
            Some(&batch_id) => IntentStatus::Queued { batch_id },
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════

    fn ensure_admin(&self, caller: &str) -> Result<(), EngineError> {
        if caller != self.admin {
            return Err(EngineError::NotOwner);
        }
        Ok(())
    }

    fn ensure_not_entered(&self) -> Result<(), EngineError> {
        if self.guard.is_entered() {
            return Err(EngineError::Reentrant);
        }
        Ok(())
    }

    fn emit(&self, event: EngineEvent) {
        // no receivers is fine; events are best-effort observability plus the
        // relayer contract
        let _ = self.events.send(event);
    }

    /// Close the open batch if either trigger condition holds, emitting
    /// `BatchReady` and `DecryptionRequested` atomically with the state
    /// change, and open the successor so joins never block.
    fn evaluate_triggers(
        &self,
        state: &mut EngineState,
        ledger: &IntentLedger,
        now: u64,
    ) -> bool {
        let params = state.params;
        let batch_id = state.current_id();
        let open = state.batches.last_mut().expect("open batch always exists");

        let by_count = open.count_trigger(params.k_target);
        let by_age = open.age_trigger(params.dt_seconds, now);
        if !by_count && !by_age {
            return false;
        }

        open.state = BatchState::AwaitingSettlement;
        let intent_ids = open.members.clone();
        let member_count = intent_ids.len() as u64;

        let mut aggregate = Vec::new();
        for id in &intent_ids {
            let record = ledger
                .get(*id)
                .expect("queued intent must exist in ledger");
            aggregate.extend_from_slice(&record.payload.concat());
        }

        info!(
            batch_id,
            member_count, by_count, by_age, "batch closed for settlement"
        );
        self.emit(EngineEvent::BatchReady {
            batch_id,
            member_count,
        });
        self.emit(EngineEvent::DecryptionRequested {
            batch_id,
            aggregate_ciphertext: Binary::from(aggregate),
            intent_ids,
        });

        state.batches.push(Batch::open(batch_id + 1, now));
        true
    }
}
