//! cipher-dca: privately-encoded DCA intents, batched into single net swaps.
//!
//! Participants submit encrypted trade intents to the ledger, join them into
//! the engine's open batch, and claim proportional shares of each batch's
//! swap output once the relayer reports the decrypted aggregate. See the
//! member crates for the individual components; this crate assembles them.

use cipher_dca_adapter::{
    AdapterConfig, AdapterError, InMemoryBank, MockAdapter, SwapAdapter, UniswapAdapter,
};
use cipher_dca_config::{validate, AdapterVariant, AppConfig, ConfigError};
use cipher_dca_engine::{BatchEngine, EngineConfig, EngineError, EngineParams, SystemClock};
use cipher_dca_ledger::IntentLedger;
use cipher_dca_relayer::{MockGateway, RelayerService, RelayerServiceConfig};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub use cipher_dca_adapter as adapter;
pub use cipher_dca_config as config;
pub use cipher_dca_engine as engine;
pub use cipher_dca_ledger as ledger;
pub use cipher_dca_relayer as relayer;
pub use cipher_dca_types as types;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

/// A fully wired local stack: ledger, engine, adapter, custody book, and
/// relayer service. Custody is the in-process balance book; embedders that
/// settle against external custody wire `BatchEngine::new` directly.
pub struct System {
    pub ledger: Arc<RwLock<IntentLedger>>,
    pub engine: Arc<BatchEngine>,
    pub bank: Arc<InMemoryBank>,
    pub adapter: Arc<dyn SwapAdapter>,
    pub relayer: Arc<RelayerService>,
}

/// Assemble a [`System`] from a validated configuration.
pub fn build(config: &AppConfig) -> Result<System, SystemError> {
    validate(config)?;

    let bank = Arc::new(InMemoryBank::new());

    let adapter: Arc<dyn SwapAdapter> = match config.adapter.variant {
        AdapterVariant::Mock => Arc::new(MockAdapter::new(bank.clone(), "mock-adapter")),
        AdapterVariant::Uniswap => Arc::new(UniswapAdapter::new(&config.adapter.execution_url)),
    };
    adapter.configure(AdapterConfig {
        router: config.adapter.router.clone(),
        quote_denom: config.adapter.quote_denom.clone(),
        base_denom: config.adapter.base_denom.clone(),
        fee_tier: config.adapter.fee_tier,
    })?;
    adapter.set_batcher(&config.engine.account);

    let ledger = Arc::new(RwLock::new(IntentLedger::new()));
    let engine = Arc::new(BatchEngine::new(
        EngineConfig {
            admin: config.engine.admin.clone(),
            account: config.engine.account.clone(),
            base_denom: config.engine.base_denom.clone(),
            params: EngineParams {
                k_target: config.engine.k_target,
                dt_seconds: config.engine.dt_seconds,
            },
        },
        ledger.clone(),
        adapter.clone(),
        bank.clone(),
        Arc::new(SystemClock),
    )?);
    engine.set_relayer(&config.engine.admin, config.relayer.identity.clone())?;

    let relayer = Arc::new(RelayerService::new(
        engine.clone(),
        Arc::new(MockGateway::default()),
        RelayerServiceConfig {
            identity: config.relayer.identity.clone(),
            max_attempts: config.relayer.max_attempts,
            retry_initial: Duration::from_millis(config.relayer.retry_initial_ms),
            retry_max: Duration::from_millis(config.relayer.retry_max_ms),
        },
    ));

    info!(
        k_target = config.engine.k_target,
        dt_seconds = config.engine.dt_seconds,
        variant = ?config.adapter.variant,
        "system assembled"
    );
    Ok(System {
        ledger,
        engine,
        bank,
        adapter,
        relayer,
    })
}
