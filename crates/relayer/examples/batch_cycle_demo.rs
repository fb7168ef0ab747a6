/// End-to-end demo of one batch cycle against the mock stack.
///
/// Wires the ledger, engine, mock adapter, and relayer together, submits two
/// encrypted intents, lets the count trigger close the batch, and claims both
/// shares once the relayer settles it.
use cipher_dca_adapter::{
    AdapterConfig, AssetCustody as _, InMemoryBank, MockAdapter, SwapAdapter as _,
};
use cipher_dca_engine::{BatchEngine, EngineConfig, EngineParams, SystemClock};
use cipher_dca_ledger::IntentLedger;
use cipher_dca_relayer::{MockGateway, RelayerService, RelayerServiceConfig};
use cipher_dca_types::{BatchState, EncryptedPayload};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bank = Arc::new(InMemoryBank::new());
    let adapter = Arc::new(MockAdapter::new(bank.clone(), "mock-adapter"));
    adapter.configure(AdapterConfig {
        router: "demo-router".to_string(),
        quote_denom: "usdc".to_string(),
        base_denom: "weth".to_string(),
        fee_tier: 3_000,
    })?;
    adapter.set_batcher("batcher");
    // inventory backing the 1:1 mock swap
    bank.mint("usdc", "mock-adapter", 2_000_000);

    let ledger = Arc::new(RwLock::new(IntentLedger::new()));
    let engine = Arc::new(BatchEngine::new(
        EngineConfig {
            admin: "admin".to_string(),
            account: "batcher".to_string(),
            base_denom: "weth".to_string(),
            params: EngineParams {
                k_target: 2,
                dt_seconds: 3_600,
            },
        },
        ledger.clone(),
        adapter,
        bank.clone(),
        Arc::new(SystemClock),
    )?);
    engine.set_relayer("admin", "fhe-relayer")?;

    let relayer = Arc::new(RelayerService::new(
        engine.clone(),
        Arc::new(MockGateway::default()),
        RelayerServiceConfig::new("fhe-relayer"),
    ));
    let runner = relayer.clone();
    tokio::spawn(async move { runner.run().await });
    tokio::task::yield_now().await;

    let id1 = ledger.write().unwrap().submit(
        "alice",
        EncryptedPayload::new(vec![0x01], vec![0x02], vec![0x03], vec![0x04], Vec::<u8>::new()),
        0,
    );
    let id2 = ledger.write().unwrap().submit(
        "bob",
        EncryptedPayload::new(vec![0x11], vec![0x12], vec![0x13], vec![0x14], Vec::<u8>::new()),
        0,
    );

    engine.join("alice", id1)?;
    engine.join("bob", id2)?;

    // the second join closed batch 0; wait for the relayer to settle it
    while engine.batch(0).map(|b| b.state) != Some(BatchState::Executed) {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let share1 = engine.claim("alice", 0, id1).await?;
    let share2 = engine.claim("bob", 0, id2).await?;
    println!("alice claimed {share1} weth, bob claimed {share2} weth");
    println!(
        "alice balance: {}, bob balance: {}",
        bank.balance_of("weth", "alice").await,
        bank.balance_of("weth", "bob").await
    );

    Ok(())
}
