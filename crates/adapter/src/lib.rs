//! Swap adapter capability for the cipher-dca engine.
//!
//! The engine depends only on the [`SwapAdapter`] trait; concrete variants
//! are selected at configuration time. [`UniswapAdapter`] executes against an
//! external execution endpoint, [`MockAdapter`] settles against the
//! in-process [`InMemoryBank`]. Claim payouts flow through the
//! [`AssetCustody`] seam so tests can substitute adversarial transfer
//! behavior.

mod custody;
mod mock;
mod swap;
mod uniswap;

pub use custody::{AssetCustody, CustodyError, InMemoryBank};
pub use mock::MockAdapter;
pub use swap::{AdapterConfig, AdapterError, SwapAdapter, ALLOWED_FEE_TIERS};
pub use uniswap::UniswapAdapter;
