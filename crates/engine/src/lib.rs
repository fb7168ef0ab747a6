//! Batch lifecycle and settlement engine.
//!
//! Owns the open batch, applies join/trigger/settle/claim logic, and holds
//! the references to the intent ledger and the swap adapter. Every mutating
//! operation is a serialized critical section; the two operations that call
//! external code hold a reentrancy lock for their full duration.

mod clock;
mod engine;
mod error;
mod guard;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{BatchEngine, EngineConfig, EngineParams};
pub use error::EngineError;
