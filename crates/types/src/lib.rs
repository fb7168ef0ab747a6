pub mod batch;
pub mod event;
pub mod intent;

pub use batch::*;
pub use event::*;
pub use intent::*;

pub const PROTOCOL_VERSION: &str = "1.0";
