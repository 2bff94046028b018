//! Shared value types and canonical-hashing primitives used across the
//! pipeline's gate crates.
//!
//! Every gate needs the same `TradeMode` ladder and the same
//! canonicalize-then-hash routine for content-addressed ids (decision ids,
//! intent ids, event ids, policy snapshot hashes). Keeping one implementation
//! here means LIVE-redaction and hash stability are each defined exactly once.

mod hash;
mod mode;
mod side;

pub use hash::{content_hash_hex, sort_keys};
pub use mode::TradeMode;
pub use side::{MarginMode, PositionSide, Side};
