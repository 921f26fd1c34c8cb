//! Concurrency primitives shared by the fetch and detection pools
//!
//! One `ConcurrencyLimiter` instance protects each remote resource. Slots are
//! handed out as RAII guards so every exit path of a remote call gives its
//! slot back.

pub mod limiter;

pub use limiter::{ConcurrencyLimiter, SlotGuard};
