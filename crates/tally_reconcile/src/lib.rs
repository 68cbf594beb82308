//! Stock reconciliation workflow.
//!
//! Compares a physically observed count against the recorded count and
//! derives the correcting stock mutation. Split into:
//!
//! - `session`: the pure state machine, `step(state, event) -> (state, effect)`,
//!   unit-testable without any store or UI harness
//! - `store`: the external inventory interface (read path + mutation dispatch)
//!   plus an in-memory reference implementation
//! - `driver`: the async loop folding effects into store calls and notices
//!
//! One logical session per operator; the driver never allows a second
//! dispatch while one is outstanding.

pub mod driver;
pub mod session;
pub mod store;

// Re-export types for convenience
pub use driver::ReconcileDriver;
pub use session::{
    derive_intent, search_inventory, step, Effect, Notice, SearchOutcome, SearchSource,
    SessionEvent, SessionState,
};
pub use store::{InventoryStore, MemoryStore, StoreError};
