//! Persistence-backed reconciliation for the probe idle economy: the single
//! persisted snapshot, idle-earnings folding on read, validated overwrite on
//! write, and the axum HTTP surface over those operations.

mod persistence;
mod scheduler;
mod server;
mod store;

pub use persistence::{PersistenceError, SqliteStateStore};
pub use scheduler::Scheduler;
pub use server::{serve, ServerError};
pub use store::{Clock, ReconciliationStore, StoreError, SystemClock};
