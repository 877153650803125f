//! Pure game logic for the probe idle economy: the canonical accrual formula,
//! the state-mutating operations that funnel through it, the static location
//! and upgrade catalogs, candidate-state validation, and the client-side
//! continuous session.
//!
//! This crate performs no I/O and owns no clock; callers pass elapsed time or
//! timestamps in, which keeps every operation deterministic under test.

pub mod economy;
pub mod locations;
pub mod session;
pub mod upgrades;
pub mod validate;

pub use economy::{Economy, EconomyError};
pub use locations::{GraphConfigError, LocationGraph, LocationNode};
pub use session::Session;
pub use upgrades::{CatalogConfigError, Upgrade, UpgradeCatalog, UpgradeEffect};
pub use validate::validate_candidate;
