use std::fmt;
use std::path::Path;

use contracts::{GameState, ReconciledState};
use probe_core::economy::Economy;
use probe_core::validate::validate_candidate;
use tokio::sync::Mutex;

use crate::persistence::{PersistenceError, SqliteStateStore};

/// Wall-clock source, injected so reconciliation is deterministic under test.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The candidate violates the schema/range/referential rules; itemized,
    /// rejected whole, the persisted snapshot untouched.
    ValidationFailed(Vec<String>),
    Storage(PersistenceError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(violations) => {
                write!(f, "candidate state rejected: {}", violations.join("; "))
            }
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Storage(value)
    }
}

/// Owner of the single persisted snapshot, including its `last_update`
/// instant. All operations serialize through one mutex around the SQLite
/// handle, so a load-modify-save sequence cannot interleave with another
/// writer and two overlapping saves cannot produce a torn row. The mutex is
/// per store instance, i.e. per snapshot.
///
/// Failed saves are surfaced to the caller, never retried internally.
pub struct ReconciliationStore {
    inner: Mutex<SqliteStateStore>,
    economy: Economy,
    clock: Box<dyn Clock>,
}

impl ReconciliationStore {
    pub fn open(path: impl AsRef<Path>, economy: Economy) -> Result<Self, PersistenceError> {
        Self::with_clock(SqliteStateStore::open(path)?, economy, Box::new(SystemClock))
    }

    pub fn with_clock(
        mut store: SqliteStateStore,
        economy: Economy,
        clock: Box<dyn Clock>,
    ) -> Result<Self, PersistenceError> {
        store.ensure_snapshot(clock.now_ms())?;
        Ok(Self {
            inner: Mutex::new(store),
            economy,
            clock,
        })
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    /// Read the snapshot and fold in idle earnings for the interval since
    /// `last_update`. Never persists and never touches `last_update`: the
    /// reported gain only becomes durable on the next save, so two loads
    /// without an intervening save both reconcile from the same instant.
    pub async fn load(&self) -> Result<ReconciledState, StoreError> {
        let (snapshot, last_update_ms) = {
            let store = self.inner.lock().await;
            store.read_snapshot()?
        };

        let violations =
            validate_candidate(&snapshot, self.economy.locations(), self.economy.upgrades());
        if !violations.is_empty() {
            return Err(PersistenceError::CorruptSnapshot(violations).into());
        }

        let elapsed_seconds =
            self.clock.now_ms().saturating_sub(last_update_ms) as f64 / 1000.0;
        let idle_earnings = self.economy.accrual(&snapshot, elapsed_seconds);

        let mut state = snapshot;
        state.resources += idle_earnings;
        state.total_mined += idle_earnings;

        Ok(ReconciledState {
            state,
            idle_earnings,
        })
    }

    /// Validated whole-state overwrite. On any violation the persisted
    /// snapshot is left untouched; on success `last_update` advances to now.
    pub async fn save(&self, candidate: &GameState) -> Result<(), StoreError> {
        let violations =
            validate_candidate(candidate, self.economy.locations(), self.economy.upgrades());
        if !violations.is_empty() {
            return Err(StoreError::ValidationFailed(violations));
        }

        let mut store = self.inner.lock().await;
        store.write_snapshot(candidate, self.clock.now_ms())?;
        Ok(())
    }

    /// Unconditionally restore canonical defaults.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut store = self.inner.lock().await;
        store.write_snapshot(&GameState::default(), self.clock.now_ms())?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ManualClock(std::sync::Arc<std::sync::atomic::AtomicU64>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
