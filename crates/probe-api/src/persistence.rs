use std::fmt;
use std::path::Path;

use contracts::GameState;
use rusqlite::{params, Connection, OptionalExtension};

/// The snapshot is a single row with a fixed id.
const SNAPSHOT_ROW_ID: i64 = 1;

#[derive(Debug)]
pub enum PersistenceError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    MissingSnapshot,
    /// The decoded row no longer passes candidate validation (hand-edited
    /// database, catalog drift). A storage failure, not a client error.
    CorruptSnapshot(Vec<String>),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "snapshot encoding error: {err}"),
            Self::MissingSnapshot => write!(f, "snapshot row is missing"),
            Self::CorruptSnapshot(violations) => {
                write!(f, "persisted snapshot failed validation: {}", violations.join("; "))
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// SQLite backing for the persisted snapshot: one `game_state` row, with the
/// two collection fields serialized as JSON text columns. Decoding happens on
/// every read and encoding on every write; the caller validates the decoded
/// form.
#[derive(Debug)]
pub struct SqliteStateStore {
    conn: Connection,
}

impl SqliteStateStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Seed the snapshot row with canonical defaults if it does not exist.
    /// `last_update` starts at `now_ms` so a fresh database accrues no phantom
    /// idle earnings on first load.
    pub fn ensure_snapshot(&mut self, now_ms: u64) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO game_state (id, last_update) VALUES (?1, ?2)",
            params![SNAPSHOT_ROW_ID, timestamp_param(now_ms)],
        )?;
        Ok(())
    }

    pub fn read_snapshot(&self) -> Result<(GameState, u64), PersistenceError> {
        let row = self
            .conn
            .query_row(
                "SELECT resources,
                        probes,
                        replication_cost,
                        mining_rate,
                        current_location,
                        unlocked_locations,
                        upgrades,
                        total_mined,
                        last_update
                 FROM game_state
                 WHERE id = ?1",
                params![SNAPSHOT_ROW_ID],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, f64>(7)?,
                        row.get::<_, i64>(8)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            resources,
            probes,
            replication_cost,
            mining_rate,
            current_location,
            unlocked_locations,
            upgrades,
            total_mined,
            last_update,
        )) = row
        else {
            return Err(PersistenceError::MissingSnapshot);
        };

        let state = GameState {
            resources,
            probes,
            replication_cost,
            mining_rate,
            current_location,
            unlocked_locations: serde_json::from_str(&unlocked_locations)?,
            upgrades: serde_json::from_str(&upgrades)?,
            total_mined,
        };

        Ok((state, last_update.max(0) as u64))
    }

    pub fn write_snapshot(
        &mut self,
        state: &GameState,
        now_ms: u64,
    ) -> Result<(), PersistenceError> {
        let unlocked_locations = serde_json::to_string(&state.unlocked_locations)?;
        let upgrades = serde_json::to_string(&state.upgrades)?;

        self.conn.execute(
            "INSERT INTO game_state (
                id,
                resources,
                probes,
                replication_cost,
                mining_rate,
                current_location,
                unlocked_locations,
                upgrades,
                total_mined,
                last_update
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                resources = excluded.resources,
                probes = excluded.probes,
                replication_cost = excluded.replication_cost,
                mining_rate = excluded.mining_rate,
                current_location = excluded.current_location,
                unlocked_locations = excluded.unlocked_locations,
                upgrades = excluded.upgrades,
                total_mined = excluded.total_mined,
                last_update = excluded.last_update",
            params![
                SNAPSHOT_ROW_ID,
                state.resources,
                state.probes,
                state.replication_cost,
                state.mining_rate,
                state.current_location.as_str(),
                unlocked_locations,
                upgrades,
                state.total_mined,
                timestamp_param(now_ms),
            ],
        )?;

        Ok(())
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS game_state (
                id INTEGER PRIMARY KEY,
                resources REAL NOT NULL DEFAULT 0,
                probes INTEGER NOT NULL DEFAULT 1,
                replication_cost REAL NOT NULL DEFAULT 100,
                mining_rate REAL NOT NULL DEFAULT 1,
                current_location TEXT NOT NULL DEFAULT 'earth',
                unlocked_locations TEXT NOT NULL DEFAULT '[\"earth\"]',
                upgrades TEXT NOT NULL DEFAULT '{}',
                total_mined REAL NOT NULL DEFAULT 0,
                last_update INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<(), PersistenceError> {
        self.conn.execute(sql, [])?;
        Ok(())
    }
}

fn timestamp_param(now_ms: u64) -> i64 {
    i64::try_from(now_ms).unwrap_or(i64::MAX)
}
