use contracts::GameState;

use crate::economy::Economy;

/// The client-side continuous simulation: a local copy of the game state plus
/// the last instant it was advanced to. Single-threaded by construction and
/// clock-free; callers pass `now_ms` in, so tests drive it deterministically.
///
/// Local-first: a session keeps ticking and accepting manual actions whether
/// or not the persisted snapshot is reachable.
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    last_seen_ms: u64,
}

impl Session {
    pub fn new(state: GameState, now_ms: u64) -> Self {
        Self {
            state,
            last_seen_ms: now_ms,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Manual actions (`mine_once`, `replicate`, ...) operate directly on the
    /// state through the economy.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Tick the local simulation up to `now_ms`; returns the gain. A clock
    /// that steps backwards yields zero elapsed, never negative accrual.
    pub fn advance(&mut self, economy: &Economy, now_ms: u64) -> f64 {
        let elapsed_seconds = now_ms.saturating_sub(self.last_seen_ms) as f64 / 1000.0;
        self.last_seen_ms = self.last_seen_ms.max(now_ms);
        economy.tick(&mut self.state, elapsed_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accrues_elapsed_seconds() {
        let economy = Economy::default_catalogs();
        let mut session = Session::new(GameState::default(), 1_000);

        let gained = session.advance(&economy, 11_000);
        assert_eq!(gained, 10.0);
        assert_eq!(session.state().resources, 10.0);
        assert_eq!(session.state().total_mined, 10.0);
    }

    #[test]
    fn advance_is_incremental() {
        let economy = Economy::default_catalogs();
        let mut session = Session::new(GameState::default(), 0);

        session.advance(&economy, 4_000);
        session.advance(&economy, 10_000);
        assert_eq!(session.state().resources, 10.0);
    }

    #[test]
    fn backwards_clock_accrues_nothing() {
        let economy = Economy::default_catalogs();
        let mut session = Session::new(GameState::default(), 10_000);

        assert_eq!(session.advance(&economy, 5_000), 0.0);
        assert_eq!(session.state().resources, 0.0);

        // The session stays anchored at its latest instant.
        assert_eq!(session.advance(&economy, 12_000), 2.0);
    }
}
