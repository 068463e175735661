//! Game controller.
//!
//! [`GameEngine`] is the single owner of the [`GameState`]. Every
//! player-facing operation goes through it; each successful mutation is
//! followed by a save through the [`PersistenceAdapter`]. Time comes from an
//! injected [`Clock`] and randomness from a seeded [`StdRng`], so a run with a
//! [`ManualClock`] and a fixed seed is fully reproducible.
//!
//! # Example
//!
//! ```
//! use colony_core::prelude::*;
//!
//! let config = EngineConfig::default().with_seed(7);
//! let mut engine = GameEngine::new(config, MemoryStore::new(), ManualClock::new(0));
//!
//! engine.clock_mut().advance(10_000);
//! engine.tick();
//! assert_eq!(engine.resources().minerals, 600.0);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::ActionError;
use crate::events::{EventChoice, GameEvent};
use crate::persistence::{PersistenceAdapter, PersistenceError, StateStore};
use crate::planets::{Planet, PlanetRegistry};
use crate::resources::{ResourceDelta, Resources};
use crate::simulation::{GameSpeed, GameState, ProductionRates, TickReport};
use crate::stats::GameStats;
use crate::technology::{TechId, TechnologyRegistry};

/// Source of the current time in milliseconds.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin. Must not go backwards.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    /// Clock reading `now`.
    #[must_use]
    pub const fn new(now: u64) -> Self {
        Self { now }
    }

    /// Move forward by `ms`.
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
    }

    /// Jump to `now`. Earlier values are ignored.
    pub fn set(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}

/// Seed for one engine session. Folds in how far the restored game has got,
/// so reopening a save does not replay the draws of the previous session.
fn session_seed(seed: u64, state: &GameState) -> u64 {
    let planets = state.planets.len() as u64;
    seed ^ state
        .clock
        .last_update
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(planets.wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
}

/// Owns the game state and exposes every player action.
pub struct GameEngine<S, C> {
    state: GameState,
    persistence: PersistenceAdapter<S>,
    clock: C,
    rng: StdRng,
    config: EngineConfig,
}

impl<S: StateStore, C: Clock> GameEngine<S, C> {
    /// Start an engine, restoring the saved game from `store` if one exists.
    pub fn new(config: EngineConfig, store: S, clock: C) -> Self {
        let persistence = PersistenceAdapter::with_key(store, config.storage_key.clone());
        let state = persistence.restore_or_default(clock.now_ms());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(session_seed(seed, &state)),
            None => StdRng::from_entropy(),
        };
        Self {
            state,
            persistence,
            clock,
            rng,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Credit `delta` to the ledger.
    pub fn add_resources(&mut self, delta: &ResourceDelta) {
        self.state.add_resources(delta);
        self.persist();
    }

    /// Spend `cost` if fully affordable. Returns whether it was spent.
    pub fn spend_resources(&mut self, cost: &ResourceDelta) -> bool {
        let spent = self.state.spend_resources(cost);
        if spent {
            self.persist();
        }
        spent
    }

    /// Found a colony on planet `id`.
    pub fn colonize_planet(&mut self, id: &str) -> Result<(), ActionError> {
        self.state.colonize_planet(id)?;
        self.persist();
        Ok(())
    }

    /// Pay for exploration and discover a new planet.
    pub fn discover_planet(&mut self) -> Result<Planet, ActionError> {
        let now = self.clock.now_ms();
        let planet = self.state.discover_planet(&mut self.rng, now)?.clone();
        self.persist();
        Ok(planet)
    }

    /// Buy technology `id`.
    pub fn research_technology(&mut self, id: TechId) -> Result<(), ActionError> {
        self.state.research_technology(id)?;
        self.persist();
        Ok(())
    }

    /// Pick choice `index` of the pending event.
    pub fn handle_event(&mut self, index: usize) -> Result<EventChoice, ActionError> {
        let choice = self.state.handle_event(index)?;
        self.persist();
        Ok(choice)
    }

    /// Forfeit the pending event.
    pub fn dismiss_event(&mut self) -> Result<GameEvent, ActionError> {
        let event = self.state.dismiss_event()?;
        self.persist();
        Ok(event)
    }

    /// Advance the simulation to the clock's current time.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let report = self
            .state
            .tick(now, &mut self.rng, self.config.event_probability);
        self.persist();
        report
    }

    /// Change the speed multiplier (0.5, 1, 2 or 5).
    pub fn set_game_speed(&mut self, value: f64) -> Result<GameSpeed, ActionError> {
        let speed = self.state.set_speed(value)?;
        info!(speed = value, "Game speed changed");
        self.persist();
        Ok(speed)
    }

    /// Throw away the current game and start over.
    pub fn reset_game(&mut self) {
        self.state.reset(self.clock.now_ms());
        info!("Game reset");
        self.persist();
    }

    /// Write the state now, regardless of the autosave setting.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        self.persistence.save(&self.state)
    }

    fn persist(&mut self) {
        if !self.config.autosave {
            return;
        }
        if let Err(e) = self.persistence.save(&self.state) {
            warn!(error = %e, "Autosave failed");
        }
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// The whole state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current stockpiles.
    pub fn resources(&self) -> &Resources {
        &self.state.resources
    }

    /// Known planets.
    pub fn planets(&self) -> &PlanetRegistry {
        &self.state.planets
    }

    /// Research catalog.
    pub fn technologies(&self) -> &TechnologyRegistry {
        &self.state.technologies
    }

    /// Event waiting for a decision.
    pub fn pending_event(&self) -> Option<&GameEvent> {
        self.state.events.pending()
    }

    /// Telemetry.
    pub fn stats(&self) -> &GameStats {
        &self.state.stats
    }

    /// Current speed.
    pub fn speed(&self) -> GameSpeed {
        self.state.clock.speed
    }

    /// Per-second production after multipliers, before speed.
    pub fn production_rates(&self) -> ProductionRates {
        self.state.production_rates()
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Time source, mutably (to drive a [`ManualClock`]).
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Persistence adapter.
    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }
}
