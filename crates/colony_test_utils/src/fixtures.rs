//! Test fixtures and helpers.
//!
//! Pre-built engines and game states for consistent testing. Every engine
//! built here runs on a [`ManualClock`] and an in-memory store, so tests
//! control time and never touch the filesystem.

use colony_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Engine type used throughout the tests.
pub type TestEngine = GameEngine<MemoryStore, ManualClock>;

/// Stockpiles large enough to afford anything in the catalog several times.
pub const RICH: Resources = Resources::new(100_000.0, 100_000.0, 10_000.0, 10_000.0, 10_000.0);

/// Seeded config with events disabled.
#[must_use]
pub fn quiet_config(seed: u64) -> EngineConfig {
    EngineConfig::default()
        .with_seed(seed)
        .with_event_probability(0.0)
}

/// Fresh engine at time zero with events disabled.
#[must_use]
pub fn quiet_engine(seed: u64) -> TestEngine {
    GameEngine::new(quiet_config(seed), MemoryStore::new(), ManualClock::new(0))
}

/// Fresh engine at time zero with the given event chance per tick.
#[must_use]
pub fn eventful_engine(seed: u64, event_probability: f64) -> TestEngine {
    let config = EngineConfig::default()
        .with_seed(seed)
        .with_event_probability(event_probability);
    GameEngine::new(config, MemoryStore::new(), ManualClock::new(0))
}

/// Engine whose ledger starts at [`RICH`].
#[must_use]
pub fn rich_engine(seed: u64) -> TestEngine {
    let mut engine = quiet_engine(seed);
    let top_up = ResourceDelta {
        credits: Some(RICH.credits - Resources::STARTING.credits),
        minerals: Some(RICH.minerals - Resources::STARTING.minerals),
        energy: Some(RICH.energy - Resources::STARTING.energy),
        food: Some(RICH.food - Resources::STARTING.food),
        population: Some(RICH.population - Resources::STARTING.population),
    };
    engine.add_resources(&top_up);
    engine
}

/// Move the clock forward by `ms` and tick.
pub fn advance(engine: &mut TestEngine, ms: u64) -> TickReport {
    engine.clock_mut().advance(ms);
    engine.tick()
}

/// Discover and colonize `count` planets on a rich engine.
///
/// Returns the ids of the new colonies in discovery order.
pub fn colonize_many(engine: &mut TestEngine, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let Ok(planet) = engine.discover_planet() else {
            break;
        };
        if engine.colonize_planet(&planet.id).is_ok() {
            ids.push(planet.id);
        }
    }
    ids
}

/// Game state at `now` with [`RICH`] stockpiles.
#[must_use]
pub fn rich_state(now: u64) -> GameState {
    let mut state = GameState::new(now);
    state.resources = RICH;
    state
}

/// Deterministic RNG for direct [`GameState`] calls.
#[must_use]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
