//! # Colony Core
//!
//! Simulation core for the colony idle game.
//!
//! This crate contains the whole economic state machine and nothing else:
//! - No rendering
//! - No wall-clock reads inside the simulation (time is injected)
//! - No ambient randomness (a seeded RNG is passed in explicitly)
//!
//! This separation enables:
//! - Deterministic tests and replays
//! - Headless runners and batch balance sweeps
//! - Persisting and restoring the full state under one storage key
//!
//! ## Crate Structure
//!
//! - [`resources`] - The five-resource ledger with atomic debit
//! - [`planets`] - Planet generation and colonization
//! - [`technology`] - Static research catalog and production multipliers
//! - [`events`] - Random narrative events and choice resolution
//! - [`simulation`] - Composed game state and the per-tick production model
//! - [`stats`] - Telemetry counters and achievements
//! - [`persistence`] - Serialize/restore the state under a storage key
//! - [`engine`] - Controller exposing every player-facing operation
//! - [`config`] - RON-loadable engine configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod persistence;
pub mod planets;
pub mod resources;
pub mod simulation;
pub mod stats;
pub mod technology;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Clock, GameEngine, ManualClock, SystemClock};
    pub use crate::error::{ActionError, GameError, Result};
    pub use crate::events::{EventChoice, EventEngine, EventKind, GameEvent};
    pub use crate::persistence::{MemoryStore, PersistenceAdapter, StateStore};
    pub use crate::planets::{Planet, PlanetRegistry, PlanetSize, PlanetType};
    pub use crate::resources::{ResourceDelta, ResourceKind, ResourceView, Resources};
    pub use crate::simulation::{GameSpeed, GameState, SimulationClock, TickReport};
    pub use crate::stats::{Achievement, GameStats};
    pub use crate::technology::{TechCategory, TechId, Technology, TechnologyRegistry};
}
