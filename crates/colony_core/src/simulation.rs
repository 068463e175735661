//! Composed game state and the per-tick production model.
//!
//! A tick converts wall-clock time since the previous tick into production:
//!
//! 1. Each colonized planet yields per-second rates scaled by its own
//!    population relative to 100.
//! 2. Rates are summed across planets, then technology multipliers are
//!    applied to the totals.
//! 3. The totals are scaled by `elapsed_seconds × speed` and credited.
//! 4. The event trigger policy runs once.
//!
//! The speed multiplier changes how much a tick produces, never how often
//! ticks happen.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ActionError;
use crate::events::{EventChoice, EventEngine, GameEvent};
use crate::planets::{
    Planet, PlanetRegistry, COLONIZATION_COST, COLONY_POPULATION_GRANT, EXPLORATION_COST,
};
use crate::resources::{ResourceDelta, ResourceKind, Resources};
use crate::stats::GameStats;
use crate::technology::{TechId, TechnologyRegistry};

/// Per-second production of the four produced resources.
///
/// Population is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionRates {
    /// Credits per second.
    pub credits: f64,
    /// Minerals per second.
    pub minerals: f64,
    /// Energy per second.
    pub energy: f64,
    /// Food per second.
    pub food: f64,
}

impl ProductionRates {
    /// No production.
    pub const ZERO: Self = Self {
        credits: 0.0,
        minerals: 0.0,
        energy: 0.0,
        food: 0.0,
    };

    /// Multiply one resource's rate. Population is ignored.
    pub fn scale(&mut self, kind: ResourceKind, factor: f64) {
        match kind {
            ResourceKind::Credits => self.credits *= factor,
            ResourceKind::Minerals => self.minerals *= factor,
            ResourceKind::Energy => self.energy *= factor,
            ResourceKind::Food => self.food *= factor,
            ResourceKind::Population => {}
        }
    }

    /// Every rate multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            credits: self.credits * factor,
            minerals: self.minerals * factor,
            energy: self.energy * factor,
            food: self.food * factor,
        }
    }

    /// Sum of the four rates.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.credits + self.minerals + self.energy + self.food
    }

    /// As a ledger delta.
    #[must_use]
    pub fn to_delta(&self) -> ResourceDelta {
        ResourceDelta {
            credits: Some(self.credits),
            minerals: Some(self.minerals),
            energy: Some(self.energy),
            food: Some(self.food),
            population: None,
        }
    }
}

impl std::ops::Add for ProductionRates {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            credits: self.credits + rhs.credits,
            minerals: self.minerals + rhs.minerals,
            energy: self.energy + rhs.energy,
            food: self.food + rhs.food,
        }
    }
}

impl std::iter::Sum for ProductionRates {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}

/// User-selectable time acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum GameSpeed {
    /// 0.5x.
    Half,
    /// 1x.
    #[default]
    Normal,
    /// 2x.
    Double,
    /// 5x.
    Quintuple,
}

impl GameSpeed {
    /// Every supported speed, slowest first.
    pub const ALL: [Self; 4] = [Self::Half, Self::Normal, Self::Double, Self::Quintuple];

    /// Factor applied to elapsed time.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Double => 2.0,
            Self::Quintuple => 5.0,
        }
    }

    /// The speed with exactly this multiplier.
    #[must_use]
    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.multiplier() == value)
    }
}

impl TryFrom<f64> for GameSpeed {
    type Error = ActionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_multiplier(value).ok_or(ActionError::InvalidSpeed(value))
    }
}

impl From<GameSpeed> for f64 {
    fn from(speed: GameSpeed) -> Self {
        speed.multiplier()
    }
}

/// Tracks the previous tick time and the speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Time of the previous tick in milliseconds.
    pub last_update: u64,
    /// Current speed.
    pub speed: GameSpeed,
}

impl SimulationClock {
    /// Clock at normal speed, last ticked at `now`.
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            last_update: now,
            speed: GameSpeed::Normal,
        }
    }

    /// Seconds since the previous tick. Zero if `now` is earlier.
    #[must_use]
    pub fn elapsed_seconds(&self, now: u64) -> f64 {
        now.saturating_sub(self.last_update) as f64 / 1000.0
    }
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// Wall-clock seconds covered by the tick.
    pub elapsed_seconds: f64,
    /// Amounts credited (already scaled by time and speed).
    pub produced: ProductionRates,
    /// Id of the event that fired during this tick.
    pub triggered_event: Option<String>,
}

/// The whole persisted game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Stockpiles.
    pub resources: Resources,
    /// Known planets.
    pub planets: PlanetRegistry,
    /// Research catalog.
    pub technologies: TechnologyRegistry,
    /// Pending event holder.
    pub events: EventEngine,
    /// Telemetry.
    pub stats: GameStats,
    /// Speed and time of the previous tick.
    pub clock: SimulationClock,
}

fn ensure_affordable(resources: &Resources, cost: &ResourceDelta) -> Result<(), ActionError> {
    match resources.shortfall(cost) {
        Some((resource, required, available)) => Err(ActionError::InsufficientResources {
            resource,
            required,
            available,
        }),
        None => Ok(()),
    }
}

impl GameState {
    /// Default starting configuration.
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            resources: Resources::STARTING,
            planets: PlanetRegistry::new(now),
            technologies: TechnologyRegistry::new(),
            events: EventEngine::new(),
            stats: GameStats::new(now),
            clock: SimulationClock::new(now),
        }
    }

    /// Replace everything with the starting configuration.
    pub fn reset(&mut self, now: u64) {
        *self = Self::new(now);
    }

    /// Current per-second production, after multipliers and before speed.
    #[must_use]
    pub fn production_rates(&self) -> ProductionRates {
        let summed: ProductionRates = self.planets.colonized().map(Planet::production).sum();
        self.technologies.apply_multipliers(summed)
    }

    /// Advance to `now`: credit production, then roll for an event.
    pub fn tick(&mut self, now: u64, rng: &mut impl Rng, event_probability: f64) -> TickReport {
        let elapsed_seconds = self.clock.elapsed_seconds(now);
        let produced = self
            .production_rates()
            .scaled(elapsed_seconds * self.clock.speed.multiplier());
        self.resources.credit(&produced.to_delta());

        let triggered_event = self
            .events
            .maybe_trigger(rng, now, event_probability)
            .map(|e| e.id.clone());

        self.stats.record_production(produced.total());
        self.clock.last_update = now;

        debug!(
            elapsed_seconds,
            speed = self.clock.speed.multiplier(),
            produced = produced.total(),
            "Tick"
        );

        TickReport {
            elapsed_seconds,
            produced,
            triggered_event,
        }
    }

    /// Credit `delta` unconditionally.
    pub fn add_resources(&mut self, delta: &ResourceDelta) {
        self.resources.credit(delta);
    }

    /// Spend `cost` if fully affordable.
    pub fn spend_resources(&mut self, cost: &ResourceDelta) -> bool {
        self.resources.debit(cost)
    }

    /// Pay for exploration and add a new uncolonized planet.
    pub fn discover_planet(&mut self, rng: &mut impl Rng, now: u64) -> Result<&Planet, ActionError> {
        ensure_affordable(&self.resources, &EXPLORATION_COST)?;
        self.resources.debit(&EXPLORATION_COST);
        Ok(self.planets.discover(rng, now))
    }

    /// Pay for and found a colony on `id`.
    ///
    /// Unknown or colonized planets are rejected before anything is charged.
    pub fn colonize_planet(&mut self, id: &str) -> Result<(), ActionError> {
        self.planets.check_colonizable(id)?;
        ensure_affordable(&self.resources, &COLONIZATION_COST)?;
        self.resources.debit(&COLONIZATION_COST);
        self.planets.colonize(id, COLONY_POPULATION_GRANT)?;
        self.stats.record_colony();
        Ok(())
    }

    /// Buy a technology.
    pub fn research_technology(&mut self, id: TechId) -> Result<(), ActionError> {
        self.technologies.research(id, &mut self.resources)?;
        self.stats.record_research();
        Ok(())
    }

    /// Pick choice `index` of the pending event.
    pub fn handle_event(&mut self, index: usize) -> Result<EventChoice, ActionError> {
        let choice = self.events.resolve(index, &mut self.resources)?;
        self.stats.record_event_resolved();
        Ok(choice)
    }

    /// Forfeit the pending event.
    pub fn dismiss_event(&mut self) -> Result<GameEvent, ActionError> {
        self.events.dismiss()
    }

    /// Change the speed multiplier. Applies from the next tick.
    pub fn set_speed(&mut self, value: f64) -> Result<GameSpeed, ActionError> {
        let speed = GameSpeed::try_from(value)?;
        self.clock.speed = speed;
        Ok(speed)
    }

    /// Hash of the bincode encoding, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        match bincode::serialize(self) {
            Ok(bytes) => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                hasher.finish()
            }
            Err(e) => {
                warn!(error = %e, "Failed to encode state for hashing");
                0
            }
        }
    }
}
