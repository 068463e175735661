//! Planet generation and colonization.
//!
//! The registry starts with a colonized home planet. Exploration appends
//! freshly generated planets; nothing is ever removed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ActionError;
use crate::resources::ResourceDelta;
use crate::simulation::ProductionRates;

/// Cost of exploring for a new planet.
pub const EXPLORATION_COST: ResourceDelta = ResourceDelta {
    credits: Some(200.0),
    energy: Some(50.0),
    ..ResourceDelta::EMPTY
};

/// Cost of founding a colony.
pub const COLONIZATION_COST: ResourceDelta = ResourceDelta {
    credits: Some(500.0),
    minerals: Some(300.0),
    population: Some(50.0),
    ..ResourceDelta::EMPTY
};

/// Settlers placed on a newly colonized planet.
pub const COLONY_POPULATION_GRANT: f64 = 50.0;

/// Id of the planet every game starts on.
pub const HOME_PLANET_ID: &str = "home";

/// Population the home planet starts with.
pub const HOME_PLANET_POPULATION: f64 = 100.0;

/// Names handed out to discovered planets, in order. Wraps around once exhausted.
pub static PLANET_NAMES: &[&str] = &[
    "Kepler Prime",
    "Proxima Verde",
    "Tau Ceti IV",
    "Gliese Haven",
    "Trappist Reach",
    "Wolf's Hollow",
    "Barnard's Rest",
    "Luyten Drift",
    "Ross Meridian",
    "Vega Solace",
    "Altair Deep",
    "Sirius Forge",
];

/// Planet climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetType {
    /// Hot and dry.
    Desert,
    /// Mostly water.
    Ocean,
    /// Temperate and green.
    Forest,
    /// Frozen.
    Ice,
    /// Geologically active.
    Volcanic,
    /// Gas giant.
    Gas,
}

impl PlanetType {
    /// Every planet type, for uniform sampling.
    pub const ALL: [Self; 6] = [
        Self::Desert,
        Self::Ocean,
        Self::Forest,
        Self::Ice,
        Self::Volcanic,
        Self::Gas,
    ];

    /// Base production bonus before the size multiplier.
    #[must_use]
    pub const fn base_bonus(self) -> ProductionBonus {
        match self {
            Self::Desert => ProductionBonus::new(12.0, 14.0, 3.0),
            Self::Ocean => ProductionBonus::new(4.0, 8.0, 16.0),
            Self::Forest => ProductionBonus::new(8.0, 6.0, 14.0),
            Self::Ice => ProductionBonus::new(10.0, 4.0, 2.0),
            Self::Volcanic => ProductionBonus::new(18.0, 16.0, 1.0),
            Self::Gas => ProductionBonus::new(2.0, 20.0, 0.0),
        }
    }
}

/// Planet size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetSize {
    /// 0.7x production.
    Small,
    /// 1.0x production.
    Medium,
    /// 1.5x production.
    Large,
}

impl PlanetSize {
    /// Every size, for uniform sampling.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Multiplier applied to the type's base bonus.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Small => 0.7,
            Self::Medium => 1.0,
            Self::Large => 1.5,
        }
    }
}

/// Per-second output of a fully staffed (100 population) colony.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionBonus {
    /// Minerals per second.
    pub minerals: f64,
    /// Energy per second.
    pub energy: f64,
    /// Food per second.
    pub food: f64,
}

impl ProductionBonus {
    /// Create a bonus from explicit values.
    #[must_use]
    pub const fn new(minerals: f64, energy: f64, food: f64) -> Self {
        Self {
            minerals,
            energy,
            food,
        }
    }

    /// Bonus for a planet of this type and size, rounded to whole numbers.
    #[must_use]
    pub fn for_planet(planet_type: PlanetType, size: PlanetSize) -> Self {
        let base = planet_type.base_bonus();
        let m = size.multiplier();
        Self {
            minerals: (base.minerals * m).round(),
            energy: (base.energy * m).round(),
            food: (base.food * m).round(),
        }
    }
}

/// A known planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Unique id.
    pub id: String,
    /// Display name. Not unique once the name list wraps.
    pub name: String,
    /// Climate.
    pub planet_type: PlanetType,
    /// Size class.
    pub size: PlanetSize,
    /// Whether a colony has been founded.
    pub colonized: bool,
    /// Colonists living here. Zero while uncolonized.
    pub population: f64,
    /// Fixed at discovery.
    pub production_bonus: ProductionBonus,
    /// Discovery time in milliseconds.
    pub discovered_at: u64,
}

impl Planet {
    /// The planet every game starts on.
    #[must_use]
    pub fn home(now: u64) -> Self {
        Self {
            id: HOME_PLANET_ID.to_string(),
            name: "Terra".to_string(),
            planet_type: PlanetType::Forest,
            size: PlanetSize::Medium,
            colonized: true,
            population: HOME_PLANET_POPULATION,
            production_bonus: ProductionBonus::new(10.0, 10.0, 15.0),
            discovered_at: now,
        }
    }

    /// Per-second output, scaled by this planet's population relative to 100.
    ///
    /// Uncolonized planets produce nothing.
    #[must_use]
    pub fn production(&self) -> ProductionRates {
        if !self.colonized {
            return ProductionRates::ZERO;
        }
        let ratio = self.population / 100.0;
        ProductionRates {
            credits: 5.0 * ratio,
            minerals: self.production_bonus.minerals * ratio,
            energy: self.production_bonus.energy * ratio,
            food: self.production_bonus.food * ratio,
        }
    }
}

/// All known planets, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetRegistry {
    planets: Vec<Planet>,
    /// Index of the next name in [`PLANET_NAMES`].
    names_issued: usize,
}

impl PlanetRegistry {
    /// Registry holding only the home planet.
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            planets: vec![Planet::home(now)],
            names_issued: 0,
        }
    }

    /// Create a random uncolonized planet. Does not add it to the registry.
    pub fn generate(&mut self, rng: &mut impl Rng, now: u64) -> Planet {
        let planet_type = PlanetType::ALL[rng.gen_range(0..PlanetType::ALL.len())];
        let size = PlanetSize::ALL[rng.gen_range(0..PlanetSize::ALL.len())];
        let name = PLANET_NAMES[self.names_issued % PLANET_NAMES.len()];
        self.names_issued += 1;

        Planet {
            id: format!("planet-{now}-{:08x}", rng.gen::<u32>()),
            name: name.to_string(),
            planet_type,
            size,
            colonized: false,
            population: 0.0,
            production_bonus: ProductionBonus::for_planet(planet_type, size),
            discovered_at: now,
        }
    }

    /// Generate a planet and append it. Payment is the caller's job.
    pub fn discover(&mut self, rng: &mut impl Rng, now: u64) -> &Planet {
        let planet = self.generate(rng, now);
        info!(id = %planet.id, name = %planet.name, planet_type = ?planet.planet_type, size = ?planet.size, "Planet discovered");
        let index = self.planets.len();
        self.planets.push(planet);
        &self.planets[index]
    }

    /// Check that `id` exists and has no colony yet.
    pub fn check_colonizable(&self, id: &str) -> Result<&Planet, ActionError> {
        let planet = self
            .get(id)
            .ok_or_else(|| ActionError::UnknownPlanet(id.to_string()))?;
        if planet.colonized {
            return Err(ActionError::AlreadyColonized(id.to_string()));
        }
        Ok(planet)
    }

    /// Found a colony on `id`. Payment is the caller's job.
    ///
    /// Unknown or already colonized planets are left untouched.
    pub fn colonize(&mut self, id: &str, population_grant: f64) -> Result<(), ActionError> {
        self.check_colonizable(id)?;
        if let Some(planet) = self.planets.iter_mut().find(|p| p.id == id) {
            planet.colonized = true;
            planet.population = population_grant;
            info!(id = %planet.id, name = %planet.name, population = population_grant, "Planet colonized");
        }
        Ok(())
    }

    /// Look up a planet by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// All planets in discovery order.
    #[must_use]
    pub fn all(&self) -> &[Planet] {
        &self.planets
    }

    /// Planets with a colony.
    pub fn colonized(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(|p| p.colonized)
    }

    /// Number of known planets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Always false in practice: the home planet is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}
