//! Research catalog.
//!
//! The catalog is fixed at eight technologies. Research is bought outright:
//! a successful purchase flips `researched` and sets progress to 100 in one
//! step. Only three technologies carry a numeric production effect; the rest
//! are descriptive entries (see [`TechId::production_effect`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ActionError;
use crate::resources::{ResourceDelta, ResourceKind, Resources};
use crate::simulation::ProductionRates;

/// Identifier of a catalog technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechId {
    /// Mineral production boost.
    AdvancedMining,
    /// Energy production boost.
    SolarArrays,
    /// Food production boost.
    Hydroponics,
    /// Faster-than-light travel.
    WarpDrive,
    /// Planet habitability.
    Terraforming,
    /// Colony growth.
    PopulationGrowth,
    /// Research acceleration.
    QuantumComputing,
    /// Planetary defenses.
    DefenseSystems,
}

impl TechId {
    /// Every technology in catalog order.
    pub const ALL: [Self; 8] = [
        Self::AdvancedMining,
        Self::SolarArrays,
        Self::Hydroponics,
        Self::WarpDrive,
        Self::Terraforming,
        Self::PopulationGrowth,
        Self::QuantumComputing,
        Self::DefenseSystems,
    ];

    /// Kebab-case id used in saves and the wire protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdvancedMining => "advanced-mining",
            Self::SolarArrays => "solar-arrays",
            Self::Hydroponics => "hydroponics",
            Self::WarpDrive => "warp-drive",
            Self::Terraforming => "terraforming",
            Self::PopulationGrowth => "population-growth",
            Self::QuantumComputing => "quantum-computing",
            Self::DefenseSystems => "defense-systems",
        }
    }

    /// Numeric effect on aggregated production, if this technology has one.
    #[must_use]
    pub const fn production_effect(self) -> Option<ProductionEffect> {
        match self {
            Self::AdvancedMining => Some(ProductionEffect::new(ResourceKind::Minerals, 1.5)),
            Self::SolarArrays => Some(ProductionEffect::new(ResourceKind::Energy, 1.5)),
            Self::Hydroponics => Some(ProductionEffect::new(ResourceKind::Food, 1.5)),
            Self::WarpDrive
            | Self::Terraforming
            | Self::PopulationGrowth
            | Self::QuantumComputing
            | Self::DefenseSystems => None,
        }
    }
}

impl fmt::Display for TechId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TechId {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ActionError::UnknownTechnology(s.to_string()))
    }
}

/// Multiplier on one resource's aggregated production.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionEffect {
    /// Resource affected.
    pub resource: ResourceKind,
    /// Factor applied to the summed per-second rate.
    pub factor: f64,
}

impl ProductionEffect {
    /// Create an effect.
    #[must_use]
    pub const fn new(resource: ResourceKind, factor: f64) -> Self {
        Self { resource, factor }
    }
}

/// Research branch, for grouping in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    /// Economy boosts.
    Production,
    /// Defense.
    Military,
    /// Travel and planets.
    Exploration,
    /// Population.
    Social,
}

/// A catalog entry and its research state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    /// Catalog id.
    pub id: TechId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Credits and minerals required.
    pub cost: ResourceDelta,
    /// One-way flag: never reset except by a full game reset.
    pub researched: bool,
    /// 0 until researched, then 100.
    pub research_progress: f64,
    /// Research branch.
    pub category: TechCategory,
    /// Human-readable effect lines.
    pub effects: Vec<String>,
}

impl Technology {
    fn entry(
        id: TechId,
        name: &str,
        description: &str,
        credits: f64,
        minerals: f64,
        category: TechCategory,
        effects: &[&str],
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            cost: ResourceDelta {
                credits: Some(credits),
                minerals: Some(minerals),
                ..ResourceDelta::EMPTY
            },
            researched: false,
            research_progress: 0.0,
            category,
            effects: effects.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

/// The eight-entry research catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyRegistry {
    technologies: Vec<Technology>,
}

impl Default for TechnologyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnologyRegistry {
    /// Fresh catalog with nothing researched.
    #[must_use]
    pub fn new() -> Self {
        use TechCategory::{Exploration, Military, Production, Social};

        let technologies = vec![
            Technology::entry(
                TechId::AdvancedMining,
                "Advanced Mining",
                "Deep-core extraction rigs for every colony.",
                500.0,
                200.0,
                Production,
                &["+50% mineral production"],
            ),
            Technology::entry(
                TechId::SolarArrays,
                "Solar Arrays",
                "Orbital collectors beam power to the surface.",
                400.0,
                150.0,
                Production,
                &["+50% energy production"],
            ),
            Technology::entry(
                TechId::Hydroponics,
                "Hydroponics",
                "Soil-free farming in sealed habitats.",
                300.0,
                100.0,
                Production,
                &["+50% food production"],
            ),
            Technology::entry(
                TechId::WarpDrive,
                "Warp Drive",
                "Fold space to reach distant systems.",
                2000.0,
                1000.0,
                Exploration,
                &["Reduces exploration cost", "Unlocks distant systems"],
            ),
            Technology::entry(
                TechId::Terraforming,
                "Terraforming",
                "Reshape hostile worlds into habitable ones.",
                1500.0,
                800.0,
                Exploration,
                &["Improves planet habitability"],
            ),
            Technology::entry(
                TechId::PopulationGrowth,
                "Population Growth",
                "Medical and social programs for thriving colonies.",
                800.0,
                200.0,
                Social,
                &["+25% population growth"],
            ),
            Technology::entry(
                TechId::QuantumComputing,
                "Quantum Computing",
                "Qubit clusters accelerate every research lab.",
                1200.0,
                400.0,
                Production,
                &["+100% research speed"],
            ),
            Technology::entry(
                TechId::DefenseSystems,
                "Defense Systems",
                "Orbital platforms guard the colonies.",
                1000.0,
                500.0,
                Military,
                &["Protects colonies from threats"],
            ),
        ];

        Self { technologies }
    }

    /// Look up a catalog entry.
    #[must_use]
    pub fn get(&self, id: TechId) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.id == id)
    }

    /// Whether `id` has been researched.
    #[must_use]
    pub fn is_researched(&self, id: TechId) -> bool {
        self.get(id).is_some_and(|t| t.researched)
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Technology] {
        &self.technologies
    }

    /// Number of researched entries.
    #[must_use]
    pub fn researched_count(&self) -> usize {
        self.technologies.iter().filter(|t| t.researched).count()
    }

    /// Buy `id`, paying its cost from `ledger`.
    ///
    /// Nothing changes unless the technology exists, is unresearched and the
    /// ledger covers the full cost.
    pub fn research(&mut self, id: TechId, ledger: &mut Resources) -> Result<(), ActionError> {
        let tech = self
            .technologies
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ActionError::UnknownTechnology(id.to_string()))?;
        if tech.researched {
            return Err(ActionError::AlreadyResearched(id));
        }
        if let Some((resource, required, available)) = ledger.shortfall(&tech.cost) {
            return Err(ActionError::InsufficientResources {
                resource,
                required,
                available,
            });
        }
        ledger.debit(&tech.cost);
        tech.researched = true;
        tech.research_progress = 100.0;
        info!(tech = %id, "Technology researched");
        Ok(())
    }

    /// Effects of every researched technology that has one.
    pub fn active_effects(&self) -> impl Iterator<Item = ProductionEffect> + '_ {
        self.technologies
            .iter()
            .filter(|t| t.researched)
            .filter_map(|t| t.id.production_effect())
    }

    /// Apply researched multipliers to aggregated rates.
    #[must_use]
    pub fn apply_multipliers(&self, mut rates: ProductionRates) -> ProductionRates {
        for effect in self.active_effects() {
            rates.scale(effect.resource, effect.factor);
        }
        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_unresearched_entries() {
        let registry = TechnologyRegistry::new();
        assert_eq!(registry.all().len(), 8);
        assert_eq!(registry.researched_count(), 0);
        for id in TechId::ALL {
            let tech = registry.get(id).unwrap();
            assert!(!tech.researched);
            assert_eq!(tech.research_progress, 0.0);
        }
    }

    #[test]
    fn test_tech_id_string_round_trip() {
        for id in TechId::ALL {
            assert_eq!(id.as_str().parse::<TechId>().unwrap(), id);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
        assert_eq!(
            "time-travel".parse::<TechId>(),
            Err(ActionError::UnknownTechnology("time-travel".to_string()))
        );
    }

    #[test]
    fn test_research_debits_and_flags() {
        let mut registry = TechnologyRegistry::new();
        let mut ledger = Resources::STARTING;
        registry.research(TechId::AdvancedMining, &mut ledger).unwrap();
        assert!(registry.is_researched(TechId::AdvancedMining));
        assert_eq!(
            registry.get(TechId::AdvancedMining).unwrap().research_progress,
            100.0
        );
        assert_eq!(ledger.credits, 500.0);
        assert_eq!(ledger.minerals, 300.0);
    }

    #[test]
    fn test_research_twice_is_rejected_without_charge() {
        let mut registry = TechnologyRegistry::new();
        let mut ledger = Resources::new(10_000.0, 10_000.0, 0.0, 0.0, 0.0);
        registry.research(TechId::Hydroponics, &mut ledger).unwrap();
        let after_first = ledger;
        assert_eq!(
            registry.research(TechId::Hydroponics, &mut ledger),
            Err(ActionError::AlreadyResearched(TechId::Hydroponics))
        );
        assert_eq!(ledger, after_first);
    }

    #[test]
    fn test_research_unaffordable_changes_nothing() {
        let mut registry = TechnologyRegistry::new();
        let mut ledger = Resources::new(2000.0, 999.0, 0.0, 0.0, 0.0);
        let err = registry.research(TechId::WarpDrive, &mut ledger).unwrap_err();
        assert!(matches!(
            err,
            ActionError::InsufficientResources {
                resource: ResourceKind::Minerals,
                ..
            }
        ));
        assert!(!registry.is_researched(TechId::WarpDrive));
        assert_eq!(ledger.credits, 2000.0);
    }

    #[test]
    fn test_only_three_technologies_have_effects() {
        let wired: Vec<TechId> = TechId::ALL
            .into_iter()
            .filter(|id| id.production_effect().is_some())
            .collect();
        assert_eq!(
            wired,
            vec![TechId::AdvancedMining, TechId::SolarArrays, TechId::Hydroponics]
        );
    }

    #[test]
    fn test_apply_multipliers() {
        let mut registry = TechnologyRegistry::new();
        let mut ledger = Resources::new(10_000.0, 10_000.0, 0.0, 0.0, 0.0);
        registry.research(TechId::SolarArrays, &mut ledger).unwrap();
        registry.research(TechId::WarpDrive, &mut ledger).unwrap();

        let rates = ProductionRates {
            credits: 5.0,
            minerals: 10.0,
            energy: 10.0,
            food: 15.0,
        };
        let boosted = registry.apply_multipliers(rates);
        assert_eq!(boosted.energy, 15.0);
        assert_eq!(boosted.minerals, 10.0);
        assert_eq!(boosted.credits, 5.0);
    }
}
