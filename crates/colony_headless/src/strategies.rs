//! Scripted auto-play strategies for headless playtesting.
//!
//! A strategy decides, once per tick, what to do about the pending event,
//! which technology to buy next and whether to expand. Strategies are plain
//! data and can be loaded from RON.

use std::path::Path;

use colony_core::engine::{Clock, GameEngine};
use colony_core::events::GameEvent;
use colony_core::persistence::StateStore;
use colony_core::planets::{COLONIZATION_COST, EXPLORATION_COST};
use colony_core::resources::{ResourceDelta, Resources};
use colony_core::technology::TechId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// How to answer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventPolicy {
    /// Always take the first choice.
    First,
    /// Take the choice with the largest summed effect.
    #[default]
    Richest,
    /// Never engage.
    Dismiss,
}

/// A complete auto-play configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Technologies to buy, in order. Written as catalog names
    /// (`"advanced-mining"`).
    #[serde(with = "tech_names")]
    pub research_order: Vec<TechId>,
    /// Stop expanding at this many colonized planets (home included).
    pub max_colonies: u32,
    /// Credits never spent on expansion or research.
    pub credit_reserve: f64,
    /// Event handling.
    pub event_policy: EventPolicy,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            description: "Expand steadily, research the production boosts".to_string(),
            research_order: vec![
                TechId::Hydroponics,
                TechId::AdvancedMining,
                TechId::SolarArrays,
            ],
            max_colonies: 6,
            credit_reserve: 200.0,
            event_policy: EventPolicy::Richest,
        }
    }
}

mod tech_names {
    use std::str::FromStr;

    use colony_core::technology::TechId;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ids: &[TechId], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ids.iter().map(|id| id.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TechId>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|name| TechId::from_str(name).map_err(D::Error::custom))
            .collect()
    }
}

/// What one turn did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnLog {
    /// Planets discovered.
    pub discovered: u32,
    /// Colonies founded.
    pub colonized: u32,
    /// Technologies bought.
    pub researched: u32,
    /// Events answered with a choice.
    pub events_resolved: u32,
    /// Events dismissed.
    pub events_dismissed: u32,
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let strategy: Strategy = ron::from_str(&contents)?;
        Ok(strategy)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Built-in strategy by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::default()),
            "expansionist" | "expand" => Some(Self::expansionist()),
            "researcher" | "tech" => Some(Self::researcher()),
            "idle" => Some(Self::idle()),
            _ => None,
        }
    }

    /// Grab planets first, research later.
    #[must_use]
    pub fn expansionist() -> Self {
        Self {
            name: "Expansionist".to_string(),
            description: "Colonize as fast as credits allow".to_string(),
            research_order: vec![TechId::AdvancedMining],
            max_colonies: 12,
            credit_reserve: 0.0,
            event_policy: EventPolicy::First,
        }
    }

    /// Buy the whole catalog before expanding.
    #[must_use]
    pub fn researcher() -> Self {
        Self {
            name: "Researcher".to_string(),
            description: "Work through the full tech tree".to_string(),
            research_order: TechId::ALL.to_vec(),
            max_colonies: 3,
            credit_reserve: 100.0,
            event_policy: EventPolicy::Richest,
        }
    }

    /// Do nothing; baseline for comparisons.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            name: "Idle".to_string(),
            description: "Never act, dismiss every event".to_string(),
            research_order: Vec::new(),
            max_colonies: 1,
            credit_reserve: 0.0,
            event_policy: EventPolicy::Dismiss,
        }
    }

    fn keeps_reserve(&self, resources: &Resources, cost: &ResourceDelta) -> bool {
        resources.can_afford(cost)
            && resources.credits - cost.credits.unwrap_or(0.0) >= self.credit_reserve
    }

    /// Take one turn's worth of decisions.
    pub fn play_turn<S: StateStore, C: Clock>(&self, engine: &mut GameEngine<S, C>) -> TurnLog {
        let mut log = TurnLog::default();

        let answer = engine.pending_event().map(|event| match self.event_policy {
            EventPolicy::First => Some(0),
            EventPolicy::Richest => Some(richest_choice(event)),
            EventPolicy::Dismiss => None,
        });
        match answer {
            Some(Some(index)) => {
                if engine.handle_event(index).is_ok() {
                    log.events_resolved += 1;
                }
            }
            Some(None) => {
                if engine.dismiss_event().is_ok() {
                    log.events_dismissed += 1;
                }
            }
            None => {}
        }

        let next_tech = self
            .research_order
            .iter()
            .copied()
            .find(|id| !engine.technologies().is_researched(*id));
        if let Some(id) = next_tech {
            let cost = engine.technologies().get(id).map(|t| t.cost);
            if let Some(cost) = cost {
                if self.keeps_reserve(engine.resources(), &cost)
                    && engine.research_technology(id).is_ok()
                {
                    log.researched += 1;
                }
            }
        }

        let colonies = engine.planets().colonized().count();
        if colonies < self.max_colonies as usize {
            let target = engine
                .planets()
                .all()
                .iter()
                .find(|p| !p.colonized)
                .map(|p| p.id.clone());
            match target {
                Some(id) => {
                    if self.keeps_reserve(engine.resources(), &COLONIZATION_COST)
                        && engine.colonize_planet(&id).is_ok()
                    {
                        log.colonized += 1;
                    }
                }
                None => {
                    if self.keeps_reserve(engine.resources(), &EXPLORATION_COST)
                        && engine.discover_planet().is_ok()
                    {
                        log.discovered += 1;
                    }
                }
            }
        }

        log
    }
}

/// Index of the choice whose effects add up to the most. Ties go to the
/// earliest choice.
pub fn richest_choice(event: &GameEvent) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (index, choice) in event.choices.iter().enumerate() {
        let value: f64 = choice.effect.iter().map(|(_, amount)| amount).sum();
        if value > best_value {
            best = index;
            best_value = value;
        }
    }
    best
}
