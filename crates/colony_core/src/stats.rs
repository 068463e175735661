//! Telemetry counters and achievements.
//!
//! Nothing in here gates game logic.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::technology::TechId;

/// Total production needed for [`Achievement::Industrialist`].
pub const INDUSTRIALIST_THRESHOLD: f64 = 10_000.0;

/// Colonies (home included) needed for [`Achievement::Expansionist`].
pub const EXPANSIONIST_THRESHOLD: u32 = 5;

/// Milestones recorded in [`GameStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Achievement {
    /// Founded a colony beyond the home planet.
    FirstColony,
    /// Five colonized planets.
    Expansionist,
    /// Researched any technology.
    FirstResearch,
    /// Researched the whole catalog.
    FullTechTree,
    /// Produced 10 000 resources in total.
    Industrialist,
    /// Resolved an event by picking a choice.
    DecisionMaker,
}

/// Lifetime counters for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    /// Colonized planets, home included.
    pub planets_colonized: u32,
    /// Researched technologies.
    pub technologies_researched: u32,
    /// Sum of credits, minerals, energy and food produced by ticks.
    pub total_production: f64,
    /// Events resolved with a choice (dismissals excluded).
    #[serde(default)]
    pub events_resolved: u32,
    /// Game start time in milliseconds.
    pub game_started: u64,
    /// Unlocked milestones, in unlock order.
    pub achievements: Vec<Achievement>,
}

impl GameStats {
    /// Counters for a fresh game: only the home planet is colonized.
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            planets_colonized: 1,
            technologies_researched: 0,
            total_production: 0.0,
            events_resolved: 0,
            game_started: now,
            achievements: Vec::new(),
        }
    }

    /// Whether `achievement` has been unlocked.
    #[must_use]
    pub fn has(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Count a new colony.
    pub fn record_colony(&mut self) {
        self.planets_colonized += 1;
        self.unlock_earned();
    }

    /// Count a finished research.
    pub fn record_research(&mut self) {
        self.technologies_researched += 1;
        self.unlock_earned();
    }

    /// Count a resolved event.
    pub fn record_event_resolved(&mut self) {
        self.events_resolved += 1;
        self.unlock_earned();
    }

    /// Add tick output to the running total.
    pub fn record_production(&mut self, amount: f64) {
        self.total_production += amount;
        self.unlock_earned();
    }

    fn unlock_earned(&mut self) {
        let earned = [
            (Achievement::FirstColony, self.planets_colonized >= 2),
            (
                Achievement::Expansionist,
                self.planets_colonized >= EXPANSIONIST_THRESHOLD,
            ),
            (Achievement::FirstResearch, self.technologies_researched >= 1),
            (
                Achievement::FullTechTree,
                self.technologies_researched as usize >= TechId::ALL.len(),
            ),
            (
                Achievement::Industrialist,
                self.total_production >= INDUSTRIALIST_THRESHOLD,
            ),
            (Achievement::DecisionMaker, self.events_resolved >= 1),
        ];
        for (achievement, reached) in earned {
            if reached && !self.has(achievement) {
                info!(?achievement, "Achievement unlocked");
                self.achievements.push(achievement);
            }
        }
    }
}
