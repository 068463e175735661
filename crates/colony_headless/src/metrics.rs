//! Game metrics collection for balance analysis.

use colony_core::engine::{Clock, GameEngine};
use colony_core::persistence::StateStore;
use colony_core::resources::ResourceView;
use colony_core::stats::Achievement;
use serde::{Deserialize, Serialize};

use crate::strategies::TurnLog;

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Strategy name.
    pub strategy: String,
    /// Random seed used.
    pub seed: u64,
    /// Simulated wall-clock seconds.
    pub simulated_seconds: f64,
    /// Stockpiles at the end.
    pub final_resources: ResourceView,
    /// Planets discovered by the strategy.
    pub planets_discovered: u32,
    /// Colonized planets at the end, home included.
    pub planets_colonized: u32,
    /// Technologies researched.
    pub technologies_researched: u32,
    /// Events answered with a choice.
    pub events_resolved: u32,
    /// Events dismissed.
    pub events_dismissed: u32,
    /// Total tick production.
    pub total_production: f64,
    /// Seconds until the first colony beyond home, if any.
    pub first_colony_at: Option<f64>,
    /// Achievements in unlock order.
    pub achievements: Vec<Achievement>,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, strategy: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            strategy: strategy.into(),
            seed,
            ..Default::default()
        }
    }

    /// Fold one turn into the counters.
    pub fn record_turn(&mut self, log: TurnLog, elapsed_seconds: f64) {
        self.simulated_seconds += elapsed_seconds;
        self.planets_discovered += log.discovered;
        self.events_resolved += log.events_resolved;
        self.events_dismissed += log.events_dismissed;
        if log.colonized > 0 && self.first_colony_at.is_none() {
            self.first_colony_at = Some(self.simulated_seconds);
        }
    }

    /// Copy end-of-game values from the engine.
    pub fn finalize<S: StateStore, C: Clock>(&mut self, engine: &GameEngine<S, C>) {
        let stats = engine.stats();
        self.final_resources = engine.resources().view();
        self.planets_colonized = stats.planets_colonized;
        self.technologies_researched = stats.technologies_researched;
        self.total_production = stats.total_production;
        self.achievements = stats.achievements.clone();
        self.final_state_hash = engine.state().state_hash();
    }
}

/// Share of games that unlocked an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRate {
    /// Achievement.
    pub achievement: Achievement,
    /// Fraction of games, 0.0 to 1.0.
    pub rate: f64,
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games included.
    pub total_games: u32,
    /// Mean total production.
    pub mean_total_production: f64,
    /// Lowest total production.
    pub min_total_production: f64,
    /// Highest total production.
    pub max_total_production: f64,
    /// Mean colonized planets.
    pub mean_planets_colonized: f64,
    /// Mean researched technologies.
    pub mean_technologies: f64,
    /// Mean time to first colony, over games that founded one.
    pub mean_first_colony_at: Option<f64>,
    /// Unlock rate per achievement, in first-seen order.
    pub achievement_rates: Vec<AchievementRate>,
}

impl BatchSummary {
    /// Aggregate a set of games.
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let n = games.len() as f64;

        let mut min_total_production = f64::INFINITY;
        let mut max_total_production = f64::NEG_INFINITY;
        let mut production_sum = 0.0;
        let mut planets_sum = 0.0;
        let mut tech_sum = 0.0;
        let mut colony_times = Vec::new();
        let mut unlocks: Vec<(Achievement, u32)> = Vec::new();

        for game in games {
            production_sum += game.total_production;
            min_total_production = min_total_production.min(game.total_production);
            max_total_production = max_total_production.max(game.total_production);
            planets_sum += f64::from(game.planets_colonized);
            tech_sum += f64::from(game.technologies_researched);
            colony_times.extend(game.first_colony_at);

            for achievement in &game.achievements {
                match unlocks.iter_mut().find(|(a, _)| a == achievement) {
                    Some((_, count)) => *count += 1,
                    None => unlocks.push((*achievement, 1)),
                }
            }
        }

        let mean_first_colony_at = if colony_times.is_empty() {
            None
        } else {
            Some(colony_times.iter().sum::<f64>() / colony_times.len() as f64)
        };

        Self {
            total_games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            mean_total_production: production_sum / n,
            min_total_production,
            max_total_production,
            mean_planets_colonized: planets_sum / n,
            mean_technologies: tech_sum / n,
            mean_first_colony_at,
            achievement_rates: unlocks
                .into_iter()
                .map(|(achievement, count)| AchievementRate {
                    achievement,
                    rate: f64::from(count) / n,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(production: f64, colonies: u32, achievements: Vec<Achievement>) -> GameMetrics {
        GameMetrics {
            total_production: production,
            planets_colonized: colonies,
            achievements,
            ..GameMetrics::new("g", "balanced", 0)
        }
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_games(&[]), BatchSummary::default());
    }

    #[test]
    fn test_summary_aggregates() {
        let games = vec![
            game(100.0, 1, vec![]),
            game(300.0, 3, vec![Achievement::FirstColony]),
        ];
        let summary = BatchSummary::from_games(&games);
        assert_eq!(summary.total_games, 2);
        assert_eq!(summary.mean_total_production, 200.0);
        assert_eq!(summary.min_total_production, 100.0);
        assert_eq!(summary.max_total_production, 300.0);
        assert_eq!(summary.mean_planets_colonized, 2.0);
        assert_eq!(
            summary.achievement_rates,
            vec![AchievementRate {
                achievement: Achievement::FirstColony,
                rate: 0.5,
            }]
        );
    }

    #[test]
    fn test_first_colony_time_is_recorded_once() {
        let mut metrics = GameMetrics::new("g", "s", 1);
        metrics.record_turn(TurnLog::default(), 10.0);
        metrics.record_turn(
            TurnLog {
                colonized: 1,
                ..TurnLog::default()
            },
            5.0,
        );
        metrics.record_turn(
            TurnLog {
                colonized: 1,
                ..TurnLog::default()
            },
            5.0,
        );
        assert_eq!(metrics.first_colony_at, Some(15.0));
        assert_eq!(metrics.simulated_seconds, 20.0);
    }
}
