//! Batch game runner for balance testing.
//!
//! Plays many seeded games in parallel using rayon, each on a manual clock
//! and an in-memory store, and aggregates the results.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use colony_core::config::EngineConfig;
use colony_core::engine::{GameEngine, ManualClock};
use colony_core::persistence::MemoryStore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics};
use crate::strategies::Strategy;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Strategy every game plays
    pub strategy: Strategy,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Simulated length of each game in seconds
    pub game_seconds: u64,
    /// Simulated time between ticks
    pub tick_interval_ms: u64,
    /// Per-tick event chance
    pub event_probability: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            strategy: Strategy::default(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            game_seconds: 3_600,
            tick_interval_ms: engine.tick_interval_ms,
            event_probability: engine.event_probability,
        }
    }
}

impl BatchConfig {
    /// Create config for a strategy
    pub fn new(strategy: Strategy, game_count: u32) -> Self {
        Self {
            strategy,
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set game length
    pub fn with_game_seconds(mut self, seconds: u64) -> Self {
        self.game_seconds = seconds;
        self
    }

    fn engine_config(&self, seed: u64) -> EngineConfig {
        EngineConfig {
            autosave: false,
            tick_interval_ms: self.tick_interval_ms,
            ..EngineConfig::default()
        }
        .with_seed(seed)
        .with_event_probability(self.event_probability)
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Play one game to completion.
pub fn run_single_game(seed: u64, config: &BatchConfig) -> Result<GameMetrics, String> {
    let engine_config = config.engine_config(seed);
    engine_config.validate().map_err(|e| e.to_string())?;

    let mut engine = GameEngine::new(engine_config, MemoryStore::new(), ManualClock::new(0));
    let mut metrics = GameMetrics::new(format!("game_{seed}"), &config.strategy.name, seed);

    let ticks = config.game_seconds * 1_000 / config.tick_interval_ms;
    for _ in 0..ticks {
        engine.clock_mut().advance(config.tick_interval_ms);
        let report = engine.tick();
        let turn = config.strategy.play_turn(&mut engine);
        metrics.record_turn(turn, report.elapsed_seconds);
    }

    metrics.finalize(&engine);
    Ok(metrics)
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.strategy.name
    );

    // Configure thread pool if specified
    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_single_game(seed, &config) {
                Ok(metrics) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 10 == 0 {
                        debug!("Progress: {}/{}", done, config.game_count);
                    }
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Game {} failed: {}", i, e);
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message: e,
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by playing the same seed several times.
pub fn verify_determinism(config: &BatchConfig, seed: u64, runs: u32) -> bool {
    let mut hashes = Vec::with_capacity(runs as usize);
    for _ in 0..runs {
        match run_single_game(seed, config) {
            Ok(metrics) => hashes.push(metrics.final_state_hash),
            Err(e) => {
                warn!("Verification run failed: {}", e);
                return false;
            }
        }
    }
    hashes.windows(2).all(|w| w[0] == w[1])
}
