//! Headless colony game runner.
//!
//! This binary runs the game without a UI, controlled via JSON on stdin/stdout.
//! Designed for scripted play, CI testing, and balance sweeps.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin, save under ./saves
//! cargo run -p colony_headless
//!
//! # Tick once a second for a minute, printing each tick
//! cargo run -p colony_headless -- run --ticks 60
//!
//! # Run batch balance test
//! cargo run -p colony_headless -- batch --strategy balanced --count 1000 --output results/
//!
//! # Verify determinism of a seed
//! cargo run -p colony_headless -- --seed 42 verify --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colony_core::config::EngineConfig;
use colony_core::engine::{GameEngine, ManualClock, SystemClock};
use colony_core::persistence::MemoryStore;
use colony_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{HeadlessConfig, HeadlessRunner},
    store::FileStore,
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "colony_headless")]
#[command(about = "Headless colony runner for scripted play, CI and balance sweeps")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Per-tick event chance (overrides the config file)
    #[arg(long, global = true)]
    event_probability: Option<f64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively over stdin/stdout
    Play {
        /// Directory holding the save file
        #[arg(short, long, default_value = "saves")]
        state_dir: PathBuf,

        /// Use a manual clock and an in-memory store (deterministic, nothing saved)
        #[arg(long)]
        manual_clock: bool,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Tick on a fixed real-time cadence
    Run {
        /// Directory holding the save file
        #[arg(short, long, default_value = "saves")]
        state_dir: PathBuf,

        /// Number of ticks (default: run until killed)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Milliseconds between ticks (default: from config)
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Run batch of games for balance testing
    Batch {
        /// Built-in strategy name
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Strategy file (RON), overrides --strategy
        #[arg(long)]
        strategy_file: Option<PathBuf>,

        /// Number of games to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Simulated game length in minutes
        #[arg(long, default_value = "60")]
        minutes: u64,
    },

    /// Verify determinism
    Verify {
        /// Built-in strategy name
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Simulated game length in minutes
        #[arg(long, default_value = "30")]
        minutes: u64,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "100000")]
        ticks: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    let config = match engine_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Play {
            state_dir,
            manual_clock,
            auto_state,
        }) => cmd_play(config, &state_dir, manual_clock, auto_state),
        Some(Commands::Run {
            state_dir,
            ticks,
            interval_ms,
            auto_state,
        }) => cmd_run(config, &state_dir, ticks, interval_ms, auto_state),
        Some(Commands::Batch {
            strategy,
            strategy_file,
            count,
            parallel,
            output,
            minutes,
        }) => {
            let strategy = resolve_strategy(&strategy, strategy_file.as_deref());
            cmd_batch(&config, strategy, count, parallel, output, minutes);
        }
        Some(Commands::Verify {
            strategy,
            runs,
            minutes,
        }) => {
            let strategy = resolve_strategy(&strategy, None);
            cmd_verify(&config, strategy, runs, minutes);
        }
        Some(Commands::Benchmark { ticks }) => cmd_benchmark(config, ticks),
        None => {
            // Default: interactive mode
            cmd_play(config, Path::new("saves"), false, false);
        }
    }
}

/// Config file (or defaults) with CLI overrides applied.
fn engine_config(cli: &Cli) -> colony_core::error::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(p) = cli.event_probability {
        config.event_probability = p;
    }
    config.validate()?;
    Ok(config)
}

fn resolve_strategy(name: &str, file: Option<&Path>) -> Strategy {
    if let Some(path) = file {
        match Strategy::load(path) {
            Ok(s) => return s,
            Err(e) => {
                eprintln!("Failed to load strategy: {e}");
                std::process::exit(1);
            }
        }
    }
    Strategy::preset(name).unwrap_or_else(|| {
        eprintln!("Unknown strategy '{name}' (expected balanced, expansionist, researcher or idle)");
        std::process::exit(1);
    })
}

/// Run a single interactive game
fn cmd_play(config: EngineConfig, state_dir: &Path, manual_clock: bool, auto_state: bool) {
    tracing::info!("Starting interactive session");

    let headless = HeadlessConfig {
        auto_state_output: auto_state,
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    let result = if manual_clock {
        let engine = GameEngine::new(config, MemoryStore::new(), ManualClock::new(0));
        HeadlessRunner::with_config(engine, headless).run(stdin.lock(), stdout.lock())
    } else {
        let engine = GameEngine::new(config, FileStore::new(state_dir), SystemClock);
        HeadlessRunner::with_config(engine, headless).run(stdin.lock(), stdout.lock())
    };

    if let Err(e) = result {
        eprintln!("Session ended with I/O error: {e}");
        std::process::exit(1);
    }
}

/// Tick on the wall clock
fn cmd_run(
    config: EngineConfig,
    state_dir: &Path,
    ticks: Option<u64>,
    interval_ms: Option<u64>,
    auto_state: bool,
) {
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.tick_interval_ms).max(1));
    let engine = GameEngine::new(config, FileStore::new(state_dir), SystemClock);
    let mut runner = HeadlessRunner::with_config(
        engine,
        HeadlessConfig {
            auto_state_output: auto_state,
        },
    );

    if let Err(e) = runner.run_timed(ticks, interval, std::io::stdout().lock()) {
        eprintln!("Run ended with I/O error: {e}");
        std::process::exit(1);
    }
}

/// Run batch of games for balance testing
fn cmd_batch(
    config: &EngineConfig,
    strategy: Strategy,
    count: u32,
    parallel: u32,
    output: PathBuf,
    minutes: u64,
) {
    let batch = BatchConfig {
        parallel_games: parallel,
        tick_interval_ms: config.tick_interval_ms,
        event_probability: config.event_probability,
        ..BatchConfig::new(strategy, count)
    }
    .with_output(output.clone())
    .with_seed(config.seed.unwrap_or(0))
    .with_game_seconds(minutes * 60);

    let results = run_batch(batch);
    let path = output.join("batch.json");
    if let Err(e) = results.save(&path) {
        eprintln!("Failed to save results to {}: {e}", path.display());
        std::process::exit(1);
    }

    let s = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH RESULTS: {}", results.config.strategy.name);
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games: {} ({} failed)", s.total_games, results.errors.len());
    eprintln!(
        "Total production: mean {:.0}, min {:.0}, max {:.0}",
        s.mean_total_production, s.min_total_production, s.max_total_production
    );
    eprintln!("Colonies: {:.2} mean", s.mean_planets_colonized);
    eprintln!("Technologies: {:.2} mean", s.mean_technologies);
    if let Some(t) = s.mean_first_colony_at {
        eprintln!("First colony: {t:.0}s mean");
    }
    for rate in &s.achievement_rates {
        eprintln!("  {:?}: {:.1}%", rate.achievement, rate.rate * 100.0);
    }
    eprintln!("Results written to {}", path.display());
}

/// Verify determinism
fn cmd_verify(config: &EngineConfig, strategy: Strategy, runs: u32, minutes: u64) {
    let seed = config.seed.unwrap_or(0);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        strategy.name,
        seed,
        runs
    );

    let batch = BatchConfig {
        tick_interval_ms: config.tick_interval_ms,
        event_probability: config.event_probability,
        ..BatchConfig::new(strategy, 1)
    }
    .with_game_seconds(minutes * 60);

    if verify_determinism(&batch, seed, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}

/// Run benchmark
fn cmd_benchmark(config: EngineConfig, ticks: u64) {
    let config = EngineConfig {
        autosave: false,
        ..config
    };
    let mut engine = GameEngine::new(config, MemoryStore::new(), ManualClock::new(0));
    let strategy = Strategy::expansionist();

    tracing::info!("Running {} tick benchmark", ticks);

    // Warmup: let the strategy build up some colonies
    for _ in 0..3_600 {
        engine.clock_mut().advance(1_000);
        engine.tick();
        strategy.play_turn(&mut engine);
    }

    eprintln!(
        "Starting benchmark with {} colonies",
        engine.planets().colonized().count()
    );
    eprintln!("Running {ticks} ticks...");

    let start = Instant::now();
    for _ in 0..ticks {
        engine.clock_mut().advance(1_000);
        engine.tick();
    }
    let elapsed = start.elapsed();

    let tps = ticks as f64 / elapsed.as_secs_f64();

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {ticks}");
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {tps:.1}");
    eprintln!("ms/tick: {:.4}", elapsed.as_millis() as f64 / ticks.max(1) as f64);
    eprintln!("State hash: {:016x}", engine.state().state_hash());
}
