//! Headless colony runner for scripted play, CI verification and balance sweeps.
//!
//! This crate drives a [`colony_core::engine::GameEngine`] without any UI:
//!
//! - **Interactive control**: JSON commands on stdin, responses on stdout
//! - **Timed runs**: tick on a fixed real-time cadence, as a UI timer would
//! - **Batch sweeps**: many seeded games in parallel with an auto-play strategy
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (advance, discover, research, ...)
//! - **stdout**: Responses and state snapshots (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Play interactively against the saved game in ./saves
//! echo '{"cmd":"query"}' | cargo run -p colony_headless -- play --state-dir saves
//!
//! # Deterministic session on a manual clock
//! echo '{"cmd":"advance","ms":1000,"count":60}' | cargo run -p colony_headless -- play --manual-clock --seed 7
//!
//! # Balance sweep
//! cargo run -p colony_headless -- batch --strategy expansionist --count 500
//! ```

pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod store;
pub mod strategies;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, GameMetrics};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner, SteppableClock};
pub use store::FileStore;
pub use strategies::Strategy;
