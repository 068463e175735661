//! Headless game runner implementation.
//!
//! [`HeadlessRunner`] wraps a [`GameEngine`] and maps protocol commands onto
//! engine operations. It is generic over the store and the clock: the binary
//! uses a [`FileStore`](crate::store::FileStore) with the wall clock, tests
//! use an in-memory store with a [`ManualClock`].

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use colony_core::engine::{Clock, GameEngine, ManualClock, SystemClock};
use colony_core::persistence::StateStore;
use colony_core::simulation::{ProductionRates, TickReport};
use tracing::{debug, info, warn};

use crate::protocol::{Command, PlanetState, Response, StateSnapshot, TechState};

/// A clock the controller may be allowed to move.
pub trait SteppableClock: Clock {
    /// Move forward by `ms`. Returns false if this clock cannot be moved.
    fn step(&mut self, ms: u64) -> bool;
}

impl SteppableClock for ManualClock {
    fn step(&mut self, ms: u64) -> bool {
        self.advance(ms);
        true
    }
}

impl SteppableClock for SystemClock {
    fn step(&mut self, _ms: u64) -> bool {
        false
    }
}

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every tick (vs only on query).
    pub auto_state_output: bool,
}

/// Headless runner for scripted or AI-controlled play.
pub struct HeadlessRunner<S, C> {
    engine: GameEngine<S, C>,
    config: HeadlessConfig,
}

impl<S: StateStore, C: SteppableClock> HeadlessRunner<S, C> {
    /// Create a runner with default config.
    pub fn new(engine: GameEngine<S, C>) -> Self {
        Self::with_config(engine, HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(engine: GameEngine<S, C>, config: HeadlessConfig) -> Self {
        Self { engine, config }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &GameEngine<S, C> {
        &self.engine
    }

    /// The wrapped engine, mutably.
    pub fn engine_mut(&mut self) -> &mut GameEngine<S, C> {
        &mut self.engine
    }

    /// Full state snapshot.
    pub fn snapshot(&self) -> StateSnapshot {
        let engine = &self.engine;
        StateSnapshot {
            now: engine.clock().now_ms(),
            resources: engine.resources().view(),
            rates: engine.production_rates(),
            speed: engine.speed().multiplier(),
            planets: engine.planets().all().iter().map(PlanetState::from).collect(),
            technologies: engine
                .technologies()
                .all()
                .iter()
                .map(|t| TechState {
                    id: t.id,
                    researched: t.researched,
                })
                .collect(),
            pending_event: engine.pending_event().cloned(),
            achievements: engine.stats().achievements.clone(),
            hash: engine.state().state_hash(),
        }
    }

    fn state_response(&self) -> Response {
        Response::State(Box::new(self.snapshot()))
    }

    fn after_tick(&self, report: TickReport) -> Vec<Response> {
        if let Some(id) = &report.triggered_event {
            info!(event = %id, "Event triggered");
        }
        let mut out = vec![Response::ticked(report)];
        if self.config.auto_state_output {
            out.push(self.state_response());
        }
        out
    }

    /// Apply one command and return the responses to send.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let name = cmd.name();
        debug!(cmd = name, "Handling command");
        let fail = |e: &dyn std::fmt::Display| vec![Response::error(e.to_string(), Some(name))];

        match cmd {
            Command::Tick => {
                let report = self.engine.tick();
                self.after_tick(report)
            }
            Command::Advance { ms, count } => {
                let mut total = TickReport {
                    elapsed_seconds: 0.0,
                    produced: ProductionRates::ZERO,
                    triggered_event: None,
                };
                for _ in 0..count {
                    if !self.engine.clock_mut().step(ms) {
                        return fail(&"advance needs a manual clock");
                    }
                    let report = self.engine.tick();
                    total.elapsed_seconds += report.elapsed_seconds;
                    total.produced = total.produced + report.produced;
                    if report.triggered_event.is_some() {
                        total.triggered_event = report.triggered_event;
                    }
                }
                self.after_tick(total)
            }
            Command::Query => vec![self.state_response()],
            Command::AddResources { resources } => {
                self.engine.add_resources(&resources);
                vec![Response::ack(name)]
            }
            Command::SpendResources { cost } => {
                let ok = self.engine.spend_resources(&cost);
                vec![Response::Spent { ok }]
            }
            Command::Discover => match self.engine.discover_planet() {
                Ok(planet) => vec![Response::Discovered { planet }],
                Err(e) => fail(&e),
            },
            Command::Colonize { planet_id } => match self.engine.colonize_planet(&planet_id) {
                Ok(()) => vec![Response::ack(name)],
                Err(e) => fail(&e),
            },
            Command::Research { tech_id } => match self.engine.research_technology(tech_id) {
                Ok(()) => vec![Response::ack(name)],
                Err(e) => fail(&e),
            },
            Command::HandleEvent { choice } => match self.engine.handle_event(choice) {
                Ok(choice) => vec![Response::EventResolved { choice }],
                Err(e) => fail(&e),
            },
            Command::DismissEvent => match self.engine.dismiss_event() {
                Ok(_) => vec![Response::ack(name)],
                Err(e) => fail(&e),
            },
            Command::Speed { multiplier } => match self.engine.set_game_speed(multiplier) {
                Ok(_) => vec![Response::ack(name)],
                Err(e) => fail(&e),
            },
            Command::Reset => {
                self.engine.reset_game();
                vec![Response::ack(name)]
            }
            Command::Save => match self.engine.save() {
                Ok(()) => vec![Response::ack(name)],
                Err(e) => fail(&e),
            },
            Command::Hash => vec![Response::StateHash {
                now: self.engine.clock().now_ms(),
                hash: self.engine.state().state_hash(),
            }],
            Command::Quit => vec![Response::Bye],
        }
    }

    /// Read JSON commands from `input` until `quit` or end of input.
    ///
    /// Responses are written to `output`, one per line. The state is saved
    /// before returning.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        write_response(&mut output, &Response::ready(self.engine.clock().now_ms()))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cmd = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    write_response(&mut output, &Response::error(format!("Parse error: {e}"), None))?;
                    continue;
                }
            };

            let quit = cmd == Command::Quit;
            for response in self.handle(cmd) {
                write_response(&mut output, &response)?;
            }
            if quit {
                break;
            }
        }

        self.save_on_exit();
        Ok(())
    }

    /// Tick on a fixed real-time cadence, writing one line per tick.
    ///
    /// Runs `ticks` times, or forever if `None`. The speed setting only
    /// scales what each tick produces; the cadence stays `interval`.
    pub fn run_timed<W: Write>(
        &mut self,
        ticks: Option<u64>,
        interval: Duration,
        mut output: W,
    ) -> io::Result<()> {
        info!(interval_ms = interval.as_millis(), "Starting timed run");
        let mut done = 0u64;
        while ticks.map_or(true, |limit| done < limit) {
            thread::sleep(interval);
            let report = self.engine.tick();
            for response in self.after_tick(report) {
                write_response(&mut output, &response)?;
            }
            done += 1;
        }
        self.save_on_exit();
        Ok(())
    }

    fn save_on_exit(&mut self) {
        if let Err(e) = self.engine.save() {
            warn!(error = %e, "Final save failed");
        }
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}
