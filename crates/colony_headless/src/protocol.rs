//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and state snapshots
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","now":...}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with at least one response
//! 4. `quit` is answered with `{"type":"bye"}` and ends the session
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","now":0}
//! -> {"cmd":"advance","ms":10000}
//! <- {"type":"ticked","elapsed_seconds":10.0,"produced":{...},"triggered_event":null}
//! -> {"cmd":"discover"}
//! <- {"type":"discovered","planet":{"id":"planet-10000-1f2e3d4c",...}}
//! -> {"cmd":"colonize","planet_id":"planet-10000-1f2e3d4c"}
//! <- {"type":"ack","cmd":"colonize"}
//! -> {"cmd":"research","tech_id":"advanced-mining"}
//! <- {"type":"error","message":"Insufficient resources: need 500 credits, have 300","cmd":"research"}
//! -> {"cmd":"query"}
//! <- {"type":"state","now":10000,...}
//! ```

use colony_core::events::{EventChoice, GameEvent};
use colony_core::planets::Planet;
use colony_core::resources::{ResourceDelta, ResourceView};
use colony_core::simulation::{ProductionRates, TickReport};
use colony_core::stats::Achievement;
use colony_core::technology::TechId;
use serde::{Deserialize, Serialize};

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Run one tick at the clock's current time.
    Tick,

    /// Move a manual clock forward and tick, `count` times.
    Advance {
        ms: u64,
        #[serde(default = "default_advance_count")]
        count: u32,
    },

    /// Report the current state without advancing time.
    Query,

    /// Credit resources.
    AddResources { resources: ResourceDelta },

    /// Spend resources if fully affordable.
    SpendResources { cost: ResourceDelta },

    /// Explore for a new planet.
    Discover,

    /// Found a colony.
    Colonize { planet_id: String },

    /// Buy a technology.
    Research { tech_id: TechId },

    /// Pick a choice of the pending event.
    HandleEvent { choice: usize },

    /// Forfeit the pending event.
    DismissEvent,

    /// Set game speed multiplier.
    Speed { multiplier: f64 },

    /// Start a new game.
    Reset,

    /// Persist the state now.
    Save,

    /// Report the state hash (for determinism verification).
    Hash,

    /// End the session.
    Quit,
}

fn default_advance_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, now: u64 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// A tick ran.
    Ticked {
        elapsed_seconds: f64,
        produced: ProductionRates,
        triggered_event: Option<String>,
    },

    /// Outcome of a spend.
    Spent { ok: bool },

    /// A planet was found.
    Discovered { planet: Planet },

    /// An event choice was applied.
    EventResolved { choice: EventChoice },

    /// Current game state.
    State(Box<StateSnapshot>),

    /// State hash for determinism verification.
    StateHash { now: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Everything a UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Clock reading.
    pub now: u64,
    /// Floored stockpiles.
    pub resources: ResourceView,
    /// Per-second production before speed.
    pub rates: ProductionRates,
    /// Speed multiplier.
    pub speed: f64,
    /// Known planets.
    pub planets: Vec<PlanetState>,
    /// Research catalog.
    pub technologies: Vec<TechState>,
    /// Event waiting for a decision.
    pub pending_event: Option<GameEvent>,
    /// Unlocked achievements.
    pub achievements: Vec<Achievement>,
    /// State hash.
    pub hash: u64,
}

/// Compact view of a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetState {
    pub id: String,
    pub name: String,
    pub colonized: bool,
    pub population: f64,
}

impl From<&Planet> for PlanetState {
    fn from(planet: &Planet) -> Self {
        Self {
            id: planet.id.clone(),
            name: planet.name.clone(),
            colonized: planet.colonized,
            population: planet.population,
        }
    }
}

/// Compact view of a technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechState {
    pub id: TechId,
    pub researched: bool,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(now: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            now,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Create a tick response.
    pub fn ticked(report: TickReport) -> Self {
        Self::Ticked {
            elapsed_seconds: report.elapsed_seconds,
            produced: report.produced,
            triggered_event: report.triggered_event,
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Advance { .. } => "advance",
            Self::Query => "query",
            Self::AddResources { .. } => "add_resources",
            Self::SpendResources { .. } => "spend_resources",
            Self::Discover => "discover",
            Self::Colonize { .. } => "colonize",
            Self::Research { .. } => "research",
            Self::HandleEvent { .. } => "handle_event",
            Self::DismissEvent => "dismiss_event",
            Self::Speed { .. } => "speed",
            Self::Reset => "reset",
            Self::Save => "save",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
