//! Error types for the colony simulation.

use thiserror::Error;

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use crate::resources::ResourceKind;
use crate::technology::TechId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for everything outside the per-action rejections.
#[derive(Debug, Error)]
pub enum GameError {
    /// Saving or restoring state failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A player action was rejected.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Why a player action was rejected.
///
/// A rejected action never mutates state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// The ledger cannot cover the cost.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// First resource found short.
        resource: ResourceKind,
        /// Amount required.
        required: f64,
        /// Amount available.
        available: f64,
    },

    /// No planet with this id exists.
    #[error("Unknown planet: {0}")]
    UnknownPlanet(String),

    /// The planet already has a colony.
    #[error("Planet already colonized: {0}")]
    AlreadyColonized(String),

    /// No technology with this id exists.
    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),

    /// The technology was researched earlier.
    #[error("Technology already researched: {0}")]
    AlreadyResearched(TechId),

    /// There is no event waiting for a decision.
    #[error("No pending event")]
    NoPendingEvent,

    /// The choice index does not exist on the pending event.
    #[error("Choice {index} out of range (event has {available} choices)")]
    ChoiceOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of choices on the event.
        available: usize,
    },

    /// The speed multiplier is not one of the supported values.
    #[error("Unsupported game speed: {0}")]
    InvalidSpeed(f64),
}
