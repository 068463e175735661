//! Random narrative events.
//!
//! At most one event is pending at a time. While it is pending no new events
//! are drawn; the player either picks a choice (its effect is credited to the
//! ledger) or dismisses the event and forfeits it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ActionError;
use crate::resources::{ResourceDelta, Resources};

/// Chance per tick that a new event fires while none is pending.
pub const DEFAULT_EVENT_PROBABILITY: f64 = 0.05;

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Something found.
    Discovery,
    /// Something went wrong.
    Disaster,
    /// A deal on offer.
    Opportunity,
    /// Someone hostile.
    Threat,
}

/// One option offered by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChoice {
    /// Button label.
    pub text: String,
    /// Credited to the ledger when picked. May be negative or empty.
    pub effect: ResourceDelta,
}

/// An event waiting for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Unique id.
    pub id: String,
    /// Category.
    pub kind: EventKind,
    /// Headline.
    pub title: String,
    /// Flavor text.
    pub description: String,
    /// Ordered options, two or three of them.
    pub choices: Vec<EventChoice>,
    /// Creation time in milliseconds.
    pub timestamp: u64,
}

struct ChoiceTemplate {
    text: &'static str,
    effect: ResourceDelta,
}

struct EventTemplate {
    kind: EventKind,
    title: &'static str,
    description: &'static str,
    choices: &'static [ChoiceTemplate],
}

const NOTHING: ResourceDelta = ResourceDelta::EMPTY;

static EVENT_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        kind: EventKind::Discovery,
        title: "Ancient Ruins",
        description: "Survey teams found the remains of a lost civilization.",
        choices: &[
            ChoiceTemplate {
                text: "Excavate the site",
                effect: ResourceDelta {
                    credits: Some(-100.0),
                    minerals: Some(250.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Sell the coordinates",
                effect: ResourceDelta {
                    credits: Some(300.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Leave it undisturbed",
                effect: NOTHING,
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Discovery,
        title: "Rich Asteroid Field",
        description: "Long-range scanners picked up a mineral-dense asteroid cluster.",
        choices: &[
            ChoiceTemplate {
                text: "Launch mining drones",
                effect: ResourceDelta {
                    energy: Some(-40.0),
                    minerals: Some(400.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Log it for later",
                effect: NOTHING,
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Disaster,
        title: "Solar Flare",
        description: "A massive flare is about to hit the colonies.",
        choices: &[
            ChoiceTemplate {
                text: "Divert power to shields",
                effect: ResourceDelta {
                    energy: Some(-60.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Ride it out",
                effect: ResourceDelta {
                    energy: Some(-20.0),
                    food: Some(-50.0),
                    ..NOTHING
                },
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Disaster,
        title: "Crop Blight",
        description: "A fungal blight is spreading through the farms.",
        choices: &[
            ChoiceTemplate {
                text: "Burn the affected fields",
                effect: ResourceDelta {
                    food: Some(-80.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Import a fungicide",
                effect: ResourceDelta {
                    credits: Some(-150.0),
                    ..NOTHING
                },
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Opportunity,
        title: "Trade Caravan",
        description: "A merchant convoy has dropped out of warp and wants to deal.",
        choices: &[
            ChoiceTemplate {
                text: "Sell minerals",
                effect: ResourceDelta {
                    minerals: Some(-100.0),
                    credits: Some(250.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Buy food",
                effect: ResourceDelta {
                    credits: Some(-100.0),
                    food: Some(150.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Decline",
                effect: NOTHING,
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Opportunity,
        title: "Refugee Fleet",
        description: "Ships fleeing a failed colony ask for shelter.",
        choices: &[
            ChoiceTemplate {
                text: "Welcome them",
                effect: ResourceDelta {
                    food: Some(-100.0),
                    population: Some(30.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Send them on",
                effect: NOTHING,
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Threat,
        title: "Pirate Raid",
        description: "Raiders are closing on the supply lanes.",
        choices: &[
            ChoiceTemplate {
                text: "Pay tribute",
                effect: ResourceDelta {
                    credits: Some(-200.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Fight them off",
                effect: ResourceDelta {
                    energy: Some(-80.0),
                    minerals: Some(-50.0),
                    population: Some(-5.0),
                    ..NOTHING
                },
            },
        ],
    },
    EventTemplate {
        kind: EventKind::Threat,
        title: "Rogue Signal",
        description: "An unknown intelligence is probing the colony network.",
        choices: &[
            ChoiceTemplate {
                text: "Shut down the grid",
                effect: ResourceDelta {
                    energy: Some(-100.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Attempt contact",
                effect: ResourceDelta {
                    credits: Some(200.0),
                    energy: Some(-30.0),
                    ..NOTHING
                },
            },
            ChoiceTemplate {
                text: "Ignore it",
                effect: ResourceDelta {
                    credits: Some(-50.0),
                    ..NOTHING
                },
            },
        ],
    },
];

/// Build a random event from the template set.
pub fn generate(rng: &mut impl Rng, now: u64) -> GameEvent {
    let template = &EVENT_TEMPLATES[rng.gen_range(0..EVENT_TEMPLATES.len())];
    GameEvent {
        id: format!("event-{now}-{:08x}", rng.gen::<u32>()),
        kind: template.kind,
        title: template.title.to_string(),
        description: template.description.to_string(),
        choices: template
            .choices
            .iter()
            .map(|c| EventChoice {
                text: c.text.to_string(),
                effect: c.effect,
            })
            .collect(),
        timestamp: now,
    }
}

/// Holds the pending event and applies the trigger policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventEngine {
    pending: Option<GameEvent>,
}

impl EventEngine {
    /// No event pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The event waiting for a decision, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&GameEvent> {
        self.pending.as_ref()
    }

    /// Per-tick trigger: when nothing is pending, fire with chance `probability`.
    ///
    /// No random draw happens while an event is pending. Returns the new event
    /// when one fired.
    pub fn maybe_trigger(
        &mut self,
        rng: &mut impl Rng,
        now: u64,
        probability: f64,
    ) -> Option<&GameEvent> {
        if self.pending.is_some() {
            return None;
        }
        if rng.gen::<f64>() >= probability {
            return None;
        }
        let event = generate(rng, now);
        info!(id = %event.id, kind = ?event.kind, title = %event.title, "Event triggered");
        self.pending = Some(event);
        self.pending.as_ref()
    }

    /// Apply choice `index` of the pending event and clear it.
    ///
    /// The effect is credited without an affordability check. An unknown index
    /// leaves the event pending.
    pub fn resolve(
        &mut self,
        index: usize,
        ledger: &mut Resources,
    ) -> Result<EventChoice, ActionError> {
        let event = self.pending.as_ref().ok_or(ActionError::NoPendingEvent)?;
        let choice = event
            .choices
            .get(index)
            .cloned()
            .ok_or(ActionError::ChoiceOutOfRange {
                index,
                available: event.choices.len(),
            })?;
        ledger.credit(&choice.effect);
        info!(id = %event.id, choice = %choice.text, "Event resolved");
        self.pending = None;
        Ok(choice)
    }

    /// Drop the pending event without applying anything.
    pub fn dismiss(&mut self) -> Result<GameEvent, ActionError> {
        let event = self.pending.take().ok_or(ActionError::NoPendingEvent)?;
        info!(id = %event.id, "Event dismissed");
        Ok(event)
    }
}
