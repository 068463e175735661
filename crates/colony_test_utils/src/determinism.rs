//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded engine driven by a [`ManualClock`](colony_core::engine::ManualClock)
//! must reach the same state every time. Sources of non-determinism include:
//!
//! - **Wall-clock reads**: the core never reads the clock itself; time is
//!   always passed in.
//! - **System randomness**: planet and event generation draw only from the
//!   engine's seeded RNG.
//! - **HashMap iteration order**: the state holds `Vec`s and `BTreeMap`s only.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: each module's rules in isolation
//! 2. **Property tests**: random action sequences still produce deterministic
//!    outputs and never break ledger atomicity
//! 3. **Integration tests**: full scenarios are reproducible

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use colony_core::simulation::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance the simulation by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use colony_test_utils::determinism::verify_determinism;
/// use colony_test_utils::fixtures::{advance, eventful_engine};
///
/// let result = verify_determinism(
///     3,
///     50,
///     || eventful_engine(42, 0.2),
///     |engine| {
///         advance(engine, 1_000);
///         let _ = engine.handle_event(0);
///     },
///     |engine| engine.state().state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Step two copies side by side and report the first step where they differ.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(step)` otherwise. Step 0 is the
/// initial state.
pub fn find_first_divergence<S, Setup, Step, HashFn>(
    setup: Setup,
    ticks: u64,
    step: Step,
    hash: HashFn,
) -> Option<u64>
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut a = setup();
    let mut b = setup();

    if hash(&a) != hash(&b) {
        return Some(0);
    }

    for tick in 1..=ticks {
        step(&mut a);
        step(&mut b);

        if hash(&a) != hash(&b) {
            return Some(tick);
        }
    }

    None
}

/// Verify that a JSON save/restore round trip preserves the state exactly.
///
/// This is what the persistence layer relies on.
pub fn verify_serialization_determinism(state: &GameState) -> bool {
    let Ok(restored) = save_and_restore(state) else {
        return false;
    };
    restored.state_hash() == state.state_hash()
}

fn save_and_restore(state: &GameState) -> Result<GameState, String> {
    use colony_core::persistence::{MemoryStore, PersistenceAdapter};

    let mut adapter = PersistenceAdapter::new(MemoryStore::new());
    adapter.save(state).map_err(|e| e.to_string())?;
    adapter
        .load()
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "nothing was stored".to_string())
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for the colony simulation.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of ledger rules and determinism.
pub mod strategies {
    use colony_core::prelude::*;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};
    use tracing::trace;

    use crate::fixtures::TestEngine;

    /// Generate a non-negative resource amount.
    ///
    /// Whole numbers keep sums exact in `f64`.
    pub fn arb_amount() -> impl Strategy<Value = f64> + Clone {
        (0u32..20_000u32).prop_map(f64::from)
    }

    /// Generate a signed resource change.
    pub fn arb_signed_amount() -> impl Strategy<Value = f64> + Clone {
        (-5_000i32..5_000i32).prop_map(f64::from)
    }

    /// Generate a full non-negative stockpile.
    pub fn arb_resources() -> impl Strategy<Value = Resources> {
        (
            arb_amount(),
            arb_amount(),
            arb_amount(),
            arb_amount(),
            arb_amount(),
        )
            .prop_map(|(c, m, e, f, p)| Resources::new(c, m, e, f, p))
    }

    fn arb_delta_from(
        amount: impl Strategy<Value = f64> + Clone,
    ) -> impl Strategy<Value = ResourceDelta> {
        (
            proptest::option::of(amount.clone()),
            proptest::option::of(amount.clone()),
            proptest::option::of(amount.clone()),
            proptest::option::of(amount.clone()),
            proptest::option::of(amount),
        )
            .prop_map(|(credits, minerals, energy, food, population)| ResourceDelta {
                credits,
                minerals,
                energy,
                food,
                population,
            })
    }

    /// Generate a cost: a partial map of non-negative amounts.
    pub fn arb_cost() -> impl Strategy<Value = ResourceDelta> {
        arb_delta_from(arb_amount())
    }

    /// Generate a partial map of signed amounts.
    pub fn arb_delta() -> impl Strategy<Value = ResourceDelta> {
        arb_delta_from(arb_signed_amount())
    }

    /// Generate one of the supported speed multipliers.
    pub fn arb_speed() -> impl Strategy<Value = f64> {
        prop::sample::select(GameSpeed::ALL.map(GameSpeed::multiplier).to_vec())
    }

    /// Generate any speed value, valid or not.
    pub fn arb_any_speed() -> impl Strategy<Value = f64> {
        prop_oneof![arb_speed(), (-10.0f64..10.0f64)]
    }

    /// Generate a technology id.
    pub fn arb_tech() -> impl Strategy<Value = TechId> {
        prop::sample::select(TechId::ALL.to_vec())
    }

    /// One player-facing operation.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Action {
        /// Advance the clock by this many milliseconds, then tick.
        Wait(u64),
        /// Credit a delta.
        Add(ResourceDelta),
        /// Try to spend a cost.
        Spend(ResourceDelta),
        /// Explore for a planet.
        Discover,
        /// Colonize the n-th known planet (modulo the planet count).
        Colonize(usize),
        /// Research a technology.
        Research(TechId),
        /// Pick a choice of the pending event.
        Choose(usize),
        /// Forfeit the pending event.
        Dismiss,
        /// Change speed.
        Speed(f64),
    }

    impl Action {
        /// Apply to an engine, ignoring rejections.
        pub fn apply(&self, engine: &mut TestEngine) {
            trace!(action = ?self, "Applying action");
            match self {
                Self::Wait(ms) => {
                    engine.clock_mut().advance(*ms);
                    engine.tick();
                }
                Self::Add(delta) => engine.add_resources(delta),
                Self::Spend(cost) => {
                    engine.spend_resources(cost);
                }
                Self::Discover => {
                    let _ = engine.discover_planet();
                }
                Self::Colonize(n) => {
                    let planets = engine.planets().all();
                    let id = planets[n % planets.len()].id.clone();
                    let _ = engine.colonize_planet(&id);
                }
                Self::Research(id) => {
                    let _ = engine.research_technology(*id);
                }
                Self::Choose(index) => {
                    let _ = engine.handle_event(*index);
                }
                Self::Dismiss => {
                    let _ = engine.dismiss_event();
                }
                Self::Speed(value) => {
                    let _ = engine.set_game_speed(*value);
                }
            }
        }
    }

    /// Generate a single action.
    pub fn arb_action() -> impl Strategy<Value = Action> {
        prop_oneof![
            3 => (0u64..30_000).prop_map(Action::Wait),
            1 => arb_delta().prop_map(Action::Add),
            1 => arb_cost().prop_map(Action::Spend),
            2 => Just(Action::Discover),
            2 => (0usize..8).prop_map(Action::Colonize),
            2 => arb_tech().prop_map(Action::Research),
            1 => (0usize..4).prop_map(Action::Choose),
            1 => Just(Action::Dismiss),
            1 => arb_any_speed().prop_map(Action::Speed),
        ]
    }

    /// Generate a sequence of actions.
    pub fn arb_action_sequence(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        proptest::collection::vec(arb_action(), 0..max_len)
    }
}
