//! Property tests for the resource ledger and the rules built on it.

use colony_core::prelude::{ActionError, GameSpeed, GameState, ResourceKind};
use colony_test_utils::determinism::strategies::{
    arb_action_sequence, arb_any_speed, arb_cost, arb_delta, arb_resources, arb_tech, Action,
};
use colony_test_utils::fixtures::eventful_engine;
use proptest::prelude::*;

proptest! {
    /// Debit is all-or-nothing and never goes below zero.
    #[test]
    fn prop_debit_is_atomic(start in arb_resources(), cost in arb_cost()) {
        let mut ledger = start;
        let spent = ledger.debit(&cost);

        if spent {
            for kind in ResourceKind::ALL {
                let expected = start.get(kind) - cost.get(kind).unwrap_or(0.0);
                prop_assert_eq!(ledger.get(kind), expected);
                prop_assert!(ledger.get(kind) >= 0.0);
            }
        } else {
            prop_assert_eq!(ledger, start);
            prop_assert!(start.shortfall(&cost).is_some());
        }
    }

    /// Credit adds exactly the fields that are present.
    #[test]
    fn prop_credit_touches_present_fields_only(start in arb_resources(), delta in arb_delta()) {
        let mut ledger = start;
        ledger.credit(&delta);
        for kind in ResourceKind::ALL {
            match delta.get(kind) {
                Some(amount) => prop_assert_eq!(ledger.get(kind), start.get(kind) + amount),
                None => prop_assert_eq!(ledger.get(kind), start.get(kind)),
            }
        }
    }

    /// A rejected research charges nothing; an accepted one charges the catalog cost once.
    #[test]
    fn prop_research_charges_at_most_once(start in arb_resources(), id in arb_tech()) {
        let mut state = GameState::new(0);
        state.resources = start;
        let cost = state.technologies.get(id).map(|t| t.cost).unwrap_or_default();

        let first = state.research_technology(id);
        let after_first = state.resources;
        let second = state.research_technology(id);

        if first.is_ok() {
            prop_assert_eq!(second, Err(ActionError::AlreadyResearched(id)));
        } else {
            prop_assert_eq!(&second, &first);
        }
        prop_assert_eq!(state.resources, after_first);
        if first.is_ok() {
            let mut expected = start;
            prop_assert!(expected.debit(&cost));
            prop_assert_eq!(after_first, expected);
        } else {
            prop_assert_eq!(after_first, start);
        }
    }

    /// Only the four supported speeds are accepted.
    #[test]
    fn prop_speed_is_validated(value in arb_any_speed()) {
        let mut state = GameState::new(0);
        let accepted = state.set_speed(value).is_ok();
        prop_assert_eq!(accepted, [0.5, 1.0, 2.0, 5.0].contains(&value));
        if !accepted {
            prop_assert_eq!(state.clock.speed, GameSpeed::Normal);
        }
    }

    /// No sequence of player actions makes a stockpile negative through a spend.
    ///
    /// Event effects and manual credits may push a balance below zero, so the
    /// check is on what spends do, not on the final balance.
    #[test]
    fn prop_actions_never_overspend(seed in any::<u64>(), actions in arb_action_sequence(60)) {
        let mut engine = eventful_engine(seed, 0.3);
        for action in &actions {
            let before = *engine.resources();
            action.apply(&mut engine);
            let after = *engine.resources();
            for kind in ResourceKind::ALL {
                if after.get(kind) < 0.0 && before.get(kind) >= 0.0 {
                    prop_assert!(
                        matches!(action, Action::Add(_) | Action::Choose(_)),
                        "{kind} went negative after {action:?}"
                    );
                }
            }
        }
        prop_assert!(engine.planets().colonized().count() >= 1);
        prop_assert_eq!(
            engine.stats().planets_colonized as usize,
            engine.planets().colonized().count()
        );
    }
}
