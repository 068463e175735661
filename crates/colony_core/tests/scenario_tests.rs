//! Gameplay scenarios for colony_core.
//!
//! Each test drives a [`GameEngine`] through its public operations with a
//! manual clock and an in-memory store, the same way a UI would.

use colony_core::planets::HOME_PLANET_ID;
use colony_core::prelude::*;
use colony_test_utils::fixtures::{
    advance, colonize_many, eventful_engine, quiet_config, quiet_engine, rich_engine,
};

fn drain(engine: &mut colony_test_utils::fixtures::TestEngine, cost: ResourceDelta) {
    assert!(engine.spend_resources(&cost));
}

// =============================================================================
// Exploration and colonization
// =============================================================================

mod planets {
    use super::*;

    #[test]
    fn test_discover_with_exact_funds() {
        let mut engine = quiet_engine(1);
        drain(
            &mut engine,
            ResourceDelta::new()
                .with(ResourceKind::Credits, 800.0)
                .with(ResourceKind::Energy, 50.0),
        );

        let planet = engine.discover_planet().unwrap();

        assert_eq!(engine.resources().credits, 0.0);
        assert_eq!(engine.resources().energy, 0.0);
        assert!(!planet.colonized);
        assert_eq!(planet.population, 0.0);
        assert_eq!(engine.planets().all().last(), Some(&planet));
    }

    #[test]
    fn test_colonize_with_499_credits_changes_nothing() {
        let mut engine = quiet_engine(1);
        let planet = engine.discover_planet().unwrap();
        // 1000 - 200 for exploration leaves 800
        drain(&mut engine, ResourceDelta::new().with(ResourceKind::Credits, 301.0));
        let before = *engine.resources();

        let err = engine.colonize_planet(&planet.id).unwrap_err();

        assert_eq!(
            err,
            ActionError::InsufficientResources {
                resource: ResourceKind::Credits,
                required: 500.0,
                available: 499.0,
            }
        );
        assert_eq!(*engine.resources(), before);
        assert!(!engine.planets().get(&planet.id).unwrap().colonized);
    }

    #[test]
    fn test_colonize_colonized_planet_is_a_no_op_even_when_rich() {
        let mut engine = rich_engine(1);
        let before = engine.state().clone();
        assert!(engine.colonize_planet(HOME_PLANET_ID).is_err());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_unknown_planet_is_rejected() {
        let mut engine = rich_engine(1);
        assert_eq!(
            engine.colonize_planet("nowhere"),
            Err(ActionError::UnknownPlanet("nowhere".to_string()))
        );
    }

    #[test]
    fn test_new_colony_starts_producing() {
        let mut engine = rich_engine(2);
        let home = engine.production_rates();
        let ids = colonize_many(&mut engine, 1);
        let colony = engine.planets().get(&ids[0]).unwrap().clone();

        assert_eq!(colony.population, 50.0);
        let rates = engine.production_rates();
        assert_eq!(rates.credits, home.credits + 2.5);
        assert_eq!(
            rates.minerals,
            home.minerals + colony.production_bonus.minerals * 0.5
        );
    }

    #[test]
    fn test_five_colonies_unlock_expansionist() {
        let mut engine = rich_engine(3);
        colonize_many(&mut engine, 4);
        assert!(engine.stats().has(Achievement::FirstColony));
        assert!(engine.stats().has(Achievement::Expansionist));
    }
}

// =============================================================================
// Production
// =============================================================================

mod production {
    use super::*;

    #[test]
    fn test_ten_second_tick_from_home() {
        let mut engine = quiet_engine(1);
        let report = advance(&mut engine, 10_000);

        assert_eq!(report.produced.credits, 50.0);
        assert_eq!(report.produced.minerals, 100.0);
        assert_eq!(report.produced.energy, 100.0);
        assert_eq!(report.produced.food, 150.0);
        assert_eq!(engine.resources().population, 100.0);
    }

    #[test]
    fn test_advanced_mining_multiplies_summed_minerals() {
        let mut plain = rich_engine(5);
        colonize_many(&mut plain, 2);
        let mut boosted = rich_engine(5);
        colonize_many(&mut boosted, 2);
        boosted.research_technology(TechId::AdvancedMining).unwrap();

        let base = advance(&mut plain, 10_000).produced;
        let more = advance(&mut boosted, 10_000).produced;

        assert!((more.minerals - base.minerals * 1.5).abs() < 1e-9);
        assert_eq!(more.energy, base.energy);
        assert_eq!(more.food, base.food);
    }

    #[test]
    fn test_zero_elapsed_tick_changes_nothing() {
        let mut engine = quiet_engine(1);
        let before = *engine.resources();
        let report = engine.tick();
        assert_eq!(report.elapsed_seconds, 0.0);
        assert_eq!(*engine.resources(), before);
    }

    #[test]
    fn test_speed_affects_magnitude_not_cadence() {
        let mut engine = quiet_engine(1);
        engine.set_game_speed(0.5).unwrap();
        let report = advance(&mut engine, 4_000);
        assert_eq!(report.elapsed_seconds, 4.0);
        assert_eq!(report.produced.minerals, 20.0);
    }

    #[test]
    fn test_invalid_speed_keeps_current() {
        let mut engine = quiet_engine(1);
        engine.set_game_speed(5.0).unwrap();
        assert!(engine.set_game_speed(0.0).is_err());
        assert_eq!(engine.speed(), GameSpeed::Quintuple);
    }

    #[test]
    fn test_industrialist_after_long_absence() {
        let mut engine = quiet_engine(1);
        // 40/s at home
        advance(&mut engine, 250_000);
        assert!(engine.stats().total_production >= 10_000.0);
        assert!(engine.stats().has(Achievement::Industrialist));
    }
}

// =============================================================================
// Research
// =============================================================================

mod research {
    use super::*;

    #[test]
    fn test_research_twice_is_rejected_without_charge() {
        let mut engine = rich_engine(1);
        engine.research_technology(TechId::SolarArrays).unwrap();
        let before = *engine.resources();

        assert_eq!(
            engine.research_technology(TechId::SolarArrays),
            Err(ActionError::AlreadyResearched(TechId::SolarArrays))
        );
        assert_eq!(*engine.resources(), before);
        assert_eq!(engine.stats().technologies_researched, 1);
    }

    #[test]
    fn test_multiplier_never_applies_twice() {
        let mut engine = rich_engine(1);
        let base = engine.production_rates().energy;
        engine.research_technology(TechId::SolarArrays).unwrap();
        let _ = engine.research_technology(TechId::SolarArrays);
        assert_eq!(engine.production_rates().energy, base * 1.5);
    }

    #[test]
    fn test_inert_technologies_do_not_change_rates() {
        let mut engine = rich_engine(1);
        let base = engine.production_rates();
        for id in [
            TechId::WarpDrive,
            TechId::Terraforming,
            TechId::PopulationGrowth,
            TechId::QuantumComputing,
            TechId::DefenseSystems,
        ] {
            engine.research_technology(id).unwrap();
        }
        assert_eq!(engine.production_rates(), base);
    }

    #[test]
    fn test_full_tech_tree() {
        let mut engine = rich_engine(1);
        for id in TechId::ALL {
            engine.research_technology(id).unwrap();
        }
        assert_eq!(engine.technologies().researched_count(), 8);
        assert!(engine.stats().has(Achievement::FullTechTree));
    }

    #[test]
    fn test_unaffordable_research_reports_shortfall() {
        let mut engine = quiet_engine(1);
        let err = engine.research_technology(TechId::WarpDrive).unwrap_err();
        assert!(matches!(
            err,
            ActionError::InsufficientResources {
                resource: ResourceKind::Credits,
                ..
            }
        ));
        assert_eq!(*engine.resources(), Resources::STARTING);
    }
}

// =============================================================================
// Events
// =============================================================================

mod events {
    use super::*;

    fn engine_with_event() -> colony_test_utils::fixtures::TestEngine {
        let mut engine = eventful_engine(9, 1.0);
        advance(&mut engine, 1_000);
        assert!(engine.pending_event().is_some());
        engine
    }

    #[test]
    fn test_pending_event_blocks_new_events() {
        let mut engine = engine_with_event();
        let id = engine.pending_event().unwrap().id.clone();
        let report = advance(&mut engine, 1_000);
        assert_eq!(report.triggered_event, None);
        assert_eq!(engine.pending_event().unwrap().id, id);
    }

    #[test]
    fn test_choice_effect_is_credited() {
        let mut engine = engine_with_event();
        let effect = engine.pending_event().unwrap().choices[0].effect;
        let before = *engine.resources();

        let choice = engine.handle_event(0).unwrap();

        assert_eq!(choice.effect, effect);
        for kind in ResourceKind::ALL {
            let expected = before.get(kind) + effect.get(kind).unwrap_or(0.0);
            assert_eq!(engine.resources().get(kind), expected);
        }
        assert!(engine.pending_event().is_none());
        assert!(engine.stats().has(Achievement::DecisionMaker));
    }

    #[test]
    fn test_out_of_range_choice_keeps_event() {
        let mut engine = engine_with_event();
        let count = engine.pending_event().unwrap().choices.len();
        let before = *engine.resources();

        assert_eq!(
            engine.handle_event(count),
            Err(ActionError::ChoiceOutOfRange {
                index: count,
                available: count,
            })
        );
        assert!(engine.pending_event().is_some());
        assert_eq!(*engine.resources(), before);
    }

    #[test]
    fn test_dismiss_applies_nothing() {
        let mut engine = engine_with_event();
        let before = *engine.resources();
        engine.dismiss_event().unwrap();
        assert!(engine.pending_event().is_none());
        assert_eq!(*engine.resources(), before);
        assert_eq!(engine.dismiss_event(), Err(ActionError::NoPendingEvent));
    }

    #[test]
    fn test_handle_without_event() {
        let mut engine = quiet_engine(1);
        assert_eq!(engine.handle_event(0), Err(ActionError::NoPendingEvent));
    }
}

// =============================================================================
// Reset and persistence
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_reset_restores_exact_defaults() {
        let mut engine = eventful_engine(4, 1.0);
        advance(&mut engine, 5_000);
        engine.discover_planet().unwrap();
        engine.research_technology(TechId::Hydroponics).unwrap();
        engine.set_game_speed(2.0).unwrap();

        engine.reset_game();

        assert_eq!(*engine.resources(), Resources::new(1000.0, 500.0, 100.0, 200.0, 100.0));
        assert_eq!(engine.planets().len(), 1);
        let home = engine.planets().get(HOME_PLANET_ID).unwrap();
        assert!(home.colonized);
        assert_eq!(home.population, 100.0);
        assert_eq!(engine.technologies().researched_count(), 0);
        assert!(engine.pending_event().is_none());
        assert_eq!(engine.speed(), GameSpeed::Normal);
    }

    #[test]
    fn test_game_survives_restart() {
        let mut engine = rich_engine(6);
        colonize_many(&mut engine, 2);
        engine.research_technology(TechId::Hydroponics).unwrap();
        advance(&mut engine, 3_000);

        let store = engine.persistence().store().clone();
        let restored = GameEngine::new(quiet_config(6), store, ManualClock::new(3_000));

        assert_eq!(restored.state(), engine.state());
        assert_eq!(restored.state().state_hash(), engine.state().state_hash());
    }

    #[test]
    fn test_storage_key_is_configurable() {
        let mut config = quiet_config(1);
        config.storage_key = "slot-2".to_string();
        let mut engine = GameEngine::new(config, MemoryStore::new(), ManualClock::new(0));
        engine.tick();
        assert!(engine.persistence().store().get("slot-2").is_some());
        assert!(engine.persistence().store().get("colony-sim-state").is_none());
    }

    #[test]
    fn test_corrupt_save_starts_fresh() {
        let mut store = MemoryStore::new();
        store.write("colony-sim-state", "not json").unwrap();
        let engine = GameEngine::new(quiet_config(1), store, ManualClock::new(42));
        assert_eq!(engine.state(), &GameState::new(42));
    }
}
