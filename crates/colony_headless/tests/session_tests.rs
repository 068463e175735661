//! End-to-end JSON-lines sessions against the headless runner.

use colony_core::config::EngineConfig;
use colony_core::engine::{GameEngine, ManualClock};
use colony_core::persistence::MemoryStore;
use colony_headless::protocol::Response;
use colony_headless::{FileStore, HeadlessRunner};
use colony_test_utils::fixtures::{quiet_config, quiet_engine};

fn play<S, C>(runner: &mut HeadlessRunner<S, C>, script: &str) -> Vec<Response>
where
    S: colony_core::persistence::StateStore,
    C: colony_headless::SteppableClock,
{
    let mut out = Vec::new();
    runner.run(script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_session_greets_and_says_bye() {
    let mut runner = HeadlessRunner::new(quiet_engine(1));
    let responses = play(&mut runner, "{\"cmd\":\"quit\"}\n{\"cmd\":\"tick\"}\n");

    assert_eq!(responses.len(), 2);
    assert!(matches!(responses[0], Response::Ready { now: 0, .. }));
    assert_eq!(responses[1], Response::Bye);
}

#[test]
fn test_ten_second_advance_over_the_wire() {
    let mut runner = HeadlessRunner::new(quiet_engine(1));
    let responses = play(
        &mut runner,
        "{\"cmd\":\"advance\",\"ms\":10000}\n{\"cmd\":\"query\"}\n",
    );

    match &responses[1] {
        Response::Ticked {
            elapsed_seconds,
            produced,
            ..
        } => {
            assert_eq!(*elapsed_seconds, 10.0);
            assert_eq!(produced.credits, 50.0);
        }
        other => panic!("expected ticked, got {other:?}"),
    }
    match &responses[2] {
        Response::State(snapshot) => {
            assert_eq!(snapshot.now, 10_000);
            assert_eq!(snapshot.resources.credits, 1050);
        }
        other => panic!("expected state, got {other:?}"),
    }
}

#[test]
fn test_bad_lines_do_not_end_the_session() {
    let mut runner = HeadlessRunner::new(quiet_engine(1));
    let script = "not json\n\n{\"cmd\":\"warp\"}\n{\"cmd\":\"hash\"}\n";
    let responses = play(&mut runner, script);

    // ready, two parse errors, hash
    assert_eq!(responses.len(), 4);
    assert!(matches!(responses[1], Response::Error { cmd: None, .. }));
    assert!(matches!(responses[2], Response::Error { cmd: None, .. }));
    assert!(matches!(responses[3], Response::StateHash { now: 0, .. }));
}

#[test]
fn test_rejections_name_the_command() {
    let mut runner = HeadlessRunner::new(quiet_engine(1));
    let script = "{\"cmd\":\"colonize\",\"planet_id\":\"nowhere\"}\n\
                  {\"cmd\":\"speed\",\"multiplier\":3.0}\n\
                  {\"cmd\":\"handle_event\",\"choice\":0}\n";
    let responses = play(&mut runner, script);

    for (response, name) in responses[1..].iter().zip(["colonize", "speed", "handle_event"]) {
        match response {
            Response::Error { cmd, .. } => assert_eq!(cmd.as_deref(), Some(name)),
            other => panic!("expected error for {name}, got {other:?}"),
        }
    }
}

#[test]
fn test_spend_reports_outcome() {
    let mut runner = HeadlessRunner::new(quiet_engine(1));
    let script = "{\"cmd\":\"spend_resources\",\"cost\":{\"credits\":400}}\n\
                  {\"cmd\":\"spend_resources\",\"cost\":{\"credits\":700}}\n";
    let responses = play(&mut runner, script);

    assert_eq!(responses[1], Response::Spent { ok: true });
    assert_eq!(responses[2], Response::Spent { ok: false });
    assert_eq!(runner.engine().resources().credits, 600.0);
}

#[test]
fn test_discover_then_colonize_by_id() {
    let mut runner = HeadlessRunner::new(quiet_engine(3));
    runner.engine_mut().add_resources(
        &colony_core::resources::ResourceDelta::new()
            .with(colony_core::resources::ResourceKind::Minerals, 1000.0),
    );
    let responses = play(&mut runner, "{\"cmd\":\"discover\"}\n");
    let id = match &responses[1] {
        Response::Discovered { planet } => planet.id.clone(),
        other => panic!("expected discovered, got {other:?}"),
    };

    let line = format!("{{\"cmd\":\"colonize\",\"planet_id\":\"{id}\"}}\n");
    let responses = play(&mut runner, &line);
    assert!(matches!(&responses[1], Response::Ack { cmd } if cmd == "colonize"));
    assert_eq!(runner.snapshot().planets.iter().filter(|p| p.colonized).count(), 2);
}

#[test]
fn test_advance_rejected_on_wall_clock() {
    let engine = GameEngine::new(
        quiet_config(1),
        MemoryStore::new(),
        colony_core::engine::SystemClock,
    );
    let mut runner = HeadlessRunner::new(engine);
    let responses = play(&mut runner, "{\"cmd\":\"advance\",\"ms\":1000}\n");

    assert!(matches!(&responses[1], Response::Error { cmd: Some(c), .. } if c == "advance"));
}

// ============================================================================
// File-backed persistence
// ============================================================================

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let engine = GameEngine::new(
        quiet_config(9),
        FileStore::new(dir.path()),
        ManualClock::new(0),
    );
    let mut runner = HeadlessRunner::new(engine);
    play(
        &mut runner,
        "{\"cmd\":\"research\",\"tech_id\":\"hydroponics\"}\n{\"cmd\":\"quit\"}\n",
    );
    assert!(dir.path().join("colony-sim-state.json").exists());

    // Reopen five seconds later: the tech sticks and offline time is credited
    let engine = GameEngine::new(
        quiet_config(9),
        FileStore::new(dir.path()),
        ManualClock::new(5_000),
    );
    let mut runner = HeadlessRunner::new(engine);
    let responses = play(&mut runner, "{\"cmd\":\"tick\"}\n{\"cmd\":\"query\"}\n");

    match &responses[1] {
        Response::Ticked {
            elapsed_seconds, ..
        } => assert_eq!(*elapsed_seconds, 5.0),
        other => panic!("expected ticked, got {other:?}"),
    }
    match &responses[2] {
        Response::State(snapshot) => {
            let hydroponics = snapshot
                .technologies
                .iter()
                .find(|t| t.id == colony_core::technology::TechId::Hydroponics)
                .unwrap();
            assert!(hydroponics.researched);
        }
        other => panic!("expected state, got {other:?}"),
    }
}

#[test]
fn test_reset_over_the_wire_clears_the_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        storage_key: "slot-2".to_string(),
        ..quiet_config(4)
    };

    let engine = GameEngine::new(config.clone(), FileStore::new(dir.path()), ManualClock::new(0));
    let mut runner = HeadlessRunner::new(engine);
    play(
        &mut runner,
        "{\"cmd\":\"spend_resources\",\"cost\":{\"credits\":1000}}\n{\"cmd\":\"reset\"}\n{\"cmd\":\"quit\"}\n",
    );

    let engine = GameEngine::new(config, FileStore::new(dir.path()), ManualClock::new(0));
    assert_eq!(engine.resources().credits, 1000.0);
}
