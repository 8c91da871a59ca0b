//! End-to-end orchestration scenarios over scripted transports: the relays,
//! the supervisor's folding, match creation, and the host's outcome report.

use std::time::Duration;

use sc2_arena::arena::Arena;
use sc2_arena::bot::{Bot, Race};
use sc2_arena::configuration::Configuration;
use sc2_arena::channel::{EngineLink, RelayChannel};
use sc2_arena::map::MapRef;
use sc2_arena::match_runner::run_match;
use sc2_arena::proto::{
    CreateGameError, GameResult, GameStatus, Observation, PlayerResult, Request, Response,
    ResponseCreateGame,
};
use sc2_arena::relay::RelaySettings;
use sc2_arena::setup::create_match;
use sc2_arena::verdict::MatchVerdict;

use common::{ScriptedEngine, ScriptedGate};

mod common;

fn settings() -> RelaySettings {
    RelaySettings {
        engine_timeout: Duration::from_millis(200),
        idle_timeout: Duration::from_millis(100),
        max_game_loops: 1_000,
    }
}

fn step() -> Request {
    Request {
        body: Some(serde_json::json!({ "actions": [] })),
        ..Request::default()
    }
}

fn in_game(game_loop: u32) -> Response {
    Response {
        observation: Some(Observation { game_loop }),
        ..Response::with_status(GameStatus::InGame)
    }
}

fn ended() -> Response {
    Response::with_status(GameStatus::Ended)
}

fn final_report(results: &[(u32, GameResult)]) -> Response {
    Response {
        player_results: results
            .iter()
            .map(|&(player_id, result)| PlayerResult { player_id, result })
            .collect(),
        ..Response::with_status(GameStatus::Ended)
    }
}

fn channels(
    gates: &[ScriptedGate],
    engines: &[ScriptedEngine],
) -> Vec<RelayChannel<ScriptedGate, ScriptedEngine>> {
    gates
        .iter()
        .zip(engines)
        .enumerate()
        .map(|(slot, (gate, engine))| RelayChannel {
            slot,
            gate: gate.clone(),
            link: engine.clone(),
        })
        .collect()
}

#[test]
fn both_relays_reach_game_end_and_the_host_assigns_the_win() {
    let gates = [
        ScriptedGate::new(vec![step(), step()]),
        ScriptedGate::new(vec![step(), step()]),
    ];
    let engines = [
        ScriptedEngine::new(vec![
            in_game(10),
            ended(),
            final_report(&[(1, GameResult::Victory), (2, GameResult::Defeat)]),
        ]),
        ScriptedEngine::new(vec![in_game(10), ended()]),
    ];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert_eq!(verdict, MatchVerdict::win(0));
    assert!(!verdict.contains(MatchVerdict::crash(0)));
    assert!(!verdict.contains(MatchVerdict::crash(1)));
    assert!(!verdict.contains(MatchVerdict::forfeit(0)));
    assert!(!verdict.contains(MatchVerdict::forfeit(1)));
    // Both bots saw the final response before their relay stopped.
    for gate in &gates {
        assert!(gate
            .delivered()
            .iter()
            .any(|response| response.status == GameStatus::Ended));
    }
}

#[test]
fn a_silent_bot_decays_to_a_crash_for_its_slot_only() {
    let gates = [
        ScriptedGate::new(vec![step()]),
        ScriptedGate::new(vec![]), // never sends anything
    ];
    let engines = [
        ScriptedEngine::new(vec![ended(), final_report(&[(1, GameResult::Victory)])]),
        ScriptedEngine::new(vec![]),
    ];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert_eq!(verdict, MatchVerdict::win(0) | MatchVerdict::crash(1));
    assert!(engines[1].received().is_empty());
}

#[test]
fn leave_requests_are_intercepted_and_become_a_forfeit() {
    let gates = [
        ScriptedGate::new(vec![step(), step()]),
        ScriptedGate::new(vec![step(), Request::quit()]),
    ];
    let engines = [
        ScriptedEngine::new(vec![
            in_game(5),
            ended(),
            final_report(&[(1, GameResult::Victory), (2, GameResult::Defeat)]),
        ]),
        ScriptedEngine::new(vec![in_game(5)]),
    ];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert_eq!(verdict, MatchVerdict::win(0) | MatchVerdict::forfeit(1));
    // The quit never reached the engine, and the session survived so the
    // engine can finish its replay.
    let forwarded = engines[1].received();
    assert_eq!(forwarded.len(), 1);
    assert!(forwarded.iter().all(|request| !request.quit));
    assert!(engines[1].session_alive());
}

#[test]
fn running_past_the_loop_ceiling_raises_the_global_timeout() {
    let gates = [ScriptedGate::new(vec![step()])];
    let engines = [ScriptedEngine::new(vec![in_game(2_000)])];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert!(verdict.contains(MatchVerdict::TIMEOUT));
    assert!(!verdict.contains(MatchVerdict::crash(0)));
}

#[test]
fn a_bot_that_disconnects_mid_exchange_counts_as_crashed() {
    let gate = ScriptedGate::new(vec![step()]);
    gate.disconnect();
    let gates = [gate];
    let engines = [ScriptedEngine::new(vec![in_game(1)])];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert!(verdict.contains(MatchVerdict::crash(0)));
}

#[test]
fn an_unresponsive_engine_decays_to_a_client_timeout() {
    let gates = [ScriptedGate::new(vec![step(), step()])];
    // One response, then the queue runs dry: the second exchange forwards but
    // never hears back, and the slot idles out.
    let engines = [ScriptedEngine::new(vec![in_game(1)])];

    let verdict = run_match(
        channels(&gates, &engines),
        &settings(),
        Duration::from_millis(200),
    );

    assert_eq!(verdict, MatchVerdict::crash(0));
}

#[test]
fn create_game_rejections_abort_setup_with_the_engine_code() {
    let mut host = ScriptedEngine::new(vec![Response {
        create_game: Some(ResponseCreateGame {
            error: Some(CreateGameError::MissingMap),
            error_details: Some("not on disk".to_string()),
        }),
        ..Response::with_status(GameStatus::InitGame)
    }]);
    let bots = vec![
        Bot::participant("a", "/opt/bots/a", Race::Terran),
        Bot::participant("b", "/opt/bots/b", Race::Zerg),
    ];

    let error = create_match(
        &mut host,
        MapRef::Remote("AcolyteLE".to_string()),
        &bots,
        Duration::from_millis(100),
    )
    .unwrap_err();

    assert!(format!("{error:#}").contains("Missing Map"));
    // The request that went out carried the full roster and no realtime flag.
    let sent = host.received();
    assert_eq!(sent.len(), 1);
    let create = sent[0].create_game.as_ref().unwrap();
    assert_eq!(create.player_setup.len(), 2);
    assert!(!create.realtime);
}

#[test]
fn every_rejection_code_aborts_setup() {
    let codes = [
        CreateGameError::MissingMap,
        CreateGameError::InvalidMapPath,
        CreateGameError::InvalidMapData,
        CreateGameError::InvalidMapName,
        CreateGameError::InvalidMapHandle,
        CreateGameError::MissingPlayerSetup,
        CreateGameError::InvalidPlayerSetup,
    ];
    for code in codes {
        let mut host = ScriptedEngine::new(vec![Response {
            create_game: Some(ResponseCreateGame {
                error: Some(code),
                error_details: None,
            }),
            ..Response::with_status(GameStatus::InitGame)
        }]);
        let result = create_match(
            &mut host,
            MapRef::Remote("x".to_string()),
            &[],
            Duration::from_millis(50),
        );
        assert!(result.is_err(), "{code} should abort setup");
    }
}

#[test]
fn a_clean_create_game_response_is_accepted() {
    let mut host = ScriptedEngine::new(vec![Response {
        create_game: Some(ResponseCreateGame {
            error: None,
            error_details: None,
        }),
        ..Response::with_status(GameStatus::InitGame)
    }]);
    let bots = vec![Bot::participant("a", "/opt/bots/a", Race::Random)];

    create_match(
        &mut host,
        MapRef::Local("/maps/Acolyte.SC2Map".into()),
        &bots,
        Duration::from_millis(100),
    )
    .unwrap();
    assert!(host.is_connected());
}

#[test]
fn a_missing_engine_executable_yields_an_error_verdict() {
    let bots = vec![Bot::participant("a", "/nonexistent/bot", Race::Terran)];
    let config = Configuration::new()
        .with_engine_path("/nonexistent/engine")
        .with_port_base(38651);
    let arena = Arena::new(bots, vec![], config);

    let verdict = arena.play("AcolyteLE.SC2Map");

    assert!(verdict.is_error());
    assert_eq!(verdict.to_string(), "Error");
}

#[test]
fn a_missing_create_game_response_is_a_setup_error() {
    let mut host = ScriptedEngine::new(vec![]);
    let result = create_match(
        &mut host,
        MapRef::Remote("x".to_string()),
        &[],
        Duration::from_millis(50),
    );
    assert!(result.is_err());
}
