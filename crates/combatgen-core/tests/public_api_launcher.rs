use std::fs;

use combatgen_core::{
    CombatConfig, generate_replay,
    controller::{
        GameResult, PlayerResult, PlayerSetup, RecordedRequest, ResponseObservation,
        ScriptedController, ScriptedFactory,
    },
};

#[test]
fn generator_steps_until_result_and_saves_replay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CombatConfig::default().resolved_against(dir.path());

    let finished = ResponseObservation {
        player_result: vec![PlayerResult {
            player_id: 3,
            result: GameResult::Victory,
        }],
        ..ResponseObservation::default()
    };
    let mut factory = ScriptedFactory::new();
    factory.push(
        ScriptedController::new([
            ResponseObservation::default(),
            ResponseObservation::default(),
            finished,
        ])
        .with_replay_data(b"replay-bytes".to_vec()),
    );

    let path = generate_replay(&mut factory, &config).expect("generate");
    assert_eq!(path, dir.path().join("replays/SC2CombatGenerator.SC2Replay"));
    assert_eq!(fs::read(&path).expect("read replay"), b"replay-bytes");

    let requests = factory.requests();
    let RecordedRequest::CreateGame(create) = &requests[0] else {
        panic!("first request must create the game");
    };
    assert!(!create.realtime);
    assert_eq!(create.players.len(), 3);
    assert_eq!(create.players[2], PlayerSetup::Participant);
    assert!(matches!(requests[1], RecordedRequest::JoinGame(_)));
    assert_eq!(
        &requests[2..],
        &[
            RecordedRequest::Observe,
            RecordedRequest::Step(16),
            RecordedRequest::Observe,
            RecordedRequest::Step(16),
            RecordedRequest::Observe,
            RecordedRequest::SaveReplay,
            RecordedRequest::Quit,
        ]
    );
}
