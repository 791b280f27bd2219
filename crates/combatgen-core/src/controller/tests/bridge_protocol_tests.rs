use std::path::PathBuf;

use crate::controller::{
    ControllerError, CreateGame, Difficulty, InterfaceOptions, PlayerSetup, Race,
    ResponseObservation, Size2D, SpatialCameraSetup, StartReplay,
    bridge::{BridgeController, BridgeRequest, BridgeResponse},
};

#[test]
fn requests_are_tagged_json_objects() {
    let create = CreateGame {
        map_path: PathBuf::from("CombatGenerator-v1.SC2Map"),
        players: vec![
            PlayerSetup::Computer {
                race: Race::Random,
                difficulty: Difficulty::VeryEasy,
            },
            PlayerSetup::Participant,
        ],
        realtime: false,
    };
    let value = serde_json::to_value(BridgeRequest::CreateGame(&create)).expect("serialize");
    assert_eq!(value["request"], "create_game");
    assert_eq!(value["realtime"], false);
    assert_eq!(value["players"][0]["type"], "computer");
    assert_eq!(value["players"][0]["difficulty"], "very_easy");
    assert_eq!(value["players"][1]["type"], "participant");

    let step = serde_json::to_value(BridgeRequest::Step { count: 16 }).expect("serialize");
    assert_eq!(step, serde_json::json!({ "request": "step", "count": 16 }));

    let observe = serde_json::to_value(BridgeRequest::Observe).expect("serialize");
    assert_eq!(observe, serde_json::json!({ "request": "observe" }));
}

#[test]
fn start_replay_carries_feature_layer_setup() {
    let start = StartReplay {
        replay_path: PathBuf::from("replays/a.SC2Replay"),
        map_path: PathBuf::from("CombatGenerator-v1.SC2Map"),
        observed_player_id: 1,
        options: InterfaceOptions {
            raw: true,
            score: false,
            feature_layer: Some(SpatialCameraSetup {
                width: 24.0,
                resolution: Size2D::square(84),
                minimap_resolution: Size2D::square(64),
            }),
        },
        disable_fog: true,
    };
    let value = serde_json::to_value(BridgeRequest::StartReplay(&start)).expect("serialize");
    assert_eq!(value["request"], "start_replay");
    assert_eq!(value["observed_player_id"], 1);
    assert_eq!(value["options"]["feature_layer"]["resolution"]["x"], 84);
    assert_eq!(value["disable_fog"], true);
}

#[test]
fn observation_responses_parse_with_defaults() {
    let text = r#"{
        "status": "observation",
        "observation": {
            "game_loop": 32,
            "player_common": { "minerals": 1, "vespene": 0 },
            "units": [
                { "tag": 7, "unit_type": 48, "owner": 1, "x": 1.0, "y": 2.0, "health": 45.0, "shield": 0.0 }
            ]
        }
    }"#;
    let response: BridgeResponse = serde_json::from_str(text).expect("parse");
    let BridgeResponse::Observation(ResponseObservation {
        player_result,
        observation,
    }) = response
    else {
        panic!("expected an observation response");
    };
    assert!(player_result.is_empty());
    assert_eq!(observation.unit_count(), 1);
    assert!(observation.feature_layers.renders.is_empty());

    let error: BridgeResponse =
        serde_json::from_str(r#"{ "status": "error", "message": "no map" }"#).expect("parse");
    assert!(matches!(error, BridgeResponse::Error { message } if message == "no map"));
}

#[test]
fn spawning_empty_or_missing_command_fails() {
    let err = BridgeController::spawn(&[]).err().expect("empty command must fail");
    assert!(matches!(err, ControllerError::EmptyCommand));

    let err = BridgeController::spawn(&["/nonexistent/combatgen-bridge".to_string()])
        .err()
        .expect("missing program must fail");
    assert!(matches!(err, ControllerError::Spawn { .. }));
}
