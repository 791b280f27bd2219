use std::{fs, path::Path};

use combatgen_core::{
    CombatConfig, Observation, ObserverError, Outcome, SegmentError,
    controller::{
        GameResult, PlayerResult, RecordedRequest, ResponseObservation, ScriptedController,
        ScriptedFactory,
    },
    discover_files, observe_all, parsed_path_for,
    record::{PlayerCommon, RawUnit},
    read_simulation,
};

fn response(units: usize, minerals: u32, vespene: u32, over: bool) -> ResponseObservation {
    ResponseObservation {
        player_result: if over {
            vec![PlayerResult {
                player_id: 1,
                result: GameResult::Tie,
            }]
        } else {
            Vec::new()
        },
        observation: Observation {
            player_common: PlayerCommon { minerals, vespene },
            units: vec![RawUnit::default(); units],
            ..Observation::default()
        },
    }
}

fn config_in(root: &Path) -> CombatConfig {
    CombatConfig::default().resolved_against(root)
}

#[test]
fn parsed_path_substitutes_suffix_and_keeps_subdirectories() {
    let parsed = parsed_path_for(
        Path::new("/data/replays/season1/a.SC2Replay"),
        Path::new("/data/replays"),
        Path::new("/data/replays_parsed"),
        ".SC2Replay",
        ".SC2Replay_parsed",
    )
    .expect("path mapping");
    assert_eq!(
        parsed,
        Path::new("/data/replays_parsed/season1/a.SC2Replay_parsed")
    );

    let err = parsed_path_for(
        Path::new("/elsewhere/a.SC2Replay"),
        Path::new("/data/replays"),
        Path::new("/data/replays_parsed"),
        ".SC2Replay",
        ".SC2Replay_parsed",
    )
    .expect_err("outside replay dir");
    assert!(matches!(err, ObserverError::OutsideReplayDir { .. }));
}

#[test]
fn discovery_is_recursive_sorted_and_suffix_filtered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("b")).expect("mkdir");
    fs::write(root.join("b/z.SC2Replay"), b"").expect("write");
    fs::write(root.join("a.SC2Replay"), b"").expect("write");
    fs::write(root.join("notes.txt"), b"").expect("write");
    fs::write(root.join("a.SC2Replay_parsed"), b"").expect("write");

    let found = discover_files(root, ".SC2Replay").expect("discover");
    assert_eq!(found, vec![root.join("a.SC2Replay"), root.join("b/z.SC2Replay")]);

    let missing = discover_files(&root.join("missing"), ".SC2Replay").expect("missing dir");
    assert!(missing.is_empty());
}

#[cfg(unix)]
#[test]
fn discovery_does_not_follow_symlinked_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("a")).expect("mkdir");
    fs::write(root.join("a/x.SC2Replay"), b"").expect("write");
    std::os::unix::fs::symlink(root, root.join("a/loop")).expect("symlink");

    let found = discover_files(root, ".SC2Replay").expect("discover");
    assert_eq!(found, vec![root.join("a/x.SC2Replay")]);
}

#[test]
fn observe_all_writes_one_record_per_replay() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    fs::create_dir_all(config.replay_dir.join("sub")).expect("mkdir");
    fs::write(config.replay_dir.join("first.SC2Replay"), b"r1").expect("write");
    fs::write(config.replay_dir.join("sub/second.SC2Replay"), b"r2").expect("write");

    let mut factory = ScriptedFactory::new();
    // Initial observation, then one poll per step.
    factory.push(ScriptedController::new([
        response(0, 0, 0, false),
        response(0, 0, 0, false),
        response(4, 0, 0, false),
        response(2, 0, 1, false),
        response(0, 0, 1, false),
        response(3, 0, 1, false),
        response(3, 0, 1, true),
    ]));
    factory.push(ScriptedController::new([
        response(0, 0, 0, false),
        response(0, 0, 0, true),
    ]));

    let written = observe_all(&mut factory, &config).expect("observe all");
    assert_eq!(
        written,
        vec![
            config.parsed_dir.join("first.SC2Replay_parsed"),
            config.parsed_dir.join("sub/second.SC2Replay_parsed"),
        ]
    );

    let first = read_simulation(&written[0]).expect("read first");
    assert_eq!(first.len(), 2);
    assert_eq!(first.battles[0].outcome, Outcome::TeamVespeneWon);
    assert_eq!(first.battles[0].initial_observation.units.len(), 4);
    assert_eq!(first.battles[1].outcome, Outcome::Undecided);
    assert_eq!(
        first.battles[0].replay_file,
        config.replay_dir.join("first.SC2Replay").to_string_lossy()
    );

    let second = read_simulation(&written[1]).expect("read second");
    assert!(second.is_empty());

    let requests = factory.requests();
    let steps = requests
        .iter()
        .filter(|r| matches!(r, RecordedRequest::Step(16)))
        .count();
    assert_eq!(steps, 6 + 1);
    let RecordedRequest::StartReplay(start) = &requests[0] else {
        panic!("first request must start the replay");
    };
    assert_eq!(start.observed_player_id, 1);
    assert!(start.disable_fog);
    assert!(start.options.raw);
    assert!(!start.options.score);
    assert_eq!(
        start.options.feature_layer.map(|f| f.resolution.x),
        Some(84)
    );
    assert_eq!(requests.last(), Some(&RecordedRequest::Quit));
}

#[test]
fn overlapping_rounds_abort_the_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    fs::create_dir_all(&config.replay_dir).expect("mkdir");
    fs::write(config.replay_dir.join("bad.SC2Replay"), b"").expect("write");

    let mut factory = ScriptedFactory::new();
    factory.push(ScriptedController::new([
        response(0, 0, 0, false),
        response(0, 0, 0, false),
        response(2, 0, 0, false),
        response(0, 0, 0, false),
        response(2, 0, 0, true),
    ]));

    let err = observe_all(&mut factory, &config).expect_err("second open round");
    assert!(matches!(
        err,
        ObserverError::Segment(SegmentError::BattleAlreadyOpen { open_round: 1, .. })
    ));
    assert!(!config.parsed_dir.join("bad.SC2Replay_parsed").exists());
}
