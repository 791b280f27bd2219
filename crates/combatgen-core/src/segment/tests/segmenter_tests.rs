use crate::{
    record::{Observation, Outcome, PlayerCommon, RawUnit},
    segment::{Poll, PollEvents, RoundSegmenter, SegmentError},
};

fn observation(units: usize, minerals: u32, vespene: u32, game_loop: u32) -> Observation {
    Observation {
        game_loop,
        player_common: PlayerCommon { minerals, vespene },
        units: (0..units)
            .map(|i| RawUnit {
                tag: i as u64,
                owner: 1 + (i % 2) as u32,
                health: 40.0,
                ..RawUnit::default()
            })
            .collect(),
        ..Observation::default()
    }
}

fn run(polls: &[(usize, u32, u32)]) -> Result<(RoundSegmenter, Vec<PollEvents>), SegmentError> {
    let mut segmenter = RoundSegmenter::new("replays/test.SC2Replay");
    let mut events = Vec::new();
    for (i, &(units, minerals, vespene)) in polls.iter().enumerate() {
        events.push(segmenter.push(&observation(units, minerals, vespene, 16 * i as u32))?);
    }
    Ok((segmenter, events))
}

#[test]
fn unit_count_transitions_open_two_rounds() {
    let units = [0, 0, 5, 5, 0, 0, 3, 0];
    // The first round is won by team minerals before the second opens.
    let minerals = [0, 0, 0, 0, 1, 1, 1, 1];
    let polls: Vec<_> = units
        .iter()
        .zip(minerals)
        .map(|(&u, m)| (u, m, 0))
        .collect();

    let (segmenter, events) = run(&polls).expect("segmentation should succeed");

    let opened: Vec<usize> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.opened.map(|_| i))
        .collect();
    assert_eq!(opened, vec![2, 6]);

    let simulation = segmenter.finish();
    assert_eq!(simulation.len(), 2);
    assert_eq!(simulation.battles[0].round_num, 1);
    assert_eq!(simulation.battles[0].outcome, Outcome::TeamMineralsWon);
    assert_eq!(simulation.battles[1].round_num, 2);
    assert_eq!(simulation.battles[1].outcome, Outcome::Undecided);
    assert_eq!(simulation.battles[1].initial_observation.game_loop, 16 * 6);
    assert_eq!(simulation.battles[1].initial_observation.units.len(), 3);
}

#[test]
fn first_poll_never_opens_a_round() {
    let (segmenter, events) = run(&[(4, 0, 0), (4, 0, 0)]).expect("segmentation should succeed");
    assert!(events.iter().all(|e| e.opened.is_none()));
    assert_eq!(segmenter.rounds_seen(), 0);
}

#[test]
fn outcome_ignores_first_poll_and_fires_on_later_increase() {
    let mut segmenter = RoundSegmenter::new("r");
    // Poll 0 establishes the baseline; poll 1 opens a round.
    segmenter
        .push_poll(Poll::new(0, 0, 0), Observation::default)
        .expect("baseline");
    let events = segmenter
        .push_poll(Poll::new(2, 100, 0), Observation::default)
        .expect("open");
    // Opening and a rising counter at the same poll close the new round at once.
    assert_eq!(events.opened, Some(1));
    assert_eq!(events.resolved, Some((1, Outcome::TeamMineralsWon)));

    let mut segmenter = RoundSegmenter::new("r");
    let first = segmenter
        .push_poll(Poll::new(0, 100, 0), Observation::default)
        .expect("first poll");
    assert_eq!(first, PollEvents::default());
    let opened = segmenter
        .push_poll(Poll::new(2, 100, 0), Observation::default)
        .expect("open");
    assert_eq!(opened.opened, Some(1));
    assert_eq!(opened.resolved, None);
    let steady = segmenter
        .push_poll(Poll::new(2, 100, 0), Observation::default)
        .expect("steady");
    assert_eq!(steady.resolved, None);
    let won = segmenter
        .push_poll(Poll::new(1, 150, 0), Observation::default)
        .expect("won");
    assert_eq!(won.resolved, Some((1, Outcome::TeamMineralsWon)));
    assert_eq!(segmenter.open_round(), None);
}

#[test]
fn vespene_increase_resolves_team_vespene() {
    let (segmenter, events) =
        run(&[(0, 0, 0), (6, 0, 0), (2, 0, 1), (0, 0, 1)]).expect("segmentation should succeed");
    assert_eq!(events[2].resolved, Some((1, Outcome::TeamVespeneWon)));
    assert_eq!(segmenter.finish().battles[0].outcome, Outcome::TeamVespeneWon);
}

#[test]
fn minerals_take_precedence_when_both_rise() {
    let (_, events) = run(&[(0, 0, 0), (6, 0, 0), (2, 1, 1)]).expect("segmentation");
    assert_eq!(events[2].resolved, Some((1, Outcome::TeamMineralsWon)));
}

#[test]
fn round_without_increase_stays_undecided() {
    let (segmenter, _) = run(&[(0, 5, 5), (3, 5, 5), (3, 5, 4), (0, 5, 4)]).expect("segmentation");
    assert_eq!(segmenter.open_round(), Some(1));
    let simulation = segmenter.finish();
    assert_eq!(simulation.battles[0].outcome, Outcome::Undecided);
    assert_eq!(simulation.decided().count(), 0);
}

#[test]
fn second_round_while_open_is_an_error() {
    let err = run(&[(0, 0, 0), (5, 0, 0), (0, 0, 0), (5, 0, 0)])
        .expect_err("second open round must fail");
    assert_eq!(
        err,
        SegmentError::BattleAlreadyOpen {
            replay_file: "replays/test.SC2Replay".to_string(),
            open_round: 1,
        }
    );
}

#[test]
fn failed_poll_leaves_state_untouched() {
    let mut segmenter = RoundSegmenter::new("r");
    for poll in [Poll::new(0, 0, 0), Poll::new(5, 0, 0), Poll::new(0, 0, 0)] {
        segmenter
            .push_poll(poll, Observation::default)
            .expect("valid poll");
    }
    let before = (segmenter.polls(), segmenter.rounds_seen(), segmenter.battles().len());

    let err = segmenter.push_poll(Poll::new(5, 0, 0), || panic!("snapshot must not be taken"));
    assert!(err.is_err());
    assert_eq!(
        (segmenter.polls(), segmenter.rounds_seen(), segmenter.battles().len()),
        before
    );
    assert_eq!(segmenter.open_round(), Some(1));

    // The caller may recover by resolving the open round.
    let events = segmenter
        .push_poll(Poll::new(0, 1, 0), Observation::default)
        .expect("resolution");
    assert_eq!(events.resolved, Some((1, Outcome::TeamMineralsWon)));
}

#[test]
fn outcome_without_open_round_is_an_error() {
    let err = run(&[(0, 0, 0), (0, 1, 0)]).expect_err("outcome needs an open round");
    assert!(matches!(err, SegmentError::NoOpenBattle { poll_index: 1, .. }));
}
