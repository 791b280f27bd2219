use crate::{
    record::{Battle, Observation, Outcome, Simulation},
    segment::{Poll, SegmentError},
};

/// What a single poll changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollEvents {
    /// Round number of a round opened by this poll.
    pub opened: Option<u32>,
    /// Round number and outcome of a round closed by this poll.
    pub resolved: Option<(u32, Outcome)>,
}

/// Splits a fixed-interval observation stream into battle rounds.
///
/// A round opens when the unit count goes from zero to non-zero between two
/// consecutive polls. It closes when either team's resource counter rises
/// between two consecutive polls; the counter that rose names the winner.
/// The first poll has no predecessor, so it can neither open nor close a round.
#[derive(Debug, Clone)]
pub struct RoundSegmenter {
    replay_file: String,
    last: Option<Poll>,
    polls: u64,
    round_num: u32,
    open: Option<usize>,
    battles: Vec<Battle>,
}

impl RoundSegmenter {
    pub fn new(replay_file: impl Into<String>) -> Self {
        RoundSegmenter {
            replay_file: replay_file.into(),
            last: None,
            polls: 0,
            round_num: 0,
            open: None,
            battles: Vec::new(),
        }
    }

    pub fn replay_file(&self) -> &str {
        &self.replay_file
    }

    /// Number of polls accepted so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Number of rounds opened so far.
    pub fn rounds_seen(&self) -> u32 {
        self.round_num
    }

    /// Round number of the round awaiting an outcome, if any.
    pub fn open_round(&self) -> Option<u32> {
        self.open.map(|idx| self.battles[idx].round_num)
    }

    /// Battles collected so far, including a possibly open one.
    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }

    /// Feed one controller observation.
    pub fn push(&mut self, observation: &Observation) -> Result<PollEvents, SegmentError> {
        self.push_poll(Poll::from_observation(observation), || observation.clone())
    }

    /// Feed one poll. `snapshot` is only called when the poll opens a round.
    ///
    /// On error the segmenter is left exactly as it was before the call.
    pub fn push_poll<F>(&mut self, poll: Poll, snapshot: F) -> Result<PollEvents, SegmentError>
    where
        F: FnOnce() -> Observation,
    {
        let opens = matches!(self.last, Some(last) if last.unit_count == 0) && poll.unit_count != 0;
        let outcome = self.last.and_then(|last| {
            if poll.minerals > last.minerals {
                Some(Outcome::TeamMineralsWon)
            } else if poll.vespene > last.vespene {
                Some(Outcome::TeamVespeneWon)
            } else {
                None
            }
        });

        if opens {
            if let Some(open_round) = self.open_round() {
                return Err(SegmentError::BattleAlreadyOpen {
                    replay_file: self.replay_file.clone(),
                    open_round,
                });
            }
        }
        if outcome.is_some() && !opens && self.open.is_none() {
            return Err(SegmentError::NoOpenBattle {
                replay_file: self.replay_file.clone(),
                poll_index: self.polls,
            });
        }

        let mut events = PollEvents::default();

        if opens {
            self.round_num += 1;
            self.battles.push(Battle {
                replay_file: self.replay_file.clone(),
                round_num: self.round_num,
                initial_observation: snapshot(),
                outcome: Outcome::Undecided,
            });
            self.open = Some(self.battles.len() - 1);
            events.opened = Some(self.round_num);
        }

        if let Some(outcome) = outcome {
            // Checked above: a round is open at this point.
            if let Some(idx) = self.open.take() {
                let battle = &mut self.battles[idx];
                battle.outcome = outcome;
                events.resolved = Some((battle.round_num, outcome));
            }
        }

        self.last = Some(poll);
        self.polls += 1;
        Ok(events)
    }

    /// Close the stream. A round still open keeps `Outcome::Undecided`.
    pub fn finish(self) -> Simulation {
        Simulation {
            battles: self.battles,
        }
    }
}
