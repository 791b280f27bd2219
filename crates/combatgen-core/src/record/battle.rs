use serde::{Deserialize, Serialize};

use crate::record::{Observation, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One combat round found in a replay.
pub struct Battle {
    /// Replay the round was extracted from.
    pub replay_file: String,
    /// 1-based round index within the replay.
    pub round_num: u32,
    /// Observation at the poll where units first appeared.
    pub initial_observation: Observation,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// All rounds of one replay, in the order they were observed.
pub struct Simulation {
    pub battles: Vec<Battle>,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }

    /// Battles whose outcome was observed before the replay ended.
    pub fn decided(&self) -> impl Iterator<Item = &Battle> {
        self.battles.iter().filter(|b| b.outcome.is_decided())
    }
}
