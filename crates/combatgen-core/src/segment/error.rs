use std::fmt;

/// Error type for round segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// Units reappeared while the previous round still had no outcome.
    BattleAlreadyOpen {
        replay_file: String,
        open_round: u32,
    },
    /// A resource counter rose while no round was open.
    NoOpenBattle { replay_file: String, poll_index: u64 },
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::BattleAlreadyOpen {
                replay_file,
                open_round,
            } => write!(
                f,
                "new round started in '{replay_file}' while round {open_round} is still open"
            ),
            SegmentError::NoOpenBattle {
                replay_file,
                poll_index,
            } => write!(
                f,
                "outcome observed at poll {poll_index} of '{replay_file}' with no open round"
            ),
        }
    }
}

impl std::error::Error for SegmentError {}
