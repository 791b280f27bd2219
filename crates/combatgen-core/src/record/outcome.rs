use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side's resource counter rose first after a round began.
///
/// The map awards one mineral (or one vespene) to the winning team, so the
/// counter that moves is used as the round's label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No qualifying resource increase was seen before the replay ended.
    #[default]
    Undecided,
    TeamMineralsWon,
    TeamVespeneWon,
}

impl Outcome {
    /// Stable byte used in the record file format.
    pub fn wire_value(self) -> u8 {
        match self {
            Outcome::Undecided => 0,
            Outcome::TeamMineralsWon => 1,
            Outcome::TeamVespeneWon => 2,
        }
    }

    /// Inverse of [`Outcome::wire_value`].
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Outcome::Undecided),
            1 => Some(Outcome::TeamMineralsWon),
            2 => Some(Outcome::TeamVespeneWon),
            _ => None,
        }
    }

    pub fn is_decided(self) -> bool {
        self != Outcome::Undecided
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Undecided => "undecided",
            Outcome::TeamMineralsWon => "team_minerals_won",
            Outcome::TeamVespeneWon => "team_vespene_won",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
