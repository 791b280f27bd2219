use crate::record::Observation;

/// The three counters the segmenter tracks between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Poll {
    pub unit_count: usize,
    pub minerals: u32,
    pub vespene: u32,
}

impl Poll {
    pub fn new(unit_count: usize, minerals: u32, vespene: u32) -> Self {
        Poll {
            unit_count,
            minerals,
            vespene,
        }
    }

    /// Extract the tracked counters from a controller observation.
    pub fn from_observation(observation: &Observation) -> Self {
        Poll {
            unit_count: observation.unit_count(),
            minerals: observation.player_common.minerals,
            vespene: observation.player_common.vespene,
        }
    }
}
