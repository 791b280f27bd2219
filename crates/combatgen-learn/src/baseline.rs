//! Non-learned reference predictor built from the raw units of a round's
//! opening observation.

use combatgen_core::Observation;

use crate::dataset::{Dataset, MINERALS_LABEL, VESPENE_LABEL};

/// Player id controlling the team that wins a round on minerals.
pub const MINERALS_PLAYER: u32 = 1;
/// Player id controlling the team that wins a round on vespene.
pub const VESPENE_PLAYER: u32 = 2;

/// Total health plus shield fielded by each team.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmyStrength {
    pub minerals_team: f32,
    pub vespene_team: f32,
}

impl ArmyStrength {
    pub fn from_observation(observation: &Observation) -> Self {
        let mut strength = ArmyStrength::default();
        for unit in &observation.units {
            let hit_points = unit.health + unit.shield;
            match unit.owner {
                MINERALS_PLAYER => strength.minerals_team += hit_points,
                VESPENE_PLAYER => strength.vespene_team += hit_points,
                _ => {}
            }
        }
        strength
    }
}

/// Predicts that the stronger army wins; ties go to the minerals team.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmyBaseline;

impl ArmyBaseline {
    pub fn predict(&self, strength: &ArmyStrength) -> usize {
        if strength.vespene_team > strength.minerals_team {
            VESPENE_LABEL
        } else {
            MINERALS_LABEL
        }
    }

    /// Fraction of `data` predicted correctly; `None` for an empty set.
    pub fn accuracy(&self, data: &Dataset) -> Option<f32> {
        if data.is_empty() {
            return None;
        }
        let correct = data
            .examples()
            .iter()
            .filter(|example| self.predict(&example.army) == example.label)
            .count();
        Some(correct as f32 / data.len() as f32)
    }
}
