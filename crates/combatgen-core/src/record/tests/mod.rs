
use std::collections::BTreeMap;

use crate::record::{
    Battle, FeatureLayers, ImageData, Observation, Outcome, PLAYER_RELATIVE, PlayerCommon,
    RawUnit, Simulation,
};

fn sample_observation(game_loop: u32) -> Observation {
    let mut renders = BTreeMap::new();
    renders.insert(
        PLAYER_RELATIVE.to_string(),
        ImageData {
            width: 4,
            height: 4,
            bits_per_pixel: 8,
            data: vec![0, 1, 1, 0, 0, 4, 4, 0, 0, 0, 0, 0, 3, 0, 0, 1],
        },
    );
    Observation {
        game_loop,
        player_common: PlayerCommon {
            minerals: 3,
            vespene: 2,
        },
        units: vec![
            RawUnit {
                tag: 0x1_0000_0001,
                unit_type: 48,
                owner: 1,
                x: 10.5,
                y: 20.25,
                health: 45.0,
                shield: 0.0,
            },
            RawUnit {
                tag: 0x1_0000_0002,
                unit_type: 105,
                owner: 2,
                x: 12.0,
                y: 20.0,
                health: 35.0,
                shield: 0.0,
            },
        ],
        feature_layers: FeatureLayers { renders },
    }
}

fn sample_simulation() -> Simulation {
    Simulation {
        battles: vec![
            Battle {
                replay_file: "replays/SC2CombatGenerator.SC2Replay".to_string(),
                round_num: 1,
                initial_observation: sample_observation(16),
                outcome: Outcome::TeamMineralsWon,
            },
            Battle {
                replay_file: "replays/SC2CombatGenerator.SC2Replay".to_string(),
                round_num: 2,
                initial_observation: sample_observation(320),
                outcome: Outcome::Undecided,
            },
        ],
    }
}
