use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::record::Observation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Terran,
    Zerg,
    Protoss,
    #[default]
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Built-in AI strength.
pub enum Difficulty {
    #[default]
    VeryEasy,
    Easy,
    Medium,
    MediumHard,
    Hard,
    Harder,
    VeryHard,
    CheatVision,
    CheatMoney,
    CheatInsane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerSetup {
    Computer { race: Race, difficulty: Difficulty },
    Participant,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size2D {
    pub x: u32,
    pub y: u32,
}

impl Size2D {
    pub fn square(side: u32) -> Self {
        Size2D { x: side, y: side }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Feature layer camera: world width covered by the screen and render sizes.
pub struct SpatialCameraSetup {
    pub width: f32,
    pub resolution: Size2D,
    pub minimap_resolution: Size2D,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Which observation kinds the client should produce.
pub struct InterfaceOptions {
    pub raw: bool,
    pub score: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_layer: Option<SpatialCameraSetup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGame {
    pub map_path: PathBuf,
    pub players: Vec<PlayerSetup>,
    pub realtime: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinGame {
    pub race: Race,
    pub options: InterfaceOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartReplay {
    pub replay_path: PathBuf,
    /// Local map file, used instead of the map path stored in the replay.
    pub map_path: PathBuf,
    pub observed_player_id: u32,
    pub options: InterfaceOptions,
    pub disable_fog: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Victory,
    Defeat,
    Tie,
    Undecided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_id: u32,
    pub result: GameResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseObservation {
    /// Empty while the game is running.
    #[serde(default)]
    pub player_result: Vec<PlayerResult>,
    pub observation: Observation,
}

impl ResponseObservation {
    pub fn is_game_over(&self) -> bool {
        !self.player_result.is_empty()
    }
}
