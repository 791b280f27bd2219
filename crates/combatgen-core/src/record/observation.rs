use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Render name of the player-relative ownership layer (self, ally, neutral, enemy).
pub const PLAYER_RELATIVE: &str = "player_relative";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Snapshot of one game observation as delivered by the controller.
///
/// The record format stores it as-is; only the segmenter and the learner look
/// inside it.
pub struct Observation {
    pub game_loop: u32,
    pub player_common: PlayerCommon,
    /// Raw units. Present when the interface was started with `raw` enabled.
    #[serde(default)]
    pub units: Vec<RawUnit>,
    #[serde(default)]
    pub feature_layers: FeatureLayers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommon {
    pub minerals: u32,
    pub vespene: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUnit {
    pub tag: u64,
    pub unit_type: u32,
    /// Absolute player id owning the unit.
    pub owner: u32,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub shield: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Screen feature layers keyed by render name.
pub struct FeatureLayers {
    #[serde(default)]
    pub renders: BTreeMap<String, ImageData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// A packed, row-major feature layer image.
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u8,
    pub data: Vec<u8>,
}

impl Observation {
    /// Number of raw units currently on the map.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Look up a screen render by name.
    pub fn render(&self, name: &str) -> Option<&ImageData> {
        self.feature_layers.renders.get(name)
    }
}

impl ImageData {
    /// Number of bytes `data` must hold for the declared shape.
    pub fn expected_len(&self) -> usize {
        let bits = self.width as usize * self.height as usize * self.bits_per_pixel as usize;
        bits.div_ceil(8)
    }
}
