use thiserror::Error;

use combatgen_core::{ObserverError, RecordError};

#[derive(Debug, Error)]
/// Error type for dataset loading, model construction and training.
pub enum LearnError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid learner config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Discover(#[from] ObserverError),

    #[error("battle {round} of '{replay}' has no '{layer}' feature layer")]
    MissingLayer {
        replay: String,
        round: u32,
        layer: String,
    },

    #[error(
        "battle {round} of '{replay}': layer is {width}x{height} at {bits} bpp with {len} bytes, expected {size}x{size} at 8 bpp"
    )]
    LayerShape {
        replay: String,
        round: u32,
        width: u32,
        height: u32,
        bits: u8,
        len: usize,
        size: u32,
    },

    #[error("need more than {required} examples, found {available}")]
    InsufficientData { available: usize, required: usize },

    #[error("input {input} is too small for the configured layers at '{layer}'")]
    InputTooSmall { input: String, layer: String },

    #[error("example has {got} values, network expects {expected}")]
    InputSize { got: usize, expected: usize },

    #[error("torch error: {0}")]
    Torch(#[from] tch::TchError),
}
