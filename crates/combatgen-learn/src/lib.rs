pub mod baseline;
pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod train;

pub use baseline::{ArmyBaseline, ArmyStrength};
pub use config::{LearnConfig, ModelConfig, OptimizerConfig};
pub use dataset::{CLASSES, Dataset, Example, label_for, load_dataset};
pub use error::LearnError;
pub use model::{Network, Shape};
pub use train::{EpochMetrics, Evaluation, TrainReport, Trainer, evaluate};
