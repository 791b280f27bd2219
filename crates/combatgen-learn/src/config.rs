use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::LearnError;

const DEFAULT_LEARN_CONFIG_YAML: &str = include_str!("../config/learn.default.yaml");

/// Dataset, model and training settings for the outcome learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    pub parsed_dir: PathBuf,
    pub parsed_suffix: String,
    /// Feature layer render used as the single input channel.
    pub layer: String,
    /// Side length the render must have.
    pub image_size: u32,
    /// Pixels are divided by this value.
    pub pixel_scale: f32,
    /// Number of trailing examples held out for the final evaluation.
    pub test_size: usize,
    /// Trailing fraction of the training examples used for validation.
    pub validation_split: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: u64,
    pub optimizer: OptimizerConfig,
    pub model: ModelConfig,
}

impl Default for LearnConfig {
    fn default() -> Self {
        LearnConfig {
            parsed_dir: PathBuf::from("replays_parsed"),
            parsed_suffix: ".SC2Replay_parsed".to_string(),
            layer: combatgen_core::record::PLAYER_RELATIVE.to_string(),
            image_size: 84,
            pixel_scale: 4.0,
            test_size: 100,
            validation_split: 1.0 / 9.0,
            epochs: 10,
            batch_size: 50,
            seed: 1337,
            optimizer: OptimizerConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

/// Layer sizes of the convolutional classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// One valid-padding convolution per entry, in order.
    pub conv_filters: Vec<usize>,
    pub kernel_size: usize,
    pub pool_size: usize,
    pub conv_dropout: f32,
    pub hidden_units: usize,
    pub dense_dropout: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            conv_filters: vec![32, 64],
            kernel_size: 4,
            pool_size: 4,
            conv_dropout: 0.25,
            hidden_units: 128,
            dense_dropout: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adadelta {
        learning_rate: f32,
        rho: f32,
        epsilon: f32,
    },
    Sgd {
        learning_rate: f32,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adadelta {
            learning_rate: 1.0,
            rho: 0.95,
            epsilon: 1e-7,
        }
    }
}

impl LearnConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LearnError> {
        let config: LearnConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file; `parsed_dir` resolves against the file's directory.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, LearnError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&yaml)?;
        if config.parsed_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.parsed_dir = base.join(&config.parsed_dir);
        }
        Ok(config)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_LEARN_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, LearnError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Load `path` if given, otherwise the embedded default.
    pub fn load(path: Option<&Path>) -> Result<Self, LearnError> {
        match path {
            Some(path) => Self::from_yaml_path(path),
            None => Self::from_default_yaml(),
        }
    }

    pub fn validate(&self) -> Result<(), LearnError> {
        let invalid = |msg: &str| Err(LearnError::InvalidConfig(msg.to_string()));

        if self.layer.is_empty() {
            return invalid("layer must name a feature layer render");
        }
        if self.image_size == 0 {
            return invalid("image_size must be greater than 0");
        }
        if !self.pixel_scale.is_finite() || self.pixel_scale <= 0.0 {
            return invalid("pixel_scale must be finite and > 0");
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return invalid("validation_split must be in [0, 1)");
        }
        if self.epochs == 0 {
            return invalid("epochs must be greater than 0");
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be greater than 0");
        }
        match self.optimizer {
            OptimizerConfig::Adadelta {
                learning_rate,
                rho,
                epsilon,
            } => {
                if !learning_rate.is_finite() || learning_rate <= 0.0 {
                    return invalid("learning_rate must be finite and > 0");
                }
                if !(0.0..1.0).contains(&rho) {
                    return invalid("rho must be in [0, 1)");
                }
                if !epsilon.is_finite() || epsilon <= 0.0 {
                    return invalid("epsilon must be finite and > 0");
                }
            }
            OptimizerConfig::Sgd { learning_rate } => {
                if !learning_rate.is_finite() || learning_rate <= 0.0 {
                    return invalid("learning_rate must be finite and > 0");
                }
            }
        }
        self.model.validate()
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), LearnError> {
        let invalid = |msg: &str| Err(LearnError::InvalidConfig(msg.to_string()));

        if self.conv_filters.is_empty() || self.conv_filters.contains(&0) {
            return invalid("conv_filters must list at least one non-zero filter count");
        }
        if self.kernel_size == 0 || self.pool_size == 0 || self.hidden_units == 0 {
            return invalid("kernel_size, pool_size and hidden_units must be greater than 0");
        }
        for rate in [self.conv_dropout, self.dense_dropout] {
            if !(0.0..1.0).contains(&rate) {
                return invalid("dropout rates must be in [0, 1)");
            }
        }
        Ok(())
    }
}
