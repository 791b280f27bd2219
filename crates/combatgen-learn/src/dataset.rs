use std::path::Path;

use combatgen_core::{Battle, Outcome, Simulation, discover_files, read_simulation};
use tracing::{info, warn};

use crate::{LearnConfig, LearnError, baseline::ArmyStrength, model::Shape};

/// Number of outcome classes the learner distinguishes.
pub const CLASSES: usize = 2;
pub const MINERALS_LABEL: usize = 0;
pub const VESPENE_LABEL: usize = 1;

/// Class index for a decided outcome.
pub fn label_for(outcome: Outcome) -> Option<usize> {
    match outcome {
        Outcome::TeamMineralsWon => Some(MINERALS_LABEL),
        Outcome::TeamVespeneWon => Some(VESPENE_LABEL),
        Outcome::Undecided => None,
    }
}

/// One labelled round.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub replay_file: String,
    pub round_num: u32,
    /// Scaled feature layer, row-major.
    pub pixels: Vec<f32>,
    pub label: usize,
    pub army: ArmyStrength,
}

/// Labelled rounds in record order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    shape: Shape,
    examples: Vec<Example>,
    skipped_undecided: usize,
}

impl Dataset {
    pub fn new(shape: Shape) -> Self {
        Dataset {
            shape,
            examples: Vec::new(),
            skipped_undecided: 0,
        }
    }

    /// Extract the configured feature layer of every decided battle.
    pub fn from_simulations(
        simulations: &[Simulation],
        config: &LearnConfig,
    ) -> Result<Self, LearnError> {
        let size = config.image_size as usize;
        let mut dataset = Dataset::new(Shape::new(1, size, size));
        for simulation in simulations {
            for battle in &simulation.battles {
                dataset.push_battle(battle, config)?;
            }
        }
        if dataset.skipped_undecided > 0 {
            warn!(
                skipped = dataset.skipped_undecided,
                "skipping battles without a decided outcome"
            );
        }
        Ok(dataset)
    }

    /// Add one battle; undecided battles are counted and skipped.
    pub fn push_battle(&mut self, battle: &Battle, config: &LearnConfig) -> Result<(), LearnError> {
        let Some(label) = label_for(battle.outcome) else {
            self.skipped_undecided += 1;
            return Ok(());
        };
        let observation = &battle.initial_observation;
        let render = observation
            .render(&config.layer)
            .ok_or_else(|| LearnError::MissingLayer {
                replay: battle.replay_file.clone(),
                round: battle.round_num,
                layer: config.layer.clone(),
            })?;

        let size = config.image_size;
        if render.width != size
            || render.height != size
            || render.bits_per_pixel != 8
            || render.data.len() != (size as usize) * (size as usize)
        {
            return Err(LearnError::LayerShape {
                replay: battle.replay_file.clone(),
                round: battle.round_num,
                width: render.width,
                height: render.height,
                bits: render.bits_per_pixel,
                len: render.data.len(),
                size,
            });
        }

        let scale = 1.0 / config.pixel_scale;
        self.examples.push(Example {
            replay_file: battle.replay_file.clone(),
            round_num: battle.round_num,
            pixels: render.data.iter().map(|v| *v as f32 * scale).collect(),
            label,
            army: ArmyStrength::from_observation(observation),
        });
        Ok(())
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Battles left out because their round never resolved.
    pub fn skipped_undecided(&self) -> usize {
        self.skipped_undecided
    }

    pub fn class_counts(&self) -> [usize; CLASSES] {
        let mut counts = [0; CLASSES];
        for example in &self.examples {
            counts[example.label] += 1;
        }
        counts
    }

    /// Split off the last `test_size` examples as a held-out test set.
    pub fn split_holdout(self, test_size: usize) -> Result<(Dataset, Dataset), LearnError> {
        if self.examples.len() <= test_size {
            return Err(LearnError::InsufficientData {
                available: self.examples.len(),
                required: test_size,
            });
        }
        let split = self.examples.len() - test_size;
        Ok(self.split_at(split))
    }

    /// Keep the leading `1 - fraction` for training and the rest for validation.
    pub fn split_validation(self, fraction: f64) -> (Dataset, Dataset) {
        let len = self.examples.len();
        let split = (len as f64 * (1.0 - fraction)).floor() as usize;
        self.split_at(split.min(len))
    }

    fn split_at(mut self, index: usize) -> (Dataset, Dataset) {
        let tail = self.examples.split_off(index);
        let rest = Dataset {
            shape: self.shape,
            examples: tail,
            skipped_undecided: 0,
        };
        (self, rest)
    }
}

/// Read every parsed record under `dir` and build one dataset from all of them.
pub fn load_dataset(dir: impl AsRef<Path>, config: &LearnConfig) -> Result<Dataset, LearnError> {
    let files = discover_files(dir.as_ref(), &config.parsed_suffix)?;
    let mut simulations = Vec::with_capacity(files.len());
    for file in &files {
        info!(file = %file.display(), "going to learn from parsed replay");
        simulations.push(read_simulation(file)?);
    }
    let dataset = Dataset::from_simulations(&simulations, config)?;
    info!(
        files = files.len(),
        examples = dataset.len(),
        skipped = dataset.skipped_undecided(),
        "dataset loaded"
    );
    Ok(dataset)
}
