use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use tch::{Kind, Tensor};
use tracing::{debug, info};

use crate::{
    LearnConfig, LearnError,
    dataset::{CLASSES, Dataset, Example},
    model::{Network, Optimizer, Shape, build_optimizer},
};

/// Examples per forward pass when scoring a dataset.
const EVAL_BATCH: usize = 256;

/// Metrics reported at the end of each epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// One-based epoch number.
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
    pub val_loss: Option<f32>,
    pub val_accuracy: Option<f32>,
}

/// Mean loss and accuracy over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub train_examples: usize,
    pub validation_examples: usize,
    pub epochs: Vec<EpochMetrics>,
}

/// Minibatch trainer for a [`Network`].
pub struct Trainer {
    network: Network,
    optimizer: Optimizer,
    rng: ChaCha8Rng,
    epochs: usize,
    batch_size: usize,
    validation_split: f64,
}

impl Trainer {
    /// Build a fresh network for `input`-shaped examples from `config`.
    pub fn new(config: &LearnConfig, input: Shape) -> Result<Self, LearnError> {
        let network = Network::new(&config.model, input, CLASSES, config.seed)?;
        Self::with_network(network, config)
    }

    /// Train an existing network with the optimizer and schedule in `config`.
    ///
    /// Seeds the global torch generator, which drives the dropout masks.
    pub fn with_network(network: Network, config: &LearnConfig) -> Result<Self, LearnError> {
        config.validate()?;
        tch::manual_seed(config.seed as i64);
        let optimizer = build_optimizer(network.var_store(), &config.optimizer)?;
        Ok(Trainer {
            network,
            optimizer,
            rng: ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1)),
            epochs: config.epochs,
            batch_size: config.batch_size,
            validation_split: config.validation_split,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn fit(&mut self, data: &Dataset) -> Result<TrainReport, LearnError> {
        self.fit_with_hook(data, |_| {})
    }

    /// Train on `data`, holding out its trailing `validation_split` fraction,
    /// and call `on_epoch` after every epoch.
    pub fn fit_with_hook<F>(
        &mut self,
        data: &Dataset,
        mut on_epoch: F,
    ) -> Result<TrainReport, LearnError>
    where
        F: FnMut(&EpochMetrics),
    {
        let (train, validation) = data.clone().split_validation(self.validation_split);
        if train.is_empty() {
            return Err(LearnError::InsufficientData {
                available: data.len(),
                required: validation.len(),
            });
        }
        info!(
            train = train.len(),
            validation = validation.len(),
            epochs = self.epochs,
            "training"
        );

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut epochs = Vec::with_capacity(self.epochs);
        for epoch in 1..=self.epochs {
            order.shuffle(&mut self.rng);

            let mut loss_sum = 0.0f64;
            let mut correct = 0i64;
            for batch in order.chunks(self.batch_size) {
                let (batch_loss, batch_correct) = self.train_batch(&train, batch)?;
                loss_sum += batch_loss;
                correct += batch_correct;
            }

            let (val_loss, val_accuracy) = if validation.is_empty() {
                (None, None)
            } else {
                let eval = self.evaluate(&validation)?;
                (Some(eval.loss), Some(eval.accuracy))
            };
            let metrics = EpochMetrics {
                epoch,
                loss: (loss_sum / train.len() as f64) as f32,
                accuracy: correct as f32 / train.len() as f32,
                val_loss,
                val_accuracy,
            };
            info!(
                epoch,
                loss = metrics.loss,
                accuracy = metrics.accuracy,
                val_loss = metrics.val_loss,
                val_accuracy = metrics.val_accuracy,
                "epoch finished"
            );
            on_epoch(&metrics);
            epochs.push(metrics);
        }

        Ok(TrainReport {
            train_examples: train.len(),
            validation_examples: validation.len(),
            epochs,
        })
    }

    /// One optimizer step on the examples at `batch`. Returns the summed loss
    /// and the number of correct predictions.
    fn train_batch(&mut self, data: &Dataset, batch: &[usize]) -> Result<(f64, i64), LearnError> {
        let examples: Vec<&Example> = batch.iter().map(|&idx| &data.examples()[idx]).collect();
        let (xs, targets) = tensors(&self.network, &examples)?;

        let logits = self.network.forward_t(&xs, true);
        let loss = logits.cross_entropy_for_logits(&targets);
        self.optimizer.backward_step(&loss);

        let mean = loss.double_value(&[]);
        debug!(size = batch.len(), loss = mean, "batch");
        Ok((mean * batch.len() as f64, correct(&logits, &targets)))
    }

    /// Mean cross-entropy and accuracy of the current network on `data`.
    pub fn evaluate(&self, data: &Dataset) -> Result<Evaluation, LearnError> {
        evaluate(&self.network, data)
    }
}

/// Mean cross-entropy and accuracy of `network` on `data`.
pub fn evaluate(network: &Network, data: &Dataset) -> Result<Evaluation, LearnError> {
    if data.is_empty() {
        return Err(LearnError::InsufficientData {
            available: 0,
            required: 0,
        });
    }
    let _guard = tch::no_grad_guard();
    let mut loss = 0.0f64;
    let mut hits = 0i64;
    for chunk in data.examples().chunks(EVAL_BATCH) {
        let examples: Vec<&Example> = chunk.iter().collect();
        let (xs, targets) = tensors(network, &examples)?;
        let logits = network.forward_t(&xs, false);
        loss += logits.cross_entropy_for_logits(&targets).double_value(&[]) * chunk.len() as f64;
        hits += correct(&logits, &targets);
    }
    Ok(Evaluation {
        loss: (loss / data.len() as f64) as f32,
        accuracy: hits as f32 / data.len() as f32,
    })
}

fn tensors(network: &Network, examples: &[&Example]) -> Result<(Tensor, Tensor), LearnError> {
    let xs = network.batch(examples.iter().map(|example| example.pixels.as_slice()))?;
    let labels: Vec<i64> = examples.iter().map(|example| example.label as i64).collect();
    Ok((xs, Tensor::from_slice(&labels)))
}

fn correct(logits: &Tensor, targets: &Tensor) -> i64 {
    logits
        .argmax(-1, false)
        .eq_tensor(targets)
        .sum(Kind::Int64)
        .int64_value(&[])
}
