use std::{collections::HashMap, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tch::{Device, Kind, Tensor, nn, nn::ModuleT};

use super::shape::Shape;
use crate::{LearnError, ModelConfig};

/// Sequential image classifier on a `tch` variable store.
///
/// Weights are drawn Glorot-uniform from the network's own seeded stream, so
/// two networks built with the same seed start identical regardless of the
/// global torch generator. Biases start at zero.
#[derive(Debug)]
pub struct Network {
    vs: nn::VarStore,
    net: nn::SequentialT,
    input: Shape,
    classes: usize,
    layers: Vec<LayerSummary>,
}

impl Network {
    /// Build the convolution stack described by `config` for `input`-shaped
    /// examples, initialised from `seed`.
    pub fn new(
        config: &ModelConfig,
        input: Shape,
        classes: usize,
        seed: u64,
    ) -> Result<Self, LearnError> {
        config.validate()?;
        let too_small = |layer: &str| LearnError::InputTooSmall {
            input: input.to_string(),
            layer: layer.to_string(),
        };

        let vs = nn::VarStore::new(Device::Cpu);
        let root = vs.root();
        let mut table = LayerTable::default();
        let mut net = nn::seq_t();
        let mut shape = input;

        let k = config.kernel_size;
        for &filters in &config.conv_filters {
            if shape.height < k || shape.width < k {
                return Err(too_small("conv2d"));
            }
            let name = table.name("conv2d");
            let conv_config = nn::ConvConfig {
                ws_init: nn::Init::Const(0.0),
                bs_init: nn::Init::Const(0.0),
                ..Default::default()
            };
            net = net
                .add(nn::conv2d(
                    &root / name.as_str(),
                    shape.channels as i64,
                    filters as i64,
                    k as i64,
                    conv_config,
                ))
                .add_fn(|xs| xs.relu());
            let params = filters * (shape.channels * k * k + 1);
            shape = Shape::new(filters, shape.height - k + 1, shape.width - k + 1);
            table.push(name, shape, params);
        }

        let pool = config.pool_size;
        if shape.height < pool || shape.width < pool {
            return Err(too_small("max_pooling2d"));
        }
        let ksize = pool as i64;
        net = net.add_fn(move |xs| xs.max_pool2d_default(ksize));
        shape = Shape::new(shape.channels, shape.height / pool, shape.width / pool);
        let name = table.name("max_pooling2d");
        table.push(name, shape, 0);

        let conv_dropout = f64::from(config.conv_dropout);
        net = net.add_fn_t(move |xs, train| xs.dropout(conv_dropout, train));
        let name = table.name("dropout");
        table.push(name, shape, 0);

        net = net.add_fn(|xs| xs.flatten(1, -1));
        let flat = shape.len();
        let name = table.name("flatten");
        table.push(name, Shape::flat(flat), 0);

        let hidden = config.hidden_units;
        let name = table.name("dense");
        net = net
            .add(nn::linear(
                &root / name.as_str(),
                flat as i64,
                hidden as i64,
                zero_linear(),
            ))
            .add_fn(|xs| xs.relu());
        table.push(name, Shape::flat(hidden), (flat + 1) * hidden);

        let dense_dropout = f64::from(config.dense_dropout);
        net = net.add_fn_t(move |xs, train| xs.dropout(dense_dropout, train));
        let name = table.name("dropout");
        table.push(name, Shape::flat(hidden), 0);

        let name = table.name("dense");
        net = net.add(nn::linear(
            &root / name.as_str(),
            hidden as i64,
            classes as i64,
            zero_linear(),
        ));
        table.push(name, Shape::flat(classes), (hidden + 1) * classes);

        let network = Network {
            vs,
            net,
            input,
            classes,
            layers: table.rows,
        };
        network.init_weights(seed);
        Ok(network)
    }

    fn init_weights(&self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut variables: Vec<(String, Tensor)> = self.vs.variables().into_iter().collect();
        variables.sort_by(|a, b| a.0.cmp(&b.0));

        tch::no_grad(|| {
            for (name, mut var) in variables {
                if !name.ends_with("weight") {
                    continue;
                }
                let size = var.size();
                // [out, in] for dense, [out, in, kh, kw] for conv.
                let receptive: i64 = size.iter().skip(2).product();
                let fan_out = size[0] * receptive;
                let fan_in = size.get(1).copied().unwrap_or(1) * receptive;
                let limit = (6.0 / (fan_in + fan_out) as f64).sqrt() as f32;
                let values: Vec<f32> = (0..var.numel())
                    .map(|_| rng.gen_range(-limit..limit))
                    .collect();
                var.copy_(&Tensor::from_slice(&values).view(size.as_slice()));
            }
        });
    }

    pub fn input_shape(&self) -> Shape {
        self.input
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    /// Number of trainable values held by the variable store.
    pub fn param_count(&self) -> usize {
        self.vs
            .trainable_variables()
            .iter()
            .map(Tensor::numel)
            .sum()
    }

    /// Logits for a `[n, c, h, w]` batch. Dropout is active only when `train`.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        self.net.forward_t(xs, train)
    }

    /// Stack example pixels into a `[n, c, h, w]` input batch.
    pub fn batch<'a, I>(&self, examples: I) -> Result<Tensor, LearnError>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let expected = self.input.len();
        let mut values = Vec::new();
        let mut rows = 0i64;
        for pixels in examples {
            if pixels.len() != expected {
                return Err(LearnError::InputSize {
                    got: pixels.len(),
                    expected,
                });
            }
            values.extend_from_slice(pixels);
            rows += 1;
        }
        Ok(Tensor::from_slice(&values).view([
            rows,
            self.input.channels as i64,
            self.input.height as i64,
            self.input.width as i64,
        ]))
    }

    /// Class probabilities for one example.
    pub fn predict_proba(&self, input: &[f32]) -> Result<Vec<f32>, LearnError> {
        let xs = self.batch([input])?;
        let probs = tch::no_grad(|| self.forward_t(&xs, false).softmax(-1, Kind::Float));
        Ok(Vec::<f32>::try_from(probs.view([-1]))?)
    }

    pub fn predict(&self, input: &[f32]) -> Result<usize, LearnError> {
        let xs = self.batch([input])?;
        let best = tch::no_grad(|| self.forward_t(&xs, false).argmax(-1, false));
        Ok(best.int64_value(&[0]) as usize)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            input: self.input,
            layers: self.layers.clone(),
            total_params: self.param_count(),
        }
    }
}

fn zero_linear() -> nn::LinearConfig {
    nn::LinearConfig {
        ws_init: nn::Init::Const(0.0),
        bs_init: Some(nn::Init::Const(0.0)),
        bias: true,
    }
}

/// Layer names: the first of a kind is bare, later ones get `_n`.
#[derive(Default)]
struct LayerTable {
    rows: Vec<LayerSummary>,
    seen: HashMap<&'static str, usize>,
}

impl LayerTable {
    fn name(&mut self, kind: &'static str) -> String {
        let seen = self.seen.entry(kind).or_insert(0);
        let name = if *seen == 0 {
            kind.to_string()
        } else {
            format!("{kind}_{seen}")
        };
        *seen += 1;
        name
    }

    fn push(&mut self, name: String, output_shape: Shape, params: usize) {
        self.rows.push(LayerSummary {
            name,
            output_shape,
            params,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: String,
    pub output_shape: Shape,
    pub params: usize,
}

/// Layer table printed before training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub input: Shape,
    pub layers: Vec<LayerSummary>,
    pub total_params: usize,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input {}", self.input)?;
        writeln!(f, "{:<20} {:<16} {:>10}", "Layer", "Output Shape", "Param #")?;
        for layer in &self.layers {
            writeln!(
                f,
                "{:<20} {:<16} {:>10}",
                layer.name,
                layer.output_shape.to_string(),
                layer.params
            )?;
        }
        write!(f, "Total params: {}", self.total_params)
    }
}
