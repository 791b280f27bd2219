use tch::{Tensor, nn, nn::OptimizerConfig as _};

use crate::{LearnError, OptimizerConfig};

/// Optimizer bound to the trainable variables of one variable store.
pub enum Optimizer {
    Sgd(nn::Optimizer),
    Adadelta(Adadelta),
}

impl Optimizer {
    /// Zero gradients, backpropagate `loss` and take one step.
    pub fn backward_step(&mut self, loss: &Tensor) {
        match self {
            Optimizer::Sgd(opt) => opt.backward_step(loss),
            Optimizer::Adadelta(opt) => opt.backward_step(loss),
        }
    }
}

pub fn build_optimizer(
    vs: &nn::VarStore,
    config: &OptimizerConfig,
) -> Result<Optimizer, LearnError> {
    Ok(match *config {
        OptimizerConfig::Adadelta {
            learning_rate,
            rho,
            epsilon,
        } => Optimizer::Adadelta(Adadelta::new(vs, learning_rate, rho, epsilon)),
        OptimizerConfig::Sgd { learning_rate } => {
            Optimizer::Sgd(nn::Sgd::default().build(vs, f64::from(learning_rate))?)
        }
    })
}

#[derive(Debug)]
struct Slot {
    var: Tensor,
    grad_sq: Tensor,
    delta_sq: Tensor,
}

/// Adadelta with running averages of squared gradients and squared updates.
#[derive(Debug)]
pub struct Adadelta {
    learning_rate: f64,
    rho: f64,
    epsilon: f64,
    slots: Vec<Slot>,
}

impl Adadelta {
    pub fn new(vs: &nn::VarStore, learning_rate: f32, rho: f32, epsilon: f32) -> Self {
        let slots = vs
            .trainable_variables()
            .into_iter()
            .map(|var| Slot {
                grad_sq: var.zeros_like(),
                delta_sq: var.zeros_like(),
                var,
            })
            .collect();
        Adadelta {
            learning_rate: f64::from(learning_rate),
            rho: f64::from(rho),
            epsilon: f64::from(epsilon),
            slots,
        }
    }

    pub fn zero_grad(&mut self) {
        for slot in &mut self.slots {
            slot.var.zero_grad();
        }
    }

    /// Update every variable from its current gradient.
    pub fn step(&mut self) {
        let (lr, rho, eps) = (self.learning_rate, self.rho, self.epsilon);
        tch::no_grad(|| {
            for slot in &mut self.slots {
                let grad = slot.var.grad();
                if !grad.defined() {
                    continue;
                }
                slot.grad_sq = &slot.grad_sq * rho + &grad * &grad * (1.0 - rho);
                let delta = &grad * (&slot.delta_sq + eps).sqrt() / (&slot.grad_sq + eps).sqrt();
                slot.delta_sq = &slot.delta_sq * rho + &delta * &delta * (1.0 - rho);
                let _ = slot.var.g_sub_(&(delta * lr));
            }
        });
    }

    pub fn backward_step(&mut self, loss: &Tensor) {
        self.zero_grad();
        loss.backward();
        self.step();
    }
}
