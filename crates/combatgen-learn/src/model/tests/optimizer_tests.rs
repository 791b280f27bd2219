use proptest::prelude::*;
use tch::{Device, Kind, Tensor, nn};

use crate::{
    OptimizerConfig,
    model::{Adadelta, build_optimizer},
};

fn scalar_store(start: f64) -> (nn::VarStore, Tensor) {
    let vs = nn::VarStore::new(Device::Cpu);
    let w = vs.root().var("w", &[1], nn::Init::Const(start));
    (vs, w)
}

/// Loss whose gradient with respect to `w` is `slope`.
fn linear_loss(w: &Tensor, slope: f64) -> Tensor {
    (w * slope).sum(Kind::Float)
}

#[test]
fn sgd_steps_against_the_gradient() {
    let (vs, w) = scalar_store(1.0);
    let mut sgd = build_optimizer(&vs, &OptimizerConfig::Sgd { learning_rate: 0.5 }).unwrap();
    sgd.backward_step(&linear_loss(&w, 1.0));
    assert!((w.double_value(&[0]) - 0.5).abs() < 1e-6);
}

#[test]
fn adadelta_first_step_is_scaled_by_epsilon() {
    let (vs, w) = scalar_store(0.0);
    let mut optimizer = Adadelta::new(&vs, 1.0, 0.95, 1e-7);
    optimizer.backward_step(&linear_loss(&w, 1.0));

    // sqrt(eps) / sqrt(0.05 * g^2 + eps)
    let expected = -(1e-7f64).sqrt() / (0.05f64 + 1e-7).sqrt();
    assert!((w.double_value(&[0]) - expected).abs() < 1e-6);
}

#[test]
fn adadelta_gradients_do_not_leak_between_steps() {
    let (vs, w) = scalar_store(0.0);
    let mut optimizer = Adadelta::new(&vs, 1.0, 0.95, 1e-7);
    optimizer.backward_step(&linear_loss(&w, 1.0));
    optimizer.backward_step(&linear_loss(&w, 1.0));

    let (rho, eps) = (0.95f64, 1e-7f64);
    let (mut w_ref, mut grad_sq, mut delta_sq) = (0.0f64, 0.0f64, 0.0f64);
    for _ in 0..2 {
        grad_sq = rho * grad_sq + (1.0 - rho);
        let delta = (delta_sq + eps).sqrt() / (grad_sq + eps).sqrt();
        w_ref -= delta;
        delta_sq = rho * delta_sq + (1.0 - rho) * delta * delta;
    }
    assert!((w.double_value(&[0]) - w_ref).abs() < 1e-6);
}

#[test]
fn default_config_builds_adadelta() {
    let (vs, w) = scalar_store(0.0);
    let mut optimizer = build_optimizer(&vs, &OptimizerConfig::default()).unwrap();
    optimizer.backward_step(&linear_loss(&w, 1.0));
    let moved = w.double_value(&[0]);
    assert!(moved < 0.0 && moved > -1e-2, "{moved}");
}

proptest! {
    #[test]
    fn adadelta_first_step_opposes_the_gradient(slope in -100.0f64..100.0) {
        prop_assume!(slope.abs() > 1e-3);
        let (vs, w) = scalar_store(0.0);
        let mut optimizer = Adadelta::new(&vs, 1.0, 0.95, 1e-7);
        optimizer.backward_step(&linear_loss(&w, slope));

        let moved = w.double_value(&[0]);
        let expected = -slope * (1e-7f64).sqrt() / (0.05 * slope * slope + 1e-7).sqrt();
        prop_assert!(moved * slope < 0.0);
        prop_assert!((moved - expected).abs() < 1e-6);
    }
}
