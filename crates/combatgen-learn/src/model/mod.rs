//! A small convolutional classifier built on `tch`.

mod network;
mod optimizer;
mod shape;

pub use network::{LayerSummary, ModelSummary, Network};
pub use optimizer::{Adadelta, Optimizer, build_optimizer};
pub use shape::Shape;

#[cfg(test)]
mod tests;
