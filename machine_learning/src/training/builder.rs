use comms::specs::machine_learning::{CompileSpec, LossFnSpec, OptimizerSpec};

use super::Trainer;
use crate::{
    arch::loss::{CategoricalCrossentropy, LossFn, Mse},
    optimization::{Adam, GradientDescent, Optimizer, RmsProp},
};

/// Builds `Trainer`s given a compile specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The loss, optimizer and metrics to train with.
    /// * `size` - The amount of parameters of the model that will be trained.
    pub fn build(&self, spec: &CompileSpec, size: usize) -> Trainer {
        let optimizer = self.resolve_optimizer(spec.optimizer, size);
        let loss_fn = self.resolve_loss(spec.loss);
        Trainer::new(loss_fn, optimizer, spec.metrics.clone())
    }

    fn resolve_optimizer(&self, spec: OptimizerSpec, size: usize) -> Box<dyn Optimizer> {
        match spec {
            OptimizerSpec::GradientDescent { learning_rate } => {
                Box::new(GradientDescent::new(learning_rate))
            }
            OptimizerSpec::RmsProp {
                learning_rate,
                rho,
                epsilon,
            } => Box::new(RmsProp::new(size, learning_rate, rho, epsilon)),
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(size, learning_rate, beta1, beta2, epsilon)),
        }
    }

    fn resolve_loss(&self, spec: LossFnSpec) -> Box<dyn LossFn> {
        match spec {
            LossFnSpec::Mse => Box::new(Mse),
            LossFnSpec::CategoricalCrossentropy => Box::new(CategoricalCrossentropy),
        }
    }
}
