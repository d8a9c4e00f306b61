use super::{Optimizer, optimizer::check_len};
use crate::{MlErr, Result};

/// The running first and second moment of a single parameter.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    mean: f32,
    variance: f32,
}

/// Adam with bias correction folded into the step size.
///
/// Every worker round recompiles the model, so the moments and the step count start over
/// each time the center variable gets fetched.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters of the model.
    /// * `learning_rate` - The base step size.
    /// * `beta1` - The decay of the gradients' running mean.
    /// * `beta2` - The decay of the gradients' running uncentered variance.
    /// * `epsilon` - Keeps the denominator away from zero.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            step: 0,
            moments: vec![Moments::default(); len],
        }
    }

    /// The learning rate of the current step once both moments are unbiased.
    fn corrected_rate(&self) -> f32 {
        let bias1 = 1. - self.beta1.powi(self.step);
        let bias2 = 1. - self.beta2.powi(self.step);
        self.learning_rate * bias2.sqrt() / bias1
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_len(params, grad)?;
        if self.moments.len() != params.len() {
            return Err(MlErr::SizeMismatch {
                what: "optimizer state",
                got: self.moments.len(),
                expected: params.len(),
            });
        }

        self.step = self.step.saturating_add(1);
        let rate = self.corrected_rate();
        let Self {
            beta1,
            beta2,
            epsilon,
            ..
        } = *self;

        for ((p, &g), m) in params.iter_mut().zip(grad).zip(&mut self.moments) {
            m.mean = beta1 * m.mean + (1. - beta1) * g;
            m.variance = beta2 * m.variance + (1. - beta2) * g * g;
            *p -= rate * m.mean / (m.variance.sqrt() + epsilon);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_has_learning_rate_length() {
        let mut params = [1., 1.];
        let mut optimizer = Adam::new(2, 0.01, 0.9, 0.999, 0.);

        optimizer.update_params(&mut params, &[3., -0.2]).unwrap();

        assert!((params[0] - 0.99).abs() < 1e-5);
        assert!((params[1] - 1.01).abs() < 1e-5);
    }

    #[test]
    fn mismatching_lengths_are_rejected() {
        let mut params = [1., 1., 1.];
        let mut optimizer = Adam::new(2, 0.01, 0.9, 0.999, 1e-7);

        assert!(optimizer.update_params(&mut params, &[0.; 3]).is_err());
        assert_eq!(params, [1.; 3]);
    }
}
