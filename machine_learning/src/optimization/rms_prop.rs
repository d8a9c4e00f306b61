use super::{Optimizer, optimizer::check_len};
use crate::Result;

/// RMSProp, scales every step by a moving average of the squared gradient.
#[derive(Debug)]
pub struct RmsProp {
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
    s: Box<[f32]>,
}

impl RmsProp {
    /// Creates a new `RmsProp` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `rho` - The discount factor of the moving average.
    /// * `epsilon` - A small constant for numerical stability.
    ///
    /// # Returns
    /// A new `RmsProp` instance.
    pub fn new(len: usize, learning_rate: f32, rho: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            rho,
            epsilon,
            s: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for RmsProp {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_len(params, grad)?;
        check_len(params, &self.s)?;

        let Self {
            learning_rate: lr,
            rho,
            epsilon: eps,
            ..
        } = *self;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.s.iter_mut())
            .for_each(|((p, g), s)| {
                *s = rho * *s + (1. - rho) * g.powi(2);
                *p -= lr * g / (s.sqrt() + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_is_normalized() {
        let mut params = [0., 0.];
        let mut optimizer = RmsProp::new(2, 0.1, 0.0, 0.0);

        optimizer.update_params(&mut params, &[4., -0.5]).unwrap();
        assert_eq!(params, [-0.1, 0.1]);
    }
}
