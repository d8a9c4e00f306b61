use ndarray::{Array2, ArrayView2, Zip};

use super::LossFn;

/// Predictions are clamped to `[EPSILON, 1 - EPSILON]` before taking their log.
const EPSILON: f32 = 1e-7;

/// Categorical cross-entropy between one-hot labels and predicted probabilities.
///
/// The predictions are expected to be probability distributions, as the ones given by a
/// softmax output layer.
#[derive(Default, Clone, Copy)]
pub struct CategoricalCrossentropy;

impl LossFn for CategoricalCrossentropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let nrows = y_pred.nrows().max(1) as f32;

        let total = Zip::from(&y_pred)
            .and(&y)
            .fold(0f32, |acc, &p, &t| acc - t * p.clamp(EPSILON, 1. - EPSILON).ln());

        total / nrows
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let nrows = y_pred.nrows().max(1) as f32;

        Zip::from(&y_pred)
            .and(&y)
            .map_collect(|&p, &t| -t / (p.clamp(EPSILON, 1. - EPSILON) * nrows))
    }
}
