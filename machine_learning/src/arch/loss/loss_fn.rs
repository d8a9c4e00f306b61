use ndarray::{Array2, ArrayView2};

/// A loss function measures how far a batch of predictions is from the expected outputs.
pub trait LossFn: Send {
    /// The mean loss of the batch.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// The derivative of `loss` with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
