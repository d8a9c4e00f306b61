use comms::Tensor;

/// Combines the gradients of a complete iteration into the center variable.
pub trait Aggregator: Send {
    /// Updates `center` in place.
    ///
    /// # Arguments
    /// * `center` - The center variable.
    /// * `gradients` - One gradient per worker ordered by worker id, every one of them with
    ///   the same shapes as `center`.
    fn aggregate(&mut self, center: &mut [Tensor], gradients: &[&[Tensor]]);
}

impl Aggregator for Box<dyn Aggregator> {
    fn aggregate(&mut self, center: &mut [Tensor], gradients: &[&[Tensor]]) {
        (**self).aggregate(center, gradients)
    }
}
