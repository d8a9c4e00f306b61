use comms::Tensor;
use rayon::prelude::*;

use super::Aggregator;

/// Adds `scale * sum(gradients)` into `center`, one tensor per rayon task.
fn add_scaled_sum(center: &mut [Tensor], gradients: &[&[Tensor]], scale: f32) {
    center.par_iter_mut().enumerate().for_each(|(i, tensor)| {
        let data = tensor.data_mut();

        for gradient in gradients {
            for (c, g) in data.iter_mut().zip(gradient[i].data()) {
                *c += scale * g;
            }
        }
    });
}

/// `center += sum(gradients)`, the plain EASGD update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl Aggregator for Sum {
    fn aggregate(&mut self, center: &mut [Tensor], gradients: &[&[Tensor]]) {
        add_scaled_sum(center, gradients, 1.);
    }
}

/// `center += sum(gradients) / n`
#[derive(Debug, Clone, Copy, Default)]
pub struct Average;

impl Aggregator for Average {
    fn aggregate(&mut self, center: &mut [Tensor], gradients: &[&[Tensor]]) {
        if gradients.is_empty() {
            return;
        }

        add_scaled_sum(center, gradients, 1. / gradients.len() as f32);
    }
}

/// `center += alpha * sum(gradients)`, the elastic moving rate form.
#[derive(Debug, Clone, Copy)]
pub struct Elastic {
    alpha: f32,
}

impl Elastic {
    /// Creates a new `Elastic` aggregator, `alpha` is expected to be finite and positive.
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }
}

impl Aggregator for Elastic {
    fn aggregate(&mut self, center: &mut [Tensor], gradients: &[&[Tensor]]) {
        add_scaled_sum(center, gradients, self.alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(data: &[f32]) -> Tensor {
        Tensor::new(vec![data.len()], data.to_vec()).unwrap()
    }

    fn run<A: Aggregator>(mut aggregator: A) -> Vec<Tensor> {
        let mut center = vec![t(&[1., 1.]), t(&[0.])];
        let g0 = vec![t(&[1., 2.]), t(&[4.])];
        let g1 = vec![t(&[3., -2.]), t(&[2.])];

        aggregator.aggregate(&mut center, &[g0.as_slice(), g1.as_slice()]);
        center
    }

    #[test]
    fn sum() {
        assert_eq!(run(Sum), [t(&[5., 1.]), t(&[6.])]);
    }

    #[test]
    fn average() {
        assert_eq!(run(Average), [t(&[3., 1.]), t(&[3.])]);
    }

    #[test]
    fn elastic() {
        assert_eq!(run(Elastic::new(0.5)), [t(&[3., 1.]), t(&[3.])]);
    }
}
