use ndarray::{Array2, ArrayView2, Zip};

use super::{Sigmoid, Softmax};

/// The activation function applied to the output of a layer.
#[derive(Clone, Copy, Debug)]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Relu,
    Tanh,
    Softmax(Softmax),
}

impl ActFn {
    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn softmax() -> Self {
        Self::Softmax(Softmax)
    }

    /// Applies the activation to the pre-activations `z`.
    pub fn forward(&self, z: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Self::Sigmoid(s) => z.mapv(|z| s.f(z)),
            Self::Relu => z.mapv(|z| z.max(0.)),
            Self::Tanh => z.mapv(f32::tanh),
            Self::Softmax(s) => s.f(z),
        }
    }

    /// Back propagates the delta `d` of the output through the activation.
    ///
    /// # Arguments
    /// * `d` - The derivative of the loss with respect to the activation's output.
    /// * `z` - The pre-activations cached in the forward pass.
    /// * `a` - The activations cached in the forward pass.
    ///
    /// # Returns
    /// The derivative of the loss with respect to `z`.
    pub fn backward(
        &self,
        mut d: Array2<f32>,
        z: ArrayView2<f32>,
        a: ArrayView2<f32>,
    ) -> Array2<f32> {
        match self {
            Self::Sigmoid(s) => d.zip_mut_with(&z, |d, &z| *d *= s.df(z)),
            Self::Relu => d.zip_mut_with(&z, |d, &z| {
                if z <= 0. {
                    *d = 0.;
                }
            }),
            Self::Tanh => Zip::from(&mut d).and(&a).for_each(|d, &a| *d *= 1. - a * a),
            Self::Softmax(s) => return s.df(d, a),
        }

        d
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn relu_zeroes_negative_inputs_and_their_deltas() {
        let z = array![[-1., 0., 2.]];
        let a = ActFn::Relu.forward(z.view());
        assert_eq!(a, array![[0., 0., 2.]]);

        let d = ActFn::Relu.backward(Array2::ones((1, 3)), z.view(), a.view());
        assert_eq!(d, array![[0., 0., 1.]]);
    }

    #[test]
    fn tanh_derivative_uses_cached_output() {
        let z = array![[0.]];
        let a = ActFn::Tanh.forward(z.view());
        let d = ActFn::Tanh.backward(array![[3.]], z.view(), a.view());
        assert_eq!(d, array![[3.]]);
    }
}
