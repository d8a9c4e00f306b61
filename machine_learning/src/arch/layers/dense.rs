use ndarray::prelude::*;

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer, `a = act_fn(x · W + b)`.
///
/// The layer doesn't own its parameters, they are laid out in a flat slice as the
/// row-major `(in, out)` weights followed by the `out` biases.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
    a: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output dimensions.
    /// * `act_fn` - An optional activation function, `None` leaves the layer linear.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((0, 0));

        Self {
            dim,
            act_fn,
            size: (dim.0 + 1) * dim.1,
            x: zeros.clone(),
            z: zeros.clone(),
            a: zeros,
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// The shapes of the weights and biases, in the order they are laid out.
    pub fn param_shapes(&self) -> [Vec<usize>; 2] {
        [vec![self.dim.0, self.dim.1], vec![self.dim.1]]
    }

    /// Computes the output of the layer without keeping any metadata.
    pub fn infer(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (z, a) = self.activate(params, x)?;
        Ok(a.unwrap_or(z))
    }

    /// Computes the output of the layer keeping what `backward` needs.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (z, a) = self.activate(params, x)?;

        self.x = x.to_owned();
        self.z = z;
        self.a = a.unwrap_or_else(|| self.z.clone());

        Ok(self.a.clone())
    }

    /// Back propagates the delta of this layer's output.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's slice of the gradient, it gets overwritten.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        let d = match &self.act_fn {
            Some(act_fn) => act_fn.backward(d, self.z.view(), self.a.view()),
            None => d,
        };

        let (mut dw, mut db) = self.view_grad(grad)?;
        dw.assign(&self.x.t().dot(&d));
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn activate(
        &self,
        params: &[f32],
        x: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Option<Array2<f32>>)> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "layer input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;
        let a = self.act_fn.map(|act_fn| act_fn.forward(z.view()));

        Ok((z, a))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let len = grad.len();
        self.check_len(len)?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.size - self.dim.1);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.len_err(len))?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).map_err(|_| self.len_err(len))?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        let len = params.len();
        self.check_len(len)?;

        let (w_raw, b_raw) = params.split_at(self.size - self.dim.1);
        let w = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.len_err(len))?;
        let b = ArrayView1::from_shape(self.dim.1, b_raw).map_err(|_| self.len_err(len))?;
        Ok((w, b))
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.size {
            return Err(self.len_err(len));
        }

        Ok(())
    }

    fn len_err(&self, len: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "layer parameters",
            got: len,
            expected: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn forward_is_affine_without_act_fn() {
        // W = [[1, 2], [3, 4]], b = [0.5, -0.5]
        let params = [1., 2., 3., 4., 0.5, -0.5];
        let mut dense = Dense::new((2, 2), None);

        let out = dense.forward(&params, array![[1., 1.]].view()).unwrap();
        assert_eq!(out, array![[4.5, 5.5]]);
        assert_eq!(dense.infer(&params, array![[1., 1.]].view()).unwrap(), out);
    }

    #[test]
    fn backward_writes_weight_and_bias_grads() {
        let params = [1., 2., 3., 4., 0., 0.];
        let mut grad = [0.; 6];
        let mut dense = Dense::new((2, 2), None);

        dense.forward(&params, array![[1., 2.]].view()).unwrap();
        let dx = dense
            .backward(&params, &mut grad, array![[1., -1.]])
            .unwrap();

        assert_eq!(grad, [1., -1., 2., -2., 1., -1.]);
        assert_eq!(dx, array![[-1., -1.]]);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let dense = Dense::new((3, 1), None);
        assert!(matches!(
            dense.infer(&[0.; 4], array![[1., 2.]].view()),
            Err(MlErr::SizeMismatch { .. })
        ));
    }
}
