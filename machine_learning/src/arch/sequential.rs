use std::{fmt, num::NonZeroUsize};

use comms::{
    ShapeErr, Tensor,
    specs::machine_learning::{CompileSpec, ModelSpec},
};
use ndarray::{Array2, ArrayView2};

use super::{builder, layers::Dense, loss::LossFn};
use crate::{
    MlErr, Result,
    optimization::Optimizer,
    training::{History, Trainer, TrainerBuilder},
};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// All the parameters live in a single flat buffer, each layer views its own slice of it.
pub struct Sequential {
    spec: ModelSpec,
    layers: Vec<Dense>,
    params: Vec<f32>,
    grad: Vec<f32>,
    trainer: Option<Trainer>,
}

impl Sequential {
    /// Creates a new `Sequential` with all of its parameters set to zero.
    ///
    /// # Arguments
    /// * `spec` - The architecture of the model.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if the layer dimensions don't chain.
    pub fn from_spec(spec: ModelSpec) -> Result<Self> {
        let layers = builder::resolve_layers(&spec)?;
        let size = layers.iter().map(Dense::size).sum();

        Ok(Self {
            spec,
            layers,
            params: vec![0.; size],
            grad: vec![0.; size],
            trainer: None,
        })
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.params.len()
    }

    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |l| l.dim().0)
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |l| l.dim().1)
    }

    /// Copies out the weights of the model, per layer its weights and then its biases.
    pub fn get_weights(&self) -> Vec<Tensor> {
        let mut weights = Vec::with_capacity(self.layers.len() * 2);
        let mut offset = 0;

        for shape in self.weight_shapes() {
            let mut tensor = Tensor::zeros(shape);
            let len = tensor.len();

            tensor
                .data_mut()
                .copy_from_slice(&self.params[offset..offset + len]);

            offset += len;
            weights.push(tensor);
        }

        weights
    }

    /// Replaces every weight of the model.
    ///
    /// # Arguments
    /// * `weights` - The new weights, laid out as `get_weights` returns them.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if the amount of tensors or any of their shapes differ from
    /// the model's, the model is left untouched in that case.
    pub fn set_weights(&mut self, weights: &[Tensor]) -> Result<()> {
        let shapes = self.weight_shapes();

        if shapes.len() != weights.len() {
            return Err(ShapeErr::Count {
                expected: shapes.len(),
                got: weights.len(),
            }
            .into());
        }

        for (shape, tensor) in shapes.into_iter().zip(weights) {
            if shape != tensor.shape() {
                return Err(ShapeErr::Shape {
                    expected: shape,
                    got: tensor.shape().to_vec(),
                }
                .into());
            }
        }

        let mut offset = 0;
        for tensor in weights {
            self.params[offset..offset + tensor.len()].copy_from_slice(tensor.data());
            offset += tensor.len();
        }

        Ok(())
    }

    /// Configures the model for training.
    ///
    /// Compiling again drops the previous optimizer state.
    pub fn compile(&mut self, spec: &CompileSpec) {
        self.trainer = Some(TrainerBuilder::new().build(spec, self.size()));
    }

    pub fn is_compiled(&self) -> bool {
        self.trainer.is_some()
    }

    /// Trains the model on `x` and `y`.
    ///
    /// # Arguments
    /// * `x` - The input rows.
    /// * `y` - The expected output rows.
    /// * `epochs` - The amount of passes over the data.
    /// * `batch_size` - The amount of rows per parameter update.
    ///
    /// # Returns
    /// The per epoch loss and metrics, or `NotCompiled` if `compile` wasn't called yet.
    pub fn fit(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        epochs: usize,
        batch_size: NonZeroUsize,
    ) -> Result<History> {
        let mut trainer = self.trainer.take().ok_or(MlErr::NotCompiled)?;
        let history = trainer.fit(self, x, y, epochs, batch_size);
        self.trainer = Some(trainer);
        history
    }

    /// Computes the output of the model for every row of `x`.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut out = x.to_owned();
        let mut offset = 0;

        for layer in &self.layers {
            let size = layer.size();
            out = layer.infer(&self.params[offset..offset + size], out.view())?;
            offset += size;
        }

        Ok(out)
    }

    /// Runs a forward and a backward pass over a single batch and updates the parameters.
    ///
    /// # Returns
    /// The batch loss and the predictions made in the forward pass.
    pub(crate) fn backprop(
        &mut self,
        loss_fn: &dyn LossFn,
        optimizer: &mut dyn Optimizer,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<(f32, Array2<f32>)> {
        let Self {
            layers,
            params,
            grad,
            ..
        } = self;

        grad.fill(0.);

        let mut out = x.to_owned();
        let mut offset = 0;

        for layer in layers.iter_mut() {
            let size = layer.size();
            out = layer.forward(&params[offset..offset + size], out.view())?;
            offset += size;
        }

        let loss = loss_fn.loss(out.view(), y);
        let mut d = loss_fn.loss_prime(out.view(), y);
        let mut end = params.len();

        for layer in layers.iter_mut().rev() {
            let start = end - layer.size();
            d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
            end = start;
        }

        optimizer.update_params(params, grad)?;
        Ok((loss, out))
    }

    pub(crate) fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    pub(crate) fn layers(&self) -> &[Dense] {
        &self.layers
    }

    fn weight_shapes(&self) -> Vec<Vec<usize>> {
        self.layers.iter().flat_map(Dense::param_shapes).collect()
    }
}

impl fmt::Debug for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequential")
            .field("spec", &self.spec)
            .field("size", &self.size())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use comms::specs::machine_learning::{ActFnSpec, LayerSpec, LossFnSpec, OptimizerSpec};
    use ndarray::array;

    use super::*;

    fn spec(layers: &[(usize, usize)]) -> ModelSpec {
        ModelSpec::Sequential {
            layers: layers
                .iter()
                .map(|&dim| LayerSpec::Dense {
                    dim,
                    act_fn: Some(ActFnSpec::Sigmoid { amp: 1. }),
                })
                .collect(),
        }
    }

    #[test]
    fn weights_are_per_layer_weights_then_biases() {
        let model = Sequential::from_spec(spec(&[(2, 3), (3, 1)])).unwrap();
        let shapes: Vec<_> = model.get_weights().iter().map(|t| t.shape().to_vec()).collect();

        assert_eq!(shapes, [vec![2, 3], vec![3], vec![3, 1], vec![1]]);
        assert_eq!(model.size(), 13);
    }

    #[test]
    fn set_weights_replaces_parameters() {
        let mut model = Sequential::from_spec(spec(&[(2, 1)])).unwrap();
        let weights = vec![
            Tensor::new(vec![2, 1], vec![1., -1.]).unwrap(),
            Tensor::new(vec![1], vec![0.5]).unwrap(),
        ];

        model.set_weights(&weights).unwrap();
        assert_eq!(model.get_weights(), weights);
    }

    #[test]
    fn set_weights_rejects_other_shapes() {
        let mut model = Sequential::from_spec(spec(&[(2, 1)])).unwrap();
        let before = model.get_weights();

        let weights = vec![
            Tensor::new(vec![1, 2], vec![1., -1.]).unwrap(),
            Tensor::new(vec![1], vec![0.5]).unwrap(),
        ];

        assert!(matches!(
            model.set_weights(&weights),
            Err(MlErr::ShapeMismatch(ShapeErr::Shape { .. }))
        ));
        assert!(matches!(
            model.set_weights(&weights[1..]),
            Err(MlErr::ShapeMismatch(ShapeErr::Count { .. }))
        ));
        assert_eq!(model.get_weights(), before);
    }

    #[test]
    fn fit_requires_compile() {
        let mut model = Sequential::from_spec(spec(&[(1, 1)])).unwrap();
        let x = array![[1.]];

        assert!(matches!(
            model.fit(x.view(), x.view(), 1, NonZeroUsize::MIN),
            Err(MlErr::NotCompiled)
        ));
    }

    #[test]
    fn fit_moves_the_weights() {
        let mut model = Sequential::from_spec(spec(&[(2, 1)])).unwrap();
        model.compile(&CompileSpec {
            loss: LossFnSpec::Mse,
            optimizer: OptimizerSpec::GradientDescent { learning_rate: 1. },
            metrics: vec![],
        });

        let x = array![[1., 0.], [0., 1.]];
        let y = array![[1.], [1.]];
        let before = model.get_weights();

        let history = model.fit(x.view(), y.view(), 3, NonZeroUsize::MIN).unwrap();

        assert_eq!(history.loss.len(), 3);
        assert!(history.loss[2] < history.loss[0]);
        assert_ne!(model.get_weights(), before);
    }

    #[test]
    fn predict_has_one_row_per_input() {
        let model = Sequential::from_spec(spec(&[(2, 3), (3, 2)])).unwrap();
        let out = model.predict(array![[1., 2.], [3., 4.], [5., 6.]].view()).unwrap();

        // zero parameters through a sigmoid
        assert_eq!(out.dim(), (3, 2));
        assert!(out.iter().all(|&v| v == 0.5));
    }
}
