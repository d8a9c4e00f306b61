use comms::specs::machine_learning::{ActFnSpec, LayerSpec, ModelSpec, ParamGenSpec};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

use super::{Sequential, activations::ActFn, layers::Dense};
use crate::{MlErr, Result};

/// Builds freshly initialized `Sequential` models given a specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelBuilder {
    param_gen: ParamGenSpec,
    seed: Option<u64>,
}

impl ModelBuilder {
    /// Creates a new `ModelBuilder`.
    ///
    /// # Arguments
    /// * `param_gen` - How the weights get their initial values.
    /// * `seed` - An optional seed, the same seed always yields the same weights.
    ///
    /// # Returns
    /// A new `ModelBuilder` instance.
    pub fn new(param_gen: ParamGenSpec, seed: Option<u64>) -> Self {
        Self { param_gen, seed }
    }

    /// Builds a new `Sequential` following a spec.
    ///
    /// With `const` every parameter, biases included, takes the given value. The random
    /// generators only sample the weights, biases start at zero.
    ///
    /// # Arguments
    /// * `spec` - The specification for the model.
    ///
    /// # Returns
    /// The initialized model or an error if the spec or the generator are invalid.
    pub fn build(&self, spec: &ModelSpec) -> Result<Sequential> {
        let mut model = Sequential::from_spec(spec.clone())?;
        let mut rng = self.generate_rng();

        let mut params = Vec::with_capacity(model.size());
        for layer in model.layers() {
            params.extend(self.sample_layer(layer, &mut rng)?);
        }

        model.params_mut().copy_from_slice(&params);
        Ok(model)
    }

    fn sample_layer(&self, layer: &Dense, rng: &mut StdRng) -> Result<Vec<f32>> {
        let (fan_in, fan_out) = layer.dim();
        let w_size = fan_in * fan_out;

        let distribution = match self.param_gen {
            ParamGenSpec::Const { value } => return Ok(vec![value; layer.size()]),
            ParamGenSpec::Uniform { low, high } => Uniform::new(low, high)?,
            ParamGenSpec::XavierUniform => {
                let range = (6. / (fan_in + fan_out) as f32).sqrt();
                Uniform::new(-range, range)?
            }
        };

        let mut params: Vec<f32> = distribution.sample_iter(rng).take(w_size).collect();
        params.resize(layer.size(), 0.);
        Ok(params)
    }

    fn generate_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Turns the layer specs into layers, checking that every layer's input matches the
/// output of the one before it.
pub(super) fn resolve_layers(spec: &ModelSpec) -> Result<Vec<Dense>> {
    let ModelSpec::Sequential { layers } = spec;

    if layers.is_empty() {
        return Err(MlErr::SizeMismatch {
            what: "layers",
            got: 0,
            expected: 1,
        });
    }

    let layers: Vec<_> = layers.iter().map(|ls| resolve_layer(*ls)).collect();

    for pair in layers.windows(2) {
        let (_, out) = pair[0].dim();
        let (inp, _) = pair[1].dim();

        if inp != out {
            return Err(MlErr::SizeMismatch {
                what: "layer dimensions",
                got: inp,
                expected: out,
            });
        }
    }

    Ok(layers)
}

fn resolve_layer(spec: LayerSpec) -> Dense {
    match spec {
        LayerSpec::Dense { dim, act_fn } => Dense::new(dim, act_fn.map(resolve_act_fn)),
    }
}

fn resolve_act_fn(spec: ActFnSpec) -> ActFn {
    match spec {
        ActFnSpec::Sigmoid { amp } => ActFn::sigmoid(amp),
        ActFnSpec::Relu => ActFn::Relu,
        ActFnSpec::Tanh => ActFn::Tanh,
        ActFnSpec::Softmax => ActFn::softmax(),
    }
}
