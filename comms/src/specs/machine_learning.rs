use serde::{Deserialize, Serialize};

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Sigmoid { amp: f32 },
    Relu,
    Tanh,
    Softmax,
}

/// The specification for the `Dense` layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFnSpec>,
    },
}

/// The specification for the `Sequential` model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    GradientDescent {
        learning_rate: f32,
    },
    RmsProp {
        learning_rate: f32,
        rho: f32,
        epsilon: f32,
    },
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::RmsProp {
            learning_rate: 0.001,
            rho: 0.9,
            epsilon: 1e-7,
        }
    }
}

/// The specification for the `LossFn` trait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    Mse,
    #[default]
    CategoricalCrossentropy,
}

/// The metrics reported by `fit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSpec {
    Accuracy,
}

/// The specification for the initial weights generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamGenSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    #[default]
    XavierUniform,
}

/// The loss, optimizer and metrics a model gets compiled with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSpec {
    #[serde(default)]
    pub loss: LossFnSpec,
    #[serde(default)]
    pub optimizer: OptimizerSpec,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricSpec>,
}

fn default_metrics() -> Vec<MetricSpec> {
    vec![MetricSpec::Accuracy]
}

impl Default for CompileSpec {
    fn default() -> Self {
        Self {
            loss: LossFnSpec::default(),
            optimizer: OptimizerSpec::default(),
            metrics: default_metrics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_spec_from_json() {
        let json = r#"{
            "sequential": {
                "layers": [
                    { "dense": { "dim": [4, 8], "act_fn": { "sigmoid": { "amp": 1.0 } } } },
                    { "dense": { "dim": [8, 3], "act_fn": "softmax" } }
                ]
            }
        }"#;

        let ModelSpec::Sequential { layers } = serde_json::from_str(json).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(
            layers[1],
            LayerSpec::Dense {
                dim: (8, 3),
                act_fn: Some(ActFnSpec::Softmax)
            }
        );
    }

    #[test]
    fn compile_spec_defaults() {
        let spec: CompileSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, CompileSpec::default());
        assert_eq!(spec.loss, LossFnSpec::CategoricalCrossentropy);
        assert!(matches!(spec.optimizer, OptimizerSpec::RmsProp { .. }));
    }
}
