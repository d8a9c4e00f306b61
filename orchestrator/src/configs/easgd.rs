use std::num::NonZeroUsize;

use comms::specs::coordinator::AggregatorSpec;
use serde::{Deserialize, Serialize};

use super::{ModelConfig, TrainingConfig};
use crate::{Result, TrainerErr};

const DEFAULT_HOST: &str = "127.0.0.1";

fn default_host() -> String {
    DEFAULT_HOST.into()
}

/// The configuration of an EASGD training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EasgdConfig {
    #[serde(flatten)]
    pub model: ModelConfig,
    pub num_workers: NonZeroUsize,
    #[serde(default)]
    pub aggregator: AggregatorSpec,
    /// The host the coordinator binds to, the port is picked by the system.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(flatten)]
    pub training: TrainingConfig,
}

impl EasgdConfig {
    pub fn new(model: ModelConfig, num_workers: NonZeroUsize) -> Self {
        Self {
            model,
            num_workers,
            aggregator: AggregatorSpec::default(),
            host: default_host(),
            training: TrainingConfig::default(),
        }
    }

    /// Checks the configuration before anything gets started.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TrainerErr::InvalidConfig("host must not be empty".into()));
        }

        if let AggregatorSpec::Elastic { alpha } = self.aggregator {
            if !alpha.is_finite() || alpha <= 0. {
                return Err(TrainerErr::InvalidConfig(format!(
                    "elastic alpha must be positive, got {alpha}"
                )));
            }
        }

        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use comms::specs::machine_learning::{LossFnSpec, ModelSpec, ParamGenSpec};

    use super::*;

    #[test]
    fn parse_from_json() {
        let json = r#"{
            "model": { "sequential": { "layers": [
                { "dense": { "dim": [2, 2], "act_fn": "softmax" } }
            ] } },
            "param_gen": { "const": { "value": 0.5 } },
            "seed": 3,
            "num_workers": 4,
            "aggregator": { "elastic": { "alpha": 0.25 } },
            "compile": { "loss": "mse" },
            "batch_size": 32,
            "poll_interval_ms": 10
        }"#;

        let config: EasgdConfig = serde_json::from_str(json).unwrap();
        let ModelSpec::Sequential { layers } = &config.model.model;

        assert_eq!(layers.len(), 1);
        assert_eq!(config.model.param_gen, ParamGenSpec::Const { value: 0.5 });
        assert_eq!(config.model.seed, Some(3));
        assert_eq!(config.num_workers.get(), 4);
        assert_eq!(config.aggregator, AggregatorSpec::Elastic { alpha: 0.25 });
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.training.compile.loss, LossFnSpec::Mse);
        assert_eq!(config.training.batch_size.get(), 32);
        assert_eq!(config.training.features_col, "features");
        config.validate().unwrap();
    }

    #[test]
    fn zero_workers_is_rejected() {
        let json = r#"{ "model": { "sequential": { "layers": [] } }, "num_workers": 0 }"#;
        assert!(serde_json::from_str::<EasgdConfig>(json).is_err());
    }

    #[test]
    fn negative_alpha_is_rejected() {
        let mut config = EasgdConfig::new(
            ModelConfig::new(ModelSpec::Sequential { layers: vec![] }),
            NonZeroUsize::MIN,
        );
        config.aggregator = AggregatorSpec::Elastic { alpha: -1. };

        assert!(matches!(config.validate(), Err(TrainerErr::InvalidConfig(_))));
    }
}
