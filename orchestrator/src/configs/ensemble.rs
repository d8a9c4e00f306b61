use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::{ModelConfig, TrainingConfig};
use crate::{Result, TrainerErr, transformers::LabelVectorTransformer};

/// The configuration of an ensemble training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    #[serde(flatten)]
    pub model: ModelConfig,
    pub num_models: NonZeroUsize,
    #[serde(default)]
    pub merge_models: bool,
    /// One-hot encodes the labels before training, the models then learn from its output
    /// column.
    #[serde(default)]
    pub label_transformer: Option<LabelVectorTransformer>,
    #[serde(flatten)]
    pub training: TrainingConfig,
}

impl EnsembleConfig {
    pub fn new(model: ModelConfig, num_models: NonZeroUsize) -> Self {
        Self {
            model,
            num_models,
            merge_models: false,
            label_transformer: None,
            training: TrainingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self
            .label_transformer
            .as_ref()
            .is_some_and(|t| t.output_dim == 0)
        {
            return Err(TrainerErr::InvalidConfig(
                "label_transformer output_dim must be positive".into(),
            ));
        }

        self.training.validate()
    }

    /// The column the models read their labels from.
    pub fn label_col(&self) -> &str {
        match &self.label_transformer {
            Some(transformer) => &transformer.output_col,
            None => &self.training.label_col,
        }
    }
}
