use std::{num::NonZeroUsize, time::Duration};

use comms::specs::machine_learning::{CompileSpec, OptimizerSpec};
use serde::{Deserialize, Serialize};
use worker::WorkerConfig;

use crate::{Result, TrainerErr};

const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

fn default_batch_size() -> NonZeroUsize {
    DEFAULT_BATCH_SIZE
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_features_col() -> String {
    "features".into()
}

fn default_label_col() -> String {
    "label".into()
}

/// The settings every worker of a run shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default)]
    pub compile: CompileSpec,
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_features_col")]
    pub features_col: String,
    #[serde(default = "default_label_col")]
    pub label_col: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            compile: CompileSpec::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            features_col: default_features_col(),
            label_col: default_label_col(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        let learning_rate = match self.compile.optimizer {
            OptimizerSpec::GradientDescent { learning_rate }
            | OptimizerSpec::RmsProp { learning_rate, .. }
            | OptimizerSpec::Adam { learning_rate, .. } => learning_rate,
        };

        if !learning_rate.is_finite() || learning_rate <= 0. {
            return Err(TrainerErr::InvalidConfig(format!(
                "learning_rate must be positive, got {learning_rate}"
            )));
        }

        if self.features_col.is_empty() || self.label_col.is_empty() {
            return Err(TrainerErr::InvalidConfig(
                "features_col and label_col must be named".into(),
            ));
        }

        Ok(())
    }

    /// The worker configuration reading its labels from `label_col`.
    pub fn worker_config(&self, label_col: &str) -> WorkerConfig {
        WorkerConfig::new(self.features_col.as_str(), label_col)
            .with_batch_size(self.batch_size)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_compile(self.compile.clone())
    }
}
