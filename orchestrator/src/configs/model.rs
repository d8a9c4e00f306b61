use comms::specs::machine_learning::{ModelSpec, ParamGenSpec};
use machine_learning::{ModelBuilder, Sequential};
use serde::{Deserialize, Serialize};

use crate::{Result, TrainerErr};

/// The master model: its architecture and how its weights get initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: ModelSpec,
    #[serde(default)]
    pub param_gen: ParamGenSpec,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ModelConfig {
    pub fn new(model: ModelSpec) -> Self {
        Self {
            model,
            param_gen: ParamGenSpec::default(),
            seed: None,
        }
    }

    /// Builds a freshly initialized master model.
    ///
    /// # Returns
    /// The model or an `InvalidConfig` error if the architecture or the generator are invalid.
    pub fn build(&self) -> Result<Sequential> {
        ModelBuilder::new(self.param_gen, self.seed)
            .build(&self.model)
            .map_err(|e| TrainerErr::InvalidConfig(format!("model: {e}")))
    }
}
