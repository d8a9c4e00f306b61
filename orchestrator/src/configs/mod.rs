//! The JSON configuration of a training run.

mod easgd;
mod ensemble;
mod model;
mod training;

pub use easgd::EasgdConfig;
pub use ensemble::EnsembleConfig;
pub use model::ModelConfig;
pub use training::TrainingConfig;

use crate::{Result, TrainerErr};

/// Parses a configuration from its JSON text.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json).map_err(|e| TrainerErr::InvalidConfig(e.to_string()))
}
