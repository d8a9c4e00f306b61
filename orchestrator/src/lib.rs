pub mod configs;
pub mod data;
mod error;
mod predictor;
mod trainers;
pub mod transformers;

pub use error::{Result, TrainerErr};
pub use predictor::ModelPredictor;
pub use trainers::{EasgdTrainer, EnsembleOutput, EnsembleTrainer, merge_models};
