mod easgd;
mod ensemble;

pub use easgd::EasgdTrainer;
pub use ensemble::{EnsembleOutput, EnsembleTrainer, merge_models};
