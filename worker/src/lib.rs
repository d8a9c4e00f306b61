mod config;
pub mod data;
mod easgd;
mod ensemble;
mod error;

pub use config::WorkerConfig;
pub use easgd::EasgdWorker;
pub use ensemble::EnsembleWorker;
pub use error::{Result, WorkerErr};
