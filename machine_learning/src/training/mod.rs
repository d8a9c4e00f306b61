mod builder;
mod history;
pub mod metrics;
mod trainer;

pub use builder::TrainerBuilder;
pub use history::History;
pub use trainer::Trainer;
