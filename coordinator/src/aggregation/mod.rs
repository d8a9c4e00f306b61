mod aggregator;
mod builder;
mod scaled;

pub use aggregator::Aggregator;
pub use builder::AggregatorBuilder;
pub use scaled::{Average, Elastic, Sum};
