use comms::specs::coordinator::AggregatorSpec;

use super::{Aggregator, Average, Elastic, Sum};
use crate::{CoordinatorErr, Result};

/// Builds `Aggregator`s given a specification.
#[derive(Default)]
pub struct AggregatorBuilder;

impl AggregatorBuilder {
    /// Creates a new `AggregatorBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Aggregator` following a spec.
    ///
    /// # Returns
    /// The aggregator or an error if its parameters are out of range.
    pub fn build(&self, spec: AggregatorSpec) -> Result<Box<dyn Aggregator>> {
        let aggregator: Box<dyn Aggregator> = match spec {
            AggregatorSpec::Sum => Box::new(Sum),
            AggregatorSpec::Average => Box::new(Average),
            AggregatorSpec::Elastic { alpha } if alpha.is_finite() && alpha > 0. => {
                Box::new(Elastic::new(alpha))
            }
            AggregatorSpec::Elastic { alpha } => {
                return Err(CoordinatorErr::InvalidAggregator(format!(
                    "the elastic rate must be finite and positive, got {alpha}"
                )));
            }
        };

        Ok(aggregator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_alpha() {
        let builder = AggregatorBuilder::new();

        assert!(builder.build(AggregatorSpec::Elastic { alpha: 0.9 }).is_ok());
        assert!(builder.build(AggregatorSpec::Elastic { alpha: 0. }).is_err());
        assert!(builder.build(AggregatorSpec::Elastic { alpha: f32::NAN }).is_err());
    }
}
