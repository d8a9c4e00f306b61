use serde::{Deserialize, Serialize};

/// The specification for the `Aggregator` trait.
///
/// Every variant adds the submitted gradients into the center variable, they only
/// differ in how the sum gets scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorSpec {
    /// `center += sum(gradients)`
    #[default]
    Sum,
    /// `center += sum(gradients) / n`
    Average,
    /// `center += alpha * sum(gradients)`
    Elastic { alpha: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregator_spec_from_json() {
        let spec: AggregatorSpec = serde_json::from_str(r#""average""#).unwrap();
        assert_eq!(spec, AggregatorSpec::Average);

        let json = r#"{ "elastic": { "alpha": 0.5 } }"#;
        let spec: AggregatorSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, AggregatorSpec::Elastic { alpha: 0.5 });
    }
}
