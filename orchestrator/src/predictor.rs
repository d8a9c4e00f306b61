use log::debug;
use machine_learning::{Sequential, dataset::Row};
use ndarray::Array2;

use crate::{Result, data::Dataset};

/// Appends the output of a model to every row.
#[derive(Debug)]
pub struct ModelPredictor {
    model: Sequential,
    features_col: String,
    output_col: String,
}

impl ModelPredictor {
    /// Creates a new `ModelPredictor` reading `features` and writing `prediction`.
    pub fn new(model: Sequential) -> Self {
        Self {
            model,
            features_col: "features".into(),
            output_col: "prediction".into(),
        }
    }

    pub fn with_columns(
        mut self,
        features_col: impl Into<String>,
        output_col: impl Into<String>,
    ) -> Self {
        self.features_col = features_col.into();
        self.output_col = output_col.into();
        self
    }

    pub fn model(&self) -> &Sequential {
        &self.model
    }

    /// Predicts every row of the dataset, keeping its partitioning.
    ///
    /// Rows whose features are missing or don't match the model's input are dropped.
    ///
    /// # Returns
    /// The rows with the prediction vector added, or an error if the model failed.
    pub fn predict(&self, dataset: Dataset) -> Result<Dataset> {
        let partitions = dataset
            .into_partitions()
            .into_iter()
            .map(|partition| self.predict_partition(partition))
            .collect::<Result<_>>()?;

        Ok(Dataset::from_partitions(partitions))
    }

    fn predict_partition(&self, partition: Vec<Row>) -> Result<Vec<Row>> {
        let input_dim = self.model.input_dim();
        let total = partition.len();

        let rows: Vec<Row> = partition
            .into_iter()
            .filter(|row| {
                row.get(&self.features_col)
                    .is_some_and(|v| v.as_slice().len() == input_dim)
            })
            .collect();

        if rows.len() < total {
            debug!(dropped = total - rows.len(); "rows without valid features");
        }

        if rows.is_empty() {
            return Ok(rows);
        }

        let mut x = Array2::zeros((rows.len(), input_dim));
        for (mut dst, row) in x.rows_mut().into_iter().zip(&rows) {
            if let Some(features) = row.get(&self.features_col) {
                dst.assign(&ndarray::aview1(features.as_slice()));
            }
        }

        let y = self.model.predict(x.view())?;

        Ok(rows
            .into_iter()
            .zip(y.rows())
            .map(|(row, prediction)| row.with(self.output_col.as_str(), prediction.to_vec()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use comms::{
        Tensor,
        specs::machine_learning::{LayerSpec, ModelSpec},
    };
    use machine_learning::dataset::Value;

    use super::*;

    fn identity() -> Sequential {
        let mut model = Sequential::from_spec(ModelSpec::Sequential {
            layers: vec![LayerSpec::Dense {
                dim: (2, 2),
                act_fn: None,
            }],
        })
        .unwrap();

        model
            .set_weights(&[
                Tensor::new(vec![2, 2], vec![1., 0., 0., 1.]).unwrap(),
                Tensor::new(vec![2], vec![0., 1.]).unwrap(),
            ])
            .unwrap();

        model
    }

    #[test]
    fn predictions_are_appended() {
        let rows = vec![
            Row::new().with("features", vec![1f32, 2.]),
            Row::new().with("features", vec![3f32, 4.]),
            Row::new().with("features", vec![5f32]),
            Row::new().with("other", vec![1f32, 1.]),
        ];

        let dataset = Dataset::from_rows(rows).repartition(NonZeroUsize::new(2).unwrap());
        let out = ModelPredictor::new(identity()).predict(dataset).unwrap();

        assert_eq!(out.num_partitions(), 2);
        let rows = out.collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("prediction"), Some(&Value::Vector(vec![1., 3.])));
        assert_eq!(rows[1].get("prediction"), Some(&Value::Vector(vec![3., 5.])));
    }
}
