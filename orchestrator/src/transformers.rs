//! Row transformers that derive a new column from an existing one.
//!
//! Rows whose input column is missing or malformed are dropped from the output.

use log::debug;
use machine_learning::dataset::{Row, Value};
use serde::{Deserialize, Serialize};

use crate::data::Dataset;

pub trait Transformer {
    /// Transforms a single row, `None` drops it.
    fn transform_row(&self, row: Row) -> Option<Row>;

    fn transform(&self, dataset: Dataset) -> Dataset {
        dataset.filter_map_rows(|row| self.transform_row(row))
    }
}

fn default_label_col() -> String {
    "label".into()
}

fn default_vectorized_col() -> String {
    "label_vectorized".into()
}

fn default_prediction_col() -> String {
    "prediction".into()
}

fn default_index_col() -> String {
    "predicted_index".into()
}

fn default_activation_threshold() -> f32 {
    0.55
}

/// One-hot encodes an integer label into a vector of `output_dim` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVectorTransformer {
    pub output_dim: usize,
    #[serde(default = "default_label_col")]
    pub input_col: String,
    #[serde(default = "default_vectorized_col")]
    pub output_col: String,
}

impl LabelVectorTransformer {
    /// Creates a new `LabelVectorTransformer` reading `label` into `label_vectorized`.
    pub fn new(output_dim: usize) -> Self {
        Self {
            output_dim,
            input_col: default_label_col(),
            output_col: default_vectorized_col(),
        }
    }

    pub fn with_columns(
        mut self,
        input_col: impl Into<String>,
        output_col: impl Into<String>,
    ) -> Self {
        self.input_col = input_col.into();
        self.output_col = output_col.into();
        self
    }

    fn index(&self, label: f32) -> Option<usize> {
        let valid = label >= 0. && label.fract() == 0. && (label as usize) < self.output_dim;
        valid.then_some(label as usize)
    }
}

impl Transformer for LabelVectorTransformer {
    fn transform_row(&self, mut row: Row) -> Option<Row> {
        let Some(index) = row
            .get(&self.input_col)
            .and_then(Value::as_scalar)
            .and_then(|label| self.index(label))
        else {
            debug!(column = self.input_col.as_str(); "dropping row without a valid label");
            return None;
        };

        let mut vector = vec![0.; self.output_dim];
        vector[index] = 1.;
        row.insert(self.output_col.as_str(), vector);
        Some(row)
    }
}

/// Maps an activation vector to the first index whose activation reaches a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelIndexTransformer {
    pub output_dim: usize,
    #[serde(default = "default_prediction_col")]
    pub input_col: String,
    #[serde(default = "default_index_col")]
    pub output_col: String,
    #[serde(default)]
    pub default_index: usize,
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: f32,
}

impl LabelIndexTransformer {
    /// Creates a new `LabelIndexTransformer` reading `prediction` into `predicted_index`,
    /// with a threshold of 0.55 and 0 as the fallback index.
    pub fn new(output_dim: usize) -> Self {
        Self {
            output_dim,
            input_col: default_prediction_col(),
            output_col: default_index_col(),
            default_index: 0,
            activation_threshold: default_activation_threshold(),
        }
    }

    pub fn with_columns(
        mut self,
        input_col: impl Into<String>,
        output_col: impl Into<String>,
    ) -> Self {
        self.input_col = input_col.into();
        self.output_col = output_col.into();
        self
    }

    pub fn with_default_index(mut self, default_index: usize) -> Self {
        self.default_index = default_index;
        self
    }

    pub fn with_activation_threshold(mut self, activation_threshold: f32) -> Self {
        self.activation_threshold = activation_threshold;
        self
    }

    /// Returns the index for an activation vector, `None` if it's shorter than `output_dim`.
    pub fn index(&self, activations: &[f32]) -> Option<usize> {
        let activations = activations.get(..self.output_dim)?;

        let index = activations
            .iter()
            .position(|&a| a >= self.activation_threshold)
            .unwrap_or(self.default_index);

        Some(index)
    }
}

impl Transformer for LabelIndexTransformer {
    fn transform_row(&self, mut row: Row) -> Option<Row> {
        let index = self.index(row.get(&self.input_col)?.as_slice())?;
        row.insert(self.output_col.as_str(), index as f32);
        Some(row)
    }
}
