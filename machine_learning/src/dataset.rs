//! The row representation of the training data.

use std::{collections::BTreeMap, slice};

use serde::{Deserialize, Serialize};

/// The value stored in a single column of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f32),
    Vector(Vec<f32>),
}

impl Value {
    /// Views the value as a vector, a scalar becomes a vector of length one.
    pub fn as_slice(&self) -> &[f32] {
        match self {
            Value::Scalar(v) => slice::from_ref(v),
            Value::Vector(v) => v,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Vector(_) => None,
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f32>> for Value {
    fn from(value: Vec<f32>) -> Self {
        Self::Vector(value)
    }
}

/// A single record, an ordered map from column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this row with `column` set to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_json() {
        let json = r#"[
            { "features": [0.5, 1.0], "label": 2 },
            { "features": [1.0, 0.0], "label": 0 }
        ]"#;
        let rows: Vec<Row> = serde_json::from_str(json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("features").unwrap().as_slice(), &[0.5, 1.0]);
        assert_eq!(rows[0].get("label").unwrap().as_scalar(), Some(2.));
        assert_eq!(rows[1].columns().collect::<Vec<_>>(), ["features", "label"]);
    }

    #[test]
    fn scalar_views_as_single_element() {
        let row = Row::new().with("y", 3f32);
        assert_eq!(row.get("y").unwrap().as_slice(), &[3.]);
        assert!(row.get("x").is_none());
    }
}
