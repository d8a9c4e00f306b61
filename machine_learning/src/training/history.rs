use serde::{Deserialize, Serialize};

/// The per epoch record of a `fit` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub loss: Vec<f32>,
    /// Empty unless the model was compiled with the accuracy metric.
    pub accuracy: Vec<f32>,
}

impl History {
    pub fn epochs(&self) -> usize {
        self.loss.len()
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.loss.last().copied()
    }
}
