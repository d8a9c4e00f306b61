use std::sync::Arc;

use machine_learning::{History, Sequential, codec, dataset::Row};
use tokio::task;

use crate::{Result, WorkerConfig, data};

/// A worker that trains an independent copy of the master model, nothing is shared.
#[derive(Clone)]
pub struct EnsembleWorker {
    master: Arc<[u8]>,
    config: WorkerConfig,
}

impl EnsembleWorker {
    /// Creates a new `EnsembleWorker`.
    ///
    /// # Arguments
    /// * `master` - The serialized master model.
    /// * `config` - The training settings, the poll interval is unused.
    pub fn new(master: Arc<[u8]>, config: WorkerConfig) -> Self {
        Self { master, config }
    }

    /// Fits one epoch of a fresh copy of the master model on `rows`.
    ///
    /// # Returns
    /// The training history and the trained model.
    pub async fn train(&self, rows: Vec<Row>) -> Result<(History, Sequential)> {
        let mut model = codec::deserialize(&self.master)?;
        let (x, y) = data::rows_to_matrices(
            &rows,
            self.config.features_col(),
            self.config.label_col(),
        )?;

        model.compile(self.config.compile());
        let batch_size = self.config.batch_size();

        let (model, history) = task::spawn_blocking(move || {
            let history = model.fit(x.view(), y.view(), 1, batch_size);
            (model, history)
        })
        .await?;

        Ok((history?, model))
    }
}
