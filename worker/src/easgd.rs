use std::sync::Arc;

use comms::{CoordinatorClient, Tensor, tensor};
use log::{debug, info, warn};
use machine_learning::{MlErr, Sequential, codec, dataset::Row};
use ndarray::Array2;
use tokio::{task, time};

use crate::{Result, WorkerConfig, data};

/// A worker of an EASGD training: one call to `train` is one participation round.
#[derive(Clone)]
pub struct EasgdWorker {
    master: Arc<[u8]>,
    client: CoordinatorClient,
    config: WorkerConfig,
}

impl EasgdWorker {
    /// Creates a new `EasgdWorker`.
    ///
    /// # Arguments
    /// * `master` - The serialized master model, see `machine_learning::codec`.
    /// * `client` - The client of the coordinator this worker reports to.
    /// * `config` - The training settings.
    ///
    /// # Returns
    /// A new `EasgdWorker` instance.
    pub fn new(master: Arc<[u8]>, client: CoordinatorClient, config: WorkerConfig) -> Self {
        Self {
            master,
            client,
            config,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Trains the master model on a partition and reports the resulting weight delta.
    ///
    /// Fetches the center variable, fits one epoch starting from it, submits the difference
    /// between the trained and the fetched weights and then waits until the coordinator is
    /// ready again. Errors are never retried.
    ///
    /// # Arguments
    /// * `partition_index` - The index of the partition, used as the worker's id.
    /// * `rows` - The rows of the partition.
    ///
    /// # Returns
    /// An empty vec once the coordinator aggregated the round, or the first error found.
    pub async fn train(&self, partition_index: usize, rows: Vec<Row>) -> Result<Vec<()>> {
        let worker_id = partition_index;
        let mut model = codec::deserialize(&self.master)?;

        let (x, y) = data::rows_to_matrices(
            &rows,
            self.config.features_col(),
            self.config.label_col(),
        )?;
        drop(rows);

        let center = self.client.fetch_center_variable().await?;
        model.set_weights(&center)?;
        model.compile(self.config.compile());

        debug!(worker_id = worker_id, rows = x.nrows(); "fetched the center variable");

        let gradient = if x.nrows() == 0 {
            warn!(worker_id = worker_id; "empty partition, submitting a zero gradient");
            center.iter().map(|t| Tensor::zeros(t.shape().to_vec())).collect()
        } else {
            let model = self.fit(model, x, y).await?;
            tensor::weight_delta(&model.get_weights(), &center).map_err(MlErr::from)?
        };

        self.client.send_gradient(worker_id, gradient).await?;
        debug!(worker_id = worker_id; "gradient submitted");

        let mut polls = 1;
        while !self.client.is_ready().await? {
            time::sleep(self.config.poll_interval()).await;
            polls += 1;
        }

        info!(worker_id = worker_id, polls = polls; "round finished");
        Ok(Vec::new())
    }

    /// Fits a single epoch on the blocking pool.
    async fn fit(
        &self,
        mut model: Sequential,
        x: Array2<f32>,
        y: Array2<f32>,
    ) -> Result<Sequential> {
        let batch_size = self.config.batch_size();

        let (model, history) = task::spawn_blocking(move || {
            let history = model.fit(x.view(), y.view(), 1, batch_size);
            (model, history)
        })
        .await?;

        let history = history?;
        debug!(loss = history.last_loss().unwrap_or_default(); "epoch fitted");
        Ok(model)
    }
}
