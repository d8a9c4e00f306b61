use std::sync::Arc;

use comms::CoordinatorClient;
use coordinator::CoordinatorService;
use log::{info, warn};
use machine_learning::{ModelSnapshot, Sequential};
use worker::EasgdWorker;

use crate::{Result, TrainerErr, configs::EasgdConfig, data::Dataset};

/// Trains a model with asynchronous elastic averaging SGD.
///
/// Every partition of the dataset gets its own worker, the workers train against the
/// coordinator's center variable and the final center becomes the trained model.
#[derive(Debug)]
pub struct EasgdTrainer {
    master: ModelSnapshot,
    config: EasgdConfig,
}

impl EasgdTrainer {
    /// Creates a new `EasgdTrainer`.
    ///
    /// # Arguments
    /// * `master` - The model to train, it's captured as it is now.
    /// * `config` - The run's configuration, its model section is ignored.
    ///
    /// # Returns
    /// A new `EasgdTrainer` instance.
    pub fn new(master: &Sequential, config: EasgdConfig) -> Self {
        Self {
            master: ModelSnapshot::capture(master),
            config,
        }
    }

    /// Creates a new `EasgdTrainer` building the master model from the configuration.
    pub fn from_config(config: EasgdConfig) -> Result<Self> {
        config.validate()?;
        let master = config.model.build()?;
        Ok(Self::new(&master, config))
    }

    pub fn config(&self) -> &EasgdConfig {
        &self.config
    }

    /// Runs a full training over `dataset`.
    ///
    /// The coordinator is stopped once every worker returned, whether they succeeded or not.
    ///
    /// # Returns
    /// The trained model or the first worker error, in partition order.
    pub async fn train(&self, dataset: Dataset) -> Result<Sequential> {
        self.config.validate()?;

        let num_workers = self.config.num_workers;
        let dataset = dataset.repartition(num_workers);

        let service = CoordinatorService::start(
            (self.config.host.as_str(), 0),
            &self.master,
            num_workers,
            self.config.aggregator,
        )
        .await?;

        let master: Arc<[u8]> = self.master.to_bytes()?.into();
        let client = CoordinatorClient::new(service.local_addr());
        let training = &self.config.training;
        let worker = EasgdWorker::new(master, client, training.worker_config(&training.label_col));

        info!(
            workers = num_workers.get(),
            rows = dataset.len();
            "starting easgd training"
        );

        let results = dataset
            .map_partitions_with_index(|index, rows| {
                let worker = worker.clone();
                async move { worker.train(index, rows).await }
            })
            .await;

        let center = service.stop().await;

        for (worker_id, res) in results?.into_iter().enumerate() {
            if let Err(source) = res {
                warn!(worker_id = worker_id; "worker failed: {source}");
                return Err(TrainerErr::Worker { worker_id, source });
            }
        }

        let mut model = Sequential::from_spec(self.master.spec().clone())?;
        model.set_weights(&center)?;

        info!("easgd training finished");
        Ok(model)
    }
}
