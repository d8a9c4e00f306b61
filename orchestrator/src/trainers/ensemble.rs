use std::sync::Arc;

use comms::Tensor;
use log::info;
use machine_learning::{History, MlErr, ModelSnapshot, Sequential};
use worker::EnsembleWorker;

use crate::{
    Result, TrainerErr, configs::EnsembleConfig, data::Dataset, transformers::Transformer,
};

/// The outcome of an ensemble training.
#[derive(Debug)]
pub struct EnsembleOutput {
    /// One trained model per partition, in partition order.
    pub models: Vec<(History, Sequential)>,
    /// The mean of every model, only when merging was requested.
    pub merged: Option<Sequential>,
}

/// Trains independent copies of a model, one per partition.
#[derive(Debug)]
pub struct EnsembleTrainer {
    master: ModelSnapshot,
    config: EnsembleConfig,
}

impl EnsembleTrainer {
    pub fn new(master: &Sequential, config: EnsembleConfig) -> Self {
        Self {
            master: ModelSnapshot::capture(master),
            config,
        }
    }

    pub fn from_config(config: EnsembleConfig) -> Result<Self> {
        config.validate()?;
        let master = config.model.build()?;
        Ok(Self::new(&master, config))
    }

    /// Trains `num_models` models over disjoint partitions of `dataset`.
    ///
    /// The label transformer, if any, is applied to the whole dataset first.
    pub async fn train(&self, dataset: Dataset) -> Result<EnsembleOutput> {
        self.config.validate()?;

        let dataset = match &self.config.label_transformer {
            Some(transformer) => transformer.transform(dataset),
            None => dataset,
        };
        let dataset = dataset.repartition(self.config.num_models);

        let master: Arc<[u8]> = self.master.to_bytes()?.into();
        let worker_config = self.config.training.worker_config(self.config.label_col());
        let worker = EnsembleWorker::new(master, worker_config);

        let results = dataset
            .map_partitions(|rows| {
                let worker = worker.clone();
                async move { worker.train(rows).await }
            })
            .await?;

        let models = results
            .into_iter()
            .enumerate()
            .map(|(worker_id, res)| res.map_err(|source| TrainerErr::Worker { worker_id, source }))
            .collect::<Result<Vec<_>>>()?;

        let merged = if self.config.merge_models {
            let models: Vec<_> = models.iter().map(|(_, model)| model).collect();
            Some(merge_models(&models)?)
        } else {
            None
        };

        info!(models = models.len(), merged = merged.is_some(); "ensemble training finished");
        Ok(EnsembleOutput { models, merged })
    }
}

/// Merges models sharing an architecture into the elementwise mean of their weights.
///
/// # Returns
/// The merged model, or an error if there are no models or their shapes differ.
pub fn merge_models(models: &[&Sequential]) -> Result<Sequential> {
    let Some(first) = models.first() else {
        return Err(TrainerErr::InvalidConfig("no models to merge".into()));
    };

    let scale = 1. / models.len() as f32;
    let mut mean: Vec<Tensor> = first
        .get_weights()
        .iter()
        .map(|t| Tensor::zeros(t.shape().to_vec()))
        .collect();

    for model in models {
        for (acc, weights) in mean.iter_mut().zip(model.get_weights()) {
            acc.scaled_add(scale, &weights).map_err(MlErr::from)?;
        }
    }

    let mut merged = Sequential::from_spec(first.spec().clone())?;
    merged.set_weights(&mean)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use comms::specs::machine_learning::{LayerSpec, ModelSpec};

    use super::*;

    fn model(value: f32) -> Sequential {
        let mut model = Sequential::from_spec(ModelSpec::Sequential {
            layers: vec![LayerSpec::Dense {
                dim: (1, 2),
                act_fn: None,
            }],
        })
        .unwrap();

        let weights: Vec<_> = model
            .get_weights()
            .iter()
            .map(|t| Tensor::new(t.shape().to_vec(), vec![value; t.len()]).unwrap())
            .collect();
        model.set_weights(&weights).unwrap();
        model
    }

    #[test]
    fn merge_is_the_mean() {
        let (a, b) = (model(1.), model(3.));
        let merged = merge_models(&[&a, &b]).unwrap();

        for tensor in merged.get_weights() {
            assert!(tensor.data().iter().all(|&w| w == 2.));
        }
    }

    #[test]
    fn merging_nothing_is_invalid() {
        assert!(matches!(merge_models(&[]), Err(TrainerErr::InvalidConfig(_))));
    }
}
