use std::num::NonZeroUsize;

use comms::specs::machine_learning::MetricSpec;
use log::debug;
use ndarray::{ArrayView2, Axis};

use super::{History, metrics};
use crate::{MlErr, Result, Sequential, arch::loss::LossFn, optimization::Optimizer};

/// What a model gets compiled with: the components needed for fitting it.
pub struct Trainer {
    loss_fn: Box<dyn LossFn>,
    optimizer: Box<dyn Optimizer>,
    metrics: Vec<MetricSpec>,
}

impl Trainer {
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `loss_fn` - Measures the difference between a model's output and the expected one.
    /// * `optimizer` - The optimizer that dictates how to update the weights on each batch.
    /// * `metrics` - The metrics recorded per epoch.
    pub fn new(
        loss_fn: Box<dyn LossFn>,
        optimizer: Box<dyn Optimizer>,
        metrics: Vec<MetricSpec>,
    ) -> Self {
        Self {
            loss_fn,
            optimizer,
            metrics,
        }
    }

    /// Performs `epochs` passes over `x` and `y` in order, updating `model` after every batch.
    ///
    /// The epoch loss is the mean of the batch losses weighted by their size.
    pub fn fit(
        &mut self,
        model: &mut Sequential,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        epochs: usize,
        batch_size: NonZeroUsize,
    ) -> Result<History> {
        self.check_data(model, x, y)?;

        let track_accuracy = self.metrics.contains(&MetricSpec::Accuracy);
        let nrows = x.nrows() as f32;
        let mut history = History::default();

        for epoch in 0..epochs {
            let mut total_loss = 0.;
            let mut hits = 0;

            let batches = x
                .axis_chunks_iter(Axis(0), batch_size.get())
                .zip(y.axis_chunks_iter(Axis(0), batch_size.get()));

            for (x, y) in batches {
                let (loss, y_pred) =
                    model.backprop(self.loss_fn.as_ref(), self.optimizer.as_mut(), x, y)?;

                total_loss += loss * x.nrows() as f32;

                if track_accuracy {
                    hits += metrics::correct(y_pred.view(), y);
                }
            }

            let loss = total_loss / nrows;
            debug!(epoch = epoch, loss = loss; "finished epoch");

            history.loss.push(loss);
            if track_accuracy {
                history.accuracy.push(hits as f32 / nrows);
            }
        }

        Ok(history)
    }

    fn check_data(&self, model: &Sequential, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(MlErr::EmptyDataset);
        }

        let checks = [
            ("labels", y.nrows(), x.nrows()),
            ("features", x.ncols(), model.input_dim()),
            ("labels", y.ncols(), model.output_dim()),
        ];

        for (what, got, expected) in checks {
            if got != expected {
                return Err(MlErr::SizeMismatch {
                    what,
                    got,
                    expected,
                });
            }
        }

        Ok(())
    }
}
