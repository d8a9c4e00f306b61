use std::num::NonZeroUsize;

use comms::{Tensor, tensor};
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{CoordinatorErr, CoordinatorState, Result, aggregation::Aggregator};

struct Inner {
    state: CoordinatorState,
    aggregator: Box<dyn Aggregator>,
}

/// The EASGD coordinator, it owns the center variable and aggregates the workers' gradients.
///
/// A single lock guards the whole state, so the three operations are sequentially
/// consistent and readers never see a partially aggregated center.
pub struct Coordinator {
    num_workers: usize,
    inner: Mutex<Inner>,
}

impl Coordinator {
    /// Creates a new `Coordinator`.
    ///
    /// # Arguments
    /// * `center` - The initial center variable, usually the master model's weights.
    /// * `num_workers` - The amount of gradients that complete an iteration.
    /// * `aggregator` - How a complete iteration gets folded into the center.
    ///
    /// # Returns
    /// A new `Coordinator` instance.
    pub fn new<A>(center: Vec<Tensor>, num_workers: NonZeroUsize, aggregator: A) -> Self
    where
        A: Aggregator + 'static,
    {
        Self {
            num_workers: num_workers.get(),
            inner: Mutex::new(Inner {
                state: CoordinatorState::new(center),
                aggregator: Box::new(aggregator),
            }),
        }
    }

    /// Returns a copy of the current center variable.
    pub fn get_center_variable(&self) -> Vec<Tensor> {
        self.inner.lock().state.center().to_vec()
    }

    /// Records the gradient of a worker for the current iteration.
    ///
    /// A second submission of the same worker before the iteration completes replaces the
    /// first one. Once `num_workers` distinct gradients are pending they get aggregated into
    /// the center, the iteration advances and the coordinator becomes ready.
    ///
    /// # Arguments
    /// * `worker_id` - The id of the submitting worker.
    /// * `gradient` - The worker's weight delta.
    ///
    /// # Returns
    /// A `ShapeMismatch` error, leaving the state untouched, if the gradient doesn't have
    /// the center's shapes.
    pub fn submit_gradient(&self, worker_id: usize, gradient: Vec<Tensor>) -> Result<()> {
        let mut inner = self.inner.lock();
        let Inner { state, aggregator } = &mut *inner;

        tensor::check_shapes(state.center(), &gradient)
            .map_err(|source| CoordinatorErr::ShapeMismatch { worker_id, source })?;

        state.ready = false;

        if state.pending.insert(worker_id, gradient).is_some() {
            warn!(worker_id = worker_id; "replaced a pending gradient");
        }

        debug!(
            worker_id = worker_id,
            pending = state.pending_len();
            "accepted gradient"
        );

        if state.pending_len() < self.num_workers {
            return Ok(());
        }

        let pending = state.drain_pending();
        let gradients: Vec<&[Tensor]> = pending.iter().map(|(_, g)| g.as_slice()).collect();
        aggregator.aggregate(&mut state.center, &gradients);

        state.iteration += 1;
        state.ready = true;

        info!(iteration = state.iteration(); "aggregated gradients");
        Ok(())
    }

    /// Whether the last iteration got aggregated and no gradient arrived since.
    pub fn is_ready(&self) -> bool {
        self.inner.lock().state.ready()
    }

    /// The amount of completed iterations.
    pub fn iteration(&self) -> u64 {
        self.inner.lock().state.iteration()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().state.pending_len()
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Consumes the coordinator returning the center variable.
    pub fn into_center(self) -> Vec<Tensor> {
        self.inner.into_inner().state.center
    }
}
