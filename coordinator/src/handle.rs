use std::{ops::Deref, sync::Arc};

use comms::Tensor;
use tokio::task;

use crate::{Coordinator, Result};

/// The actual interface to interact with a `Coordinator` from async code.
///
/// It bridges the async runtime with the blocking implementation of the `Coordinator`, the
/// lock is only ever taken inside `block_in_place`. Requires a multi-threaded runtime.
#[derive(Clone)]
pub struct CoordinatorHandle(Arc<Coordinator>);

impl Deref for CoordinatorHandle {
    type Target = Coordinator;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CoordinatorHandle {
    /// Creates a new `CoordinatorHandle`.
    ///
    /// # Arguments
    /// * `coordinator` - The underlying coordinator.
    ///
    /// # Returns
    /// A new `CoordinatorHandle` instance.
    pub fn new(coordinator: Coordinator) -> Self {
        Self(Arc::new(coordinator))
    }

    /// Async call to the synchronous implementation of `Coordinator::get_center_variable`.
    pub async fn get_center_variable(&self) -> Vec<Tensor> {
        task::block_in_place(|| self.0.get_center_variable())
    }

    /// Async call to the synchronous implementation of `Coordinator::submit_gradient`.
    ///
    /// # Arguments
    /// * `worker_id` - The id of the submitting worker.
    /// * `gradient` - The worker's weight delta.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if the gradient doesn't fit the center variable.
    pub async fn submit_gradient(&self, worker_id: usize, gradient: Vec<Tensor>) -> Result<()> {
        task::block_in_place(|| self.0.submit_gradient(worker_id, gradient))
    }

    /// Async call to the synchronous implementation of `Coordinator::is_ready`.
    pub async fn is_ready(&self) -> bool {
        task::block_in_place(|| self.0.is_ready())
    }
}
