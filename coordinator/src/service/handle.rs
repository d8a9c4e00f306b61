use std::{io, net::SocketAddr};

use comms::Tensor;
use log::info;
use tokio::task::JoinHandle;

use crate::CoordinatorHandle;

/// A running `CoordinatorService`.
pub struct ServiceHandle {
    local_addr: SocketAddr,
    coordinator: CoordinatorHandle,
    task: JoinHandle<io::Result<()>>,
}

impl ServiceHandle {
    pub(super) fn new(
        local_addr: SocketAddr,
        coordinator: CoordinatorHandle,
        task: JoinHandle<io::Result<()>>,
    ) -> Self {
        Self {
            local_addr,
            coordinator,
            task,
        }
    }

    /// The address the service is listening at.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    /// Stops the service, in-flight requests are aborted and nothing gets drained.
    ///
    /// # Returns
    /// The final center variable.
    pub async fn stop(self) -> Vec<Tensor> {
        self.task.abort();

        match self.task.await {
            Ok(Err(e)) => info!("coordinator had stopped on its own: {e}"),
            Ok(Ok(())) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => info!("coordinator task failed: {e}"),
        }

        info!(iteration = self.coordinator.iteration(); "coordinator stopped");
        self.coordinator.get_center_variable().await
    }
}
