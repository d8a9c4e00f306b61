use std::{io, net::SocketAddr, num::NonZeroUsize};

use comms::specs::coordinator::AggregatorSpec;
use log::{debug, info, warn};
use machine_learning::ModelSnapshot;
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    task::JoinSet,
};

use super::{ServiceHandle, connection::serve_connection};
use crate::{Coordinator, CoordinatorHandle, Result, aggregation::AggregatorBuilder};

/// Exposes a coordinator over TCP, every accepted connection is served on its own task.
pub struct CoordinatorService {
    listener: TcpListener,
    coordinator: CoordinatorHandle,
}

impl CoordinatorService {
    /// Binds a new `CoordinatorService`.
    ///
    /// # Arguments
    /// * `addr` - The address to listen at, port 0 picks any free port.
    /// * `coordinator` - The coordinator the requests are served with.
    ///
    /// # Returns
    /// The service or an io error if the address couldn't be bound.
    pub async fn bind<A>(addr: A, coordinator: CoordinatorHandle) -> io::Result<Self>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;

        Ok(Self {
            listener,
            coordinator,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    /// Accepts and serves connections forever.
    ///
    /// Dropping the returned future aborts every connection task with it.
    ///
    /// # Returns
    /// An io error if accepting a new connection fails.
    pub async fn serve(self) -> io::Result<()> {
        let Self {
            listener,
            coordinator,
        } = self;

        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    debug!("accepted connection from {peer}");

                    let (rx, tx) = stream.into_split();
                    let (rx, tx) = comms::channel(rx, tx);
                    tasks.spawn(serve_connection(coordinator.clone(), rx, tx));
                }
                Some(res) = tasks.join_next() => match res {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("connection failed: {e}"),
                    Err(e) => warn!("connection task failed: {e}"),
                },
            }
        }
    }

    /// Starts a coordinator in the background.
    ///
    /// # Arguments
    /// * `addr` - The address to listen at.
    /// * `snapshot` - The master model, its weights become the initial center variable.
    /// * `num_workers` - The amount of gradients that complete an iteration.
    /// * `aggregator` - The aggregation applied at the end of every iteration.
    ///
    /// # Returns
    /// A handle to the running service or an error if it couldn't be started.
    pub async fn start<A: ToSocketAddrs>(
        addr: A,
        snapshot: &ModelSnapshot,
        num_workers: NonZeroUsize,
        aggregator: AggregatorSpec,
    ) -> Result<ServiceHandle> {
        let aggregator = AggregatorBuilder::new().build(aggregator)?;
        let center = snapshot.weights().to_vec();
        let coordinator =
            CoordinatorHandle::new(Coordinator::new(center, num_workers, aggregator));

        let service = Self::bind(addr, coordinator.clone()).await?;
        let local_addr = service.local_addr()?;

        info!(workers = num_workers.get(); "coordinator listening at {local_addr}");

        let task = tokio::spawn(service.serve());
        Ok(ServiceHandle::new(local_addr, coordinator, task))
    }
}
