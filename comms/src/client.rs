use std::{io, net::SocketAddr};

use tokio::net::TcpStream;

use crate::{msg::Msg, tensor::Tensor};

/// The worker side of the coordinator protocol.
///
/// Every call opens a fresh connection, performs a single request/response exchange
/// and closes it. Failures are never retried, they are returned to the caller.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorClient {
    addr: SocketAddr,
}

impl CoordinatorClient {
    /// Creates a new `CoordinatorClient`.
    ///
    /// # Arguments
    /// * `addr` - The network address of the coordinator.
    ///
    /// # Returns
    /// A new `CoordinatorClient` instance.
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Fetches the current center variable.
    ///
    /// # Returns
    /// A consistent snapshot of the coordinator's weights or an io error.
    pub async fn fetch_center_variable(&self) -> io::Result<Vec<Tensor>> {
        match self.request(&Msg::GetCenterVariable).await? {
            Msg::CenterVariable(weights) => Ok(weights),
            msg => Self::unexpected_message_kind(msg),
        }
    }

    /// Submits this worker's gradient for the current iteration.
    ///
    /// # Arguments
    /// * `worker_id` - The identifier of the worker, its partition index.
    /// * `gradient` - The weight delta computed by the worker.
    ///
    /// # Returns
    /// An io error if the coordinator couldn't be reached or refused the gradient.
    pub async fn send_gradient(&self, worker_id: usize, gradient: Vec<Tensor>) -> io::Result<()> {
        let msg = Msg::Update {
            worker_id,
            gradient,
        };

        match self.request(&msg).await? {
            Msg::Ack => Ok(()),
            msg => Self::unexpected_message_kind(msg),
        }
    }

    /// Queries the coordinator's readiness flag.
    pub async fn is_ready(&self) -> io::Result<bool> {
        match self.request(&Msg::GetReady).await? {
            Msg::Ready(ready) => Ok(ready),
            msg => Self::unexpected_message_kind(msg),
        }
    }

    /// Sends `msg` over a new connection and waits for its response.
    ///
    /// # Returns
    /// The response or an io error, an `Err` response is turned into an io error.
    async fn request(&self, msg: &Msg) -> io::Result<Msg> {
        let stream = TcpStream::connect(self.addr).await?;
        let (rx, tx) = stream.into_split();
        let (mut rx, mut tx) = crate::channel(rx, tx);

        tx.send(msg).await?;

        match rx.recv().await? {
            Msg::Err(detail) => Err(io::Error::other(detail)),
            msg => Ok(msg),
        }
    }

    /// Creates an error for when an unexpected message kind is received.
    ///
    /// # Arguments
    /// * `msg` - The received message.
    ///
    /// # Returns
    /// An error.
    fn unexpected_message_kind<U>(msg: Msg) -> io::Result<U> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an unexpected message kind, got: {}", msg.kind()),
        ))
    }
}
