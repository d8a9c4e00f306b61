use std::io;

use comms::{MsgReceiver, MsgSender, msg::Msg};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::CoordinatorHandle;

/// Serves the requests of a single connection until the peer closes it.
///
/// # Arguments
/// * `coordinator` - The coordinator the requests are served with.
/// * `rx` - The receiving end of the communication.
/// * `tx` - The sending end of the communication.
///
/// # Returns
/// An io error if the connection failed, a clean close is not an error.
pub(super) async fn serve_connection<R, W>(
    coordinator: CoordinatorHandle,
    mut rx: MsgReceiver<R>,
    mut tx: MsgSender<W>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let msg: Msg = match rx.recv().await {
            Ok(msg) => msg,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };

        let reply = handle_request(&coordinator, msg).await;
        tx.send(&reply).await?;
    }
}

/// Maps a request into the matching coordinator operation.
///
/// # Returns
/// The response, errors are answered with an `Err` message instead of closing the connection.
async fn handle_request(coordinator: &CoordinatorHandle, msg: Msg) -> Msg {
    match msg {
        Msg::GetCenterVariable => Msg::CenterVariable(coordinator.get_center_variable().await),
        Msg::Update {
            worker_id,
            gradient,
        } => match coordinator.submit_gradient(worker_id, gradient).await {
            Ok(()) => Msg::Ack,
            Err(e) => {
                warn!(worker_id = worker_id; "{e}");
                Msg::Err(e.to_string())
            }
        },
        Msg::GetReady => Msg::Ready(coordinator.is_ready().await),
        msg => {
            debug!("received an unexpected message kind {}", msg.kind());
            Msg::Err(format!("unexpected message kind: {}", msg.kind()))
        }
    }
}
