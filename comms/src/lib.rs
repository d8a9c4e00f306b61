mod client;
mod deserialize;
pub mod msg;
mod reader;
mod receiver;
mod sender;
mod serialize;
pub mod specs;
pub mod tensor;

use tokio::io::{AsyncRead, AsyncWrite};

pub use client::CoordinatorClient;
pub use deserialize::Deserialize;
pub use reader::ByteReader;
pub use receiver::MsgReceiver;
pub use sender::MsgSender;
pub use serialize::Serialize;
pub use tensor::{ShapeErr, Tensor};

type LenType = u64;
const LEN_TYPE_SIZE: usize = size_of::<LenType>();

/// The content-type marker carried by every frame, peers that don't
/// speak this protocol are rejected on the first frame.
pub const CONTENT_TYPE: &[u8] = b"application/dist-easgd";

/// Creates both `MsgReceiver` and `MsgSender` network channel parts.
///
/// Given a writer and reader creates and returns both ends of the communication.
///
/// # Arguments
/// * `rx` - An async readable.
/// * `tx` - An async writable.
///
/// # Returns
/// A communication stream in the form of a receiver and sender.
pub fn channel<R, W>(rx: R, tx: W) -> (MsgReceiver<R>, MsgSender<W>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    (MsgReceiver::new(rx), MsgSender::new(tx))
}
