//! The implementation of the sending end of the application layer protocol.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{CONTENT_TYPE, LEN_TYPE_SIZE, LenType, Serialize};

/// The sending end handle of the communication.
pub struct MsgSender<W>
where
    W: AsyncWrite + Unpin,
{
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> MsgSender<W> {
    /// Creates a new `MsgSender` instance.
    ///
    /// # Arguments
    /// * `tx` - The underlying writer.
    pub(super) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Sends `msg` through the inner sender.
    ///
    /// The frame is laid out as the length of the rest of the frame, the content-type
    /// marker and finally the serialized message.
    ///
    /// # Arguments
    /// * `msg` - A serializable object.
    ///
    /// # Returns
    /// A result object that returns `io::Error` on failure.
    pub async fn send<T: Serialize>(&mut self, msg: &T) -> io::Result<()> {
        let Self { buf, tx } = self;

        buf.clear();
        buf.resize(LEN_TYPE_SIZE, 0);
        buf.push(CONTENT_TYPE.len() as u8);
        buf.extend_from_slice(CONTENT_TYPE);
        msg.serialize(buf);

        let len = (buf.len() - LEN_TYPE_SIZE) as LenType;
        buf[..LEN_TYPE_SIZE].copy_from_slice(&len.to_be_bytes());

        tx.write_all(buf).await?;
        tx.flush().await
    }
}
