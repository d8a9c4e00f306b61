use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{ByteReader, CONTENT_TYPE, Deserialize, LEN_TYPE_SIZE, LenType};

/// Frames bigger than this are refused before allocating for them.
const MAX_FRAME_LEN: usize = 1 << 31;

/// The receiving end handle of the communication.
pub struct MsgReceiver<R: AsyncRead + Unpin> {
    rx: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> MsgReceiver<R> {
    /// Creates a new `MsgReceiver` instance.
    ///
    /// # Arguments
    /// * `rx` - The underlying reader.
    pub(super) fn new(rx: R) -> Self {
        Self {
            rx,
            buf: Vec::new(),
        }
    }

    /// Waits to receive a new message from the inner receiver.
    ///
    /// # Returns
    /// A result object that returns `T` on success or `io::Error` on failure, an
    /// `UnexpectedEof` error means the peer closed the connection.
    pub async fn recv<T: Deserialize>(&mut self) -> io::Result<T> {
        let mut size_buf = [0; LEN_TYPE_SIZE];
        self.rx.read_exact(&mut size_buf).await?;
        let len = LenType::from_be_bytes(size_buf) as usize;

        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Received a frame of {len} bytes, the maximum is {MAX_FRAME_LEN}"),
            ));
        }

        self.buf.resize(len, 0);
        self.rx.read_exact(&mut self.buf).await?;

        let body = strip_content_type(&self.buf)?;
        T::deserialize(body)
    }
}

/// Checks the content-type marker at the start of a frame.
///
/// # Arguments
/// * `frame` - The frame without its length prefix.
///
/// # Returns
/// The rest of the frame or an `InvalidData` error if the marker doesn't match.
fn strip_content_type(frame: &[u8]) -> io::Result<&[u8]> {
    let mut reader = ByteReader::new(frame);
    let marker_len = reader.u8()? as usize;
    let marker = reader.take(marker_len)?;

    if marker != CONTENT_TYPE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Received an invalid content type {:?}",
                String::from_utf8_lossy(marker)
            ),
        ));
    }

    Ok(reader.rest())
}
