use std::io;

use crate::{
    ByteReader, Deserialize, Serialize,
    tensor::{self, Tensor},
};

type Header = u32;

const ERR: Header = 0;
const GET_CENTER_VARIABLE: Header = 1;
const UPDATE: Header = 2;
const GET_READY: Header = 3;
const CENTER_VARIABLE: Header = 4;
const ACK: Header = 5;
const READY: Header = 6;

/// The application layer message exchanged between workers and the coordinator.
///
/// Requests are sent by workers, every request is answered with exactly one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Response: the request couldn't be served.
    Err(String),
    /// Request: fetch the current center variable.
    GetCenterVariable,
    /// Request: submit a worker's gradient for the current iteration.
    Update {
        worker_id: usize,
        gradient: Vec<Tensor>,
    },
    /// Request: query the readiness flag.
    GetReady,
    /// Response: a snapshot of the center variable.
    CenterVariable(Vec<Tensor>),
    /// Response: the gradient was accepted.
    Ack,
    /// Response: the readiness flag.
    Ready(bool),
}

impl Msg {
    /// Returns a short human readable name for this message's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Err(_) => "err",
            Msg::GetCenterVariable => "get_center_variable",
            Msg::Update { .. } => "update",
            Msg::GetReady => "get_ready",
            Msg::CenterVariable(_) => "center_variable",
            Msg::Ack => "ack",
            Msg::Ready(_) => "ready",
        }
    }

    fn invalid_kind_byte<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }
}

impl Serialize for Msg {
    fn serialize(&self, buf: &mut Vec<u8>) {
        let kind = match self {
            Msg::Err(_) => ERR,
            Msg::GetCenterVariable => GET_CENTER_VARIABLE,
            Msg::Update { .. } => UPDATE,
            Msg::GetReady => GET_READY,
            Msg::CenterVariable(_) => CENTER_VARIABLE,
            Msg::Ack => ACK,
            Msg::Ready(_) => READY,
        };

        buf.extend_from_slice(&kind.to_be_bytes());

        match self {
            Msg::Err(detail) => buf.extend_from_slice(detail.as_bytes()),
            Msg::Update {
                worker_id,
                gradient,
            } => {
                buf.extend_from_slice(&(*worker_id as u64).to_be_bytes());
                tensor::write_tensors(buf, gradient);
            }
            Msg::CenterVariable(weights) => tensor::write_tensors(buf, weights),
            Msg::Ready(ready) => buf.push(*ready as u8),
            Msg::GetCenterVariable | Msg::GetReady | Msg::Ack => {}
        }
    }
}

impl Deserialize for Msg {
    fn deserialize(buf: &[u8]) -> io::Result<Self> {
        let mut reader = ByteReader::new(buf);
        let kind = reader.u32()?;

        let msg = match kind {
            ERR => {
                let detail = std::str::from_utf8(reader.rest())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                Msg::Err(detail.to_string())
            }
            GET_CENTER_VARIABLE => Msg::GetCenterVariable,
            UPDATE => {
                let worker_id = reader.u64()? as usize;
                let gradient = tensor::read_tensors(&mut reader)?;
                Msg::Update {
                    worker_id,
                    gradient,
                }
            }
            GET_READY => Msg::GetReady,
            CENTER_VARIABLE => Msg::CenterVariable(tensor::read_tensors(&mut reader)?),
            ACK => Msg::Ack,
            READY => Msg::Ready(reader.u8()? != 0),
            kind => return Self::invalid_kind_byte(kind),
        };

        if reader.remaining() != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Received {} trailing bytes after a {} message",
                    reader.remaining(),
                    msg.kind()
                ),
            ));
        }

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reencode(msg: &Msg) -> Msg {
        let mut buf = Vec::new();
        msg.serialize(&mut buf);
        Msg::deserialize(&buf).unwrap()
    }

    #[test]
    fn update_keeps_worker_id_and_gradient() {
        let gradient = vec![
            Tensor::new(vec![1, 2], vec![0.25, -0.5]).unwrap(),
            Tensor::new(vec![2], vec![1., 2.]).unwrap(),
        ];
        let msg = Msg::Update {
            worker_id: 3,
            gradient,
        };

        assert_eq!(reencode(&msg), msg);
    }

    #[test]
    fn ready_flag_both_ways() {
        assert_eq!(reencode(&Msg::Ready(true)), Msg::Ready(true));
        assert_eq!(reencode(&Msg::Ready(false)), Msg::Ready(false));
    }

    #[test]
    fn err_carries_its_detail() {
        let msg = Msg::Err("shape mismatch".into());
        assert_eq!(reencode(&msg), msg);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let buf = 99u32.to_be_bytes();
        let err = Msg::deserialize(&buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut buf = Vec::new();
        Msg::Ack.serialize(&mut buf);
        buf.push(0);

        assert!(Msg::deserialize(&buf).is_err());
    }
}
