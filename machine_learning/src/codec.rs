//! Conversion between models and opaque byte blobs.
//!
//! A blob is the length of the architecture (`u32` big endian), the architecture as JSON and
//! then the weights in the same tensor layout used on the wire.

use std::io;

use comms::{
    ByteReader, Tensor,
    specs::machine_learning::ModelSpec,
    tensor::{read_tensors, write_tensors},
};

use crate::{Result, Sequential};

/// An immutable capture of a model's architecture and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    spec: ModelSpec,
    weights: Vec<Tensor>,
}

impl ModelSnapshot {
    /// Captures the current architecture and weights of `model`.
    pub fn capture(model: &Sequential) -> Self {
        Self {
            spec: model.spec().clone(),
            weights: model.get_weights(),
        }
    }

    /// Builds a new model from the snapshot, it isn't compiled.
    pub fn restore(&self) -> Result<Sequential> {
        let mut model = Sequential::from_spec(self.spec.clone())?;
        model.set_weights(&self.weights)?;
        Ok(model)
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn weights(&self) -> &[Tensor] {
        &self.weights
    }

    /// Encodes the snapshot as a blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let arch = serde_json::to_vec(&self.spec)?;
        let arch_len = u32::try_from(arch.len()).map_err(io::Error::other)?;

        let mut buf = Vec::with_capacity(arch.len() + 4);
        buf.extend_from_slice(&arch_len.to_be_bytes());
        buf.extend_from_slice(&arch);
        write_tensors(&mut buf, &self.weights);

        Ok(buf)
    }

    /// Decodes a blob made by `to_bytes`.
    ///
    /// # Returns
    /// The snapshot or a `Codec` error if the blob is malformed.
    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(blob);

        let arch_len = reader.u32()? as usize;
        let spec = serde_json::from_slice(reader.take(arch_len)?)?;
        let weights = read_tensors(&mut reader)?;

        if reader.remaining() != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Found {} trailing bytes in a model blob", reader.remaining()),
            )
            .into());
        }

        Ok(Self { spec, weights })
    }
}

/// Serializes a model into a blob holding its architecture and weights.
pub fn serialize(model: &Sequential) -> Result<Vec<u8>> {
    ModelSnapshot::capture(model).to_bytes()
}

/// Rebuilds a model from a blob made by `serialize`.
pub fn deserialize(blob: &[u8]) -> Result<Sequential> {
    ModelSnapshot::from_bytes(blob)?.restore()
}
