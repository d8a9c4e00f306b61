//! The flat tensor type shared by the coordinator, the workers and the model codec.

use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use crate::ByteReader;

/// Error returned whenever two tensors, or two lists of tensors, aren't shape compatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeErr {
    /// The data length doesn't match the product of the shape.
    Len { shape: Vec<usize>, got: usize },
    /// Two tensors have different shapes.
    Shape { expected: Vec<usize>, got: Vec<usize> },
    /// Two weight sets have a different amount of tensors.
    Count { expected: usize, got: usize },
}

impl Display for ShapeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Len { shape, got } => {
                write!(f, "a tensor of shape {shape:?} can't hold {got} elements")
            }
            Self::Shape { expected, got } => {
                write!(f, "tensor shape mismatch, got {got:?} and expected {expected:?}")
            }
            Self::Count { expected, got } => {
                write!(f, "tensor count mismatch, got {got} and expected {expected}")
            }
        }
    }
}

impl Error for ShapeErr {}

impl From<ShapeErr> for io::Error {
    fn from(value: ShapeErr) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value)
    }
}

/// A dense row-major tensor of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new `Tensor`.
    ///
    /// # Arguments
    /// * `shape` - The dimensions of the tensor.
    /// * `data` - The row-major elements.
    ///
    /// # Returns
    /// A new tensor or a `ShapeErr` if `data` doesn't fit `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, ShapeErr> {
        if shape.iter().product::<usize>() != data.len() {
            return Err(ShapeErr::Len {
                shape,
                got: data.len(),
            });
        }

        Ok(Self { shape, data })
    }

    /// Creates a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![0.; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks that `other` has the same shape as `self`.
    ///
    /// # Returns
    /// A `ShapeErr::Shape` if the shapes differ.
    pub fn check_shape(&self, other: &Tensor) -> Result<(), ShapeErr> {
        if self.shape != other.shape {
            return Err(ShapeErr::Shape {
                expected: self.shape.clone(),
                got: other.shape.clone(),
            });
        }

        Ok(())
    }

    /// Computes `self - other` elementwise.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor, ShapeErr> {
        self.check_shape(other)?;

        let data = self.data.iter().zip(&other.data).map(|(a, b)| a - b).collect();
        Ok(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Computes `self += alpha * other` elementwise.
    pub fn scaled_add(&mut self, alpha: f32, other: &Tensor) -> Result<(), ShapeErr> {
        self.check_shape(other)?;

        self.data
            .iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a += alpha * b);

        Ok(())
    }

    /// Computes `self += other` elementwise.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<(), ShapeErr> {
        self.scaled_add(1., other)
    }
}

/// Checks that both weight sets have the same amount of tensors and the same shapes.
///
/// # Arguments
/// * `expected` - The reference weight set.
/// * `got` - The weight set to check.
///
/// # Returns
/// The first mismatch found as a `ShapeErr`.
pub fn check_shapes(expected: &[Tensor], got: &[Tensor]) -> Result<(), ShapeErr> {
    if expected.len() != got.len() {
        return Err(ShapeErr::Count {
            expected: expected.len(),
            got: got.len(),
        });
    }

    expected
        .iter()
        .zip(got)
        .try_for_each(|(e, g)| e.check_shape(g))
}

/// Computes the per-tensor difference `after - before` between two weight sets.
///
/// # Returns
/// The delta or a `ShapeErr` if the weight sets aren't compatible.
pub fn weight_delta(after: &[Tensor], before: &[Tensor]) -> Result<Vec<Tensor>, ShapeErr> {
    check_shapes(before, after)?;
    after.iter().zip(before).map(|(a, b)| a.sub(b)).collect()
}

/// Appends a list of tensors to `buf`.
///
/// The layout is the tensor count, then per tensor its rank, its dimensions and its
/// elements. Integers are big endian, the elements are written as they are in memory.
pub fn write_tensors(buf: &mut Vec<u8>, tensors: &[Tensor]) {
    buf.extend_from_slice(&(tensors.len() as u32).to_be_bytes());

    for tensor in tensors {
        buf.extend_from_slice(&(tensor.shape.len() as u32).to_be_bytes());

        for &dim in &tensor.shape {
            buf.extend_from_slice(&(dim as u64).to_be_bytes());
        }

        buf.extend_from_slice(bytemuck::cast_slice(&tensor.data));
    }
}

/// Reads a list of tensors written by `write_tensors`.
///
/// # Returns
/// The tensors or an `InvalidData` error if the buffer is truncated or malformed.
pub fn read_tensors(reader: &mut ByteReader<'_>) -> io::Result<Vec<Tensor>> {
    let count = reader.u32()? as usize;
    let mut tensors = Vec::with_capacity(count.min(reader.remaining()));

    for _ in 0..count {
        let rank = reader.u32()? as usize;
        let mut shape = Vec::with_capacity(rank.min(reader.remaining()));

        for _ in 0..rank {
            shape.push(reader.u64()? as usize);
        }

        let len = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .and_then(|len| len.checked_mul(size_of::<f32>()))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("The tensor shape {shape:?} overflows"),
                )
            })?;

        let bytes = reader.take(len)?;
        let mut data = vec![0f32; len / size_of::<f32>()];
        bytemuck::cast_slice_mut(&mut data).copy_from_slice(bytes);

        tensors.push(Tensor::new(shape, data)?);
    }

    Ok(tensors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(shape: &[usize], data: &[f32]) -> Tensor {
        Tensor::new(shape.to_vec(), data.to_vec()).unwrap()
    }

    #[test]
    fn new_rejects_wrong_len() {
        let err = Tensor::new(vec![2, 2], vec![1.; 3]).unwrap_err();
        assert_eq!(
            err,
            ShapeErr::Len {
                shape: vec![2, 2],
                got: 3
            }
        );
    }

    #[test]
    fn delta_is_after_minus_before() {
        let before = [tensor(&[2], &[1., 2.]), tensor(&[1], &[0.5])];
        let after = [tensor(&[2], &[3., 1.]), tensor(&[1], &[1.5])];

        let delta = weight_delta(&after, &before).unwrap();
        assert_eq!(delta[0].data(), &[2., -1.]);
        assert_eq!(delta[1].data(), &[1.]);
    }

    #[test]
    fn delta_rejects_shape_mismatch() {
        let before = [tensor(&[2], &[1., 2.])];
        let after = [tensor(&[1, 2], &[3., 1.])];

        assert!(matches!(
            weight_delta(&after, &before),
            Err(ShapeErr::Shape { .. })
        ));
    }

    #[test]
    fn check_shapes_rejects_count_mismatch() {
        let a = [tensor(&[1], &[1.])];
        assert_eq!(
            check_shapes(&a, &[]),
            Err(ShapeErr::Count {
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn scaled_add_accumulates() {
        let mut acc = Tensor::zeros(vec![3]);
        acc.scaled_add(0.5, &tensor(&[3], &[2., 4., 6.])).unwrap();
        acc.add_assign(&tensor(&[3], &[1., 1., 1.])).unwrap();
        assert_eq!(acc.data(), &[2., 3., 4.]);
    }

    #[test]
    fn tensors_survive_the_byte_layout() {
        let tensors = vec![
            tensor(&[2, 3], &[1., 2., 3., 4., 5., 6.]),
            tensor(&[3], &[-1., 0., 1.]),
            Tensor::zeros(vec![0]),
        ];

        let mut buf = Vec::new();
        write_tensors(&mut buf, &tensors);

        let mut reader = ByteReader::new(&buf);
        assert_eq!(read_tensors(&mut reader).unwrap(), tensors);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_tensor_is_invalid_data() {
        let mut buf = Vec::new();
        write_tensors(&mut buf, &[tensor(&[4], &[1., 2., 3., 4.])]);
        buf.truncate(buf.len() - 2);

        let err = read_tensors(&mut ByteReader::new(&buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
