use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use comms::ShapeErr;

/// The result type used in the entire coordinator module.
pub type Result<T> = std::result::Result<T, CoordinatorErr>;

/// The coordinator module's error type.
#[derive(Debug)]
pub enum CoordinatorErr {
    /// A submitted gradient doesn't fit the center variable.
    ShapeMismatch { worker_id: usize, source: ShapeErr },
    InvalidAggregator(String),
    Io(io::Error),
}

impl Display for CoordinatorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { worker_id, source } => {
                write!(f, "rejected the gradient of worker {worker_id}: {source}")
            }
            Self::InvalidAggregator(detail) => write!(f, "invalid aggregator: {detail}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for CoordinatorErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ShapeMismatch { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::InvalidAggregator(_) => None,
        }
    }
}

impl From<io::Error> for CoordinatorErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CoordinatorErr> for io::Error {
    fn from(value: CoordinatorErr) -> Self {
        match value {
            CoordinatorErr::Io(e) => e,
            e => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}
