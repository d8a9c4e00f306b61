use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use comms::ShapeErr;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    ShapeMismatch(ShapeErr),
    InvalidParamGen(String),
    NotCompiled,
    EmptyDataset,
    Codec(io::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::ShapeMismatch(e) => write!(f, "The weights don't fit the model: {e}"),
            MlErr::InvalidParamGen(detail) => {
                write!(f, "Invalid parameter generator: {detail}")
            }
            MlErr::NotCompiled => write!(f, "The model must be compiled before fitting it"),
            MlErr::EmptyDataset => write!(f, "Tried to fit the model on an empty dataset"),
            MlErr::Codec(e) => write!(f, "Failed to decode the model: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::ShapeMismatch(e) => Some(e),
            MlErr::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeErr> for MlErr {
    fn from(value: ShapeErr) -> Self {
        Self::ShapeMismatch(value)
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Codec(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value.into())
    }
}

impl From<rand_distr::uniform::Error> for MlErr {
    fn from(value: rand_distr::uniform::Error) -> Self {
        Self::InvalidParamGen(value.to_string())
    }
}
