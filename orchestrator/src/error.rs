use std::{error::Error, fmt, io};

use coordinator::CoordinatorErr;
use machine_learning::MlErr;
use tokio::task::JoinError;
use worker::WorkerErr;

/// The orchestrator's result type.
pub type Result<T> = std::result::Result<T, TrainerErr>;

/// All errors that can occur while orchestrating a training.
#[derive(Debug)]
pub enum TrainerErr {
    /// Invalid configuration, caught before anything gets started.
    InvalidConfig(String),
    /// A worker failed during its round.
    Worker { worker_id: usize, source: WorkerErr },
    /// The coordinator couldn't be started.
    Coordinator(CoordinatorErr),
    Ml(MlErr),
    Io(io::Error),
    Join(JoinError),
}

impl fmt::Display for TrainerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Worker { worker_id, source } => write!(f, "worker {worker_id} error: {source}"),
            Self::Coordinator(e) => write!(f, "coordinator error: {e}"),
            Self::Ml(e) => write!(f, "model error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Join(e) => write!(f, "partition task failed: {e}"),
        }
    }
}

impl Error for TrainerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Worker { source, .. } => Some(source),
            Self::Coordinator(e) => Some(e),
            Self::Ml(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Join(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<CoordinatorErr> for TrainerErr {
    fn from(e: CoordinatorErr) -> Self {
        Self::Coordinator(e)
    }
}

impl From<MlErr> for TrainerErr {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<io::Error> for TrainerErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<JoinError> for TrainerErr {
    fn from(e: JoinError) -> Self {
        Self::Join(e)
    }
}
