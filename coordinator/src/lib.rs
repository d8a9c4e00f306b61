//! The coordinator of an EASGD training: it holds the center variable and folds the
//! workers' gradients into it once every worker reported.

pub mod aggregation;
mod coordinator;
mod error;
mod handle;
mod service;
mod state;

pub use coordinator::Coordinator;
pub use error::{CoordinatorErr, Result};
pub use handle::CoordinatorHandle;
pub use service::{CoordinatorService, ServiceHandle};
pub use state::CoordinatorState;
