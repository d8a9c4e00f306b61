pub mod arch;
pub mod codec;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod training;

pub use arch::{ModelBuilder, Sequential};
pub use codec::ModelSnapshot;
pub use error::{MlErr, Result};
pub use training::History;
