mod connection;
mod handle;
mod server;

pub use handle::ServiceHandle;
pub use server::CoordinatorService;
