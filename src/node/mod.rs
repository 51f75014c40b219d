// Public submodules
pub mod checkpoint;
pub mod dispatcher;
pub mod port;

// Public exports
pub use checkpoint::CheckpointCoordinator;
pub use dispatcher::{ControlDispatcher, QueryError};
pub use port::{DeferredConnection, InputPort, PortRegistry};
