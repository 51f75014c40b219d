// Export the modules to be visible outside of the dataflow module.
pub mod control;
pub mod operator;
pub mod window;

// Re-export structs as if they were defined here.
pub use control::{ControlMarker, ControlSink, ProtocolError};
pub use operator::{Operator, OperatorConfig};
pub use window::WindowId;
