//! Millrace is the execution-time control-protocol core of a streaming
//! dataflow engine's operator node.
//!
//! A running dataflow application is a directed graph of operators connected
//! by streams. Between the payload tuples, every stream carries *control
//! markers*: window boundaries, checkpoint barriers, stream resets, and
//! stream terminations. This crate implements the component that arbitrates
//! those markers for a single operator, the
//! [`ControlDispatcher`](crate::node::ControlDispatcher), deciding exactly
//! once when the wrapped operator's window opens and closes, when a
//! consistent checkpoint is attempted, and when the input side of the node
//! has drained for good.
//!
//! The dispatcher is built for the single-threaded node variant: upstream
//! operators deliver markers synchronously, in send order per named input,
//! with arbitrary interleaving across inputs. All of the deduplication and
//! join-counting logic in [`accept`](crate::node::ControlDispatcher::accept)
//! exists to stay correct under that interleaving without any locking.
//!
//! ## Example
//! ```ignore
//! let config = OperatorConfig::new().name("WordCount");
//! let mut dispatcher = ControlDispatcher::new(config, operator, checkpointer);
//! dispatcher.add_sink(downstream);
//! dispatcher.register_input_port("input", port);
//! dispatcher.connect_input("input", reservoir);
//!
//! // Driven by the node's delivery loop:
//! dispatcher.accept(ControlMarker::BeginWindow(WindowId::new(1)))?;
//! ```

// Libraries used in this file.
use std::fmt;

use abomonation_derive::Abomonation;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use slog::{Drain, Logger};
use slog_term::term_full;

// Public submodules
pub mod dataflow;
pub mod node;

// Public exports
pub use dataflow::OperatorConfig;

/// A unique identifier for an operator.
pub type OperatorId = Uuid;

/// Wrapper around [`uuid::Uuid`] that implements
/// [`Abomonation`](abomonation::Abomonation) for fast serialization.
#[derive(
    Abomonation, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct Uuid(uuid::Bytes);

impl Uuid {
    pub fn new_v4() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    pub fn nil() -> Uuid {
        Uuid([0; 16])
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> fmt::Result {
        let &Uuid(bytes) = self;
        let id = uuid::Uuid::from_bytes(bytes);
        fmt::Display::fmt(&id, f)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> fmt::Result {
        let &Uuid(bytes) = self;
        let id = uuid::Uuid::from_bytes(bytes);
        fmt::Display::fmt(&id, f)
    }
}

lazy_static! {
    static ref TERMINAL_LOGGER: Logger =
        Logger::root(std::sync::Mutex::new(term_full()).fuse(), slog::o!());
}

/// Returns a logger that prints messages to the console.
pub fn get_terminal_logger() -> slog::Logger {
    TERMINAL_LOGGER.clone()
}
