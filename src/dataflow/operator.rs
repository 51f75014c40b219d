use crate::{dataflow::WindowId, OperatorId};

/// Window-boundary callbacks on the wrapped unit of computation.
///
/// The dispatcher guarantees both callbacks fire at most once per logical
/// window and are never reentered: `begin_window` on the first begin marker
/// of a new window, `end_window` once every fan-in source has closed it (or
/// the input side drained away entirely).
#[allow(unused_variables)]
pub trait Operator: Send {
    fn begin_window(&mut self, window_id: WindowId) {}

    fn end_window(&mut self) {}
}

/// Configuration the node driver hands to the operator's dispatcher.
pub struct OperatorConfig {
    /// A human-readable name for the operator used in logging.
    pub name: Option<String>,
    /// A unique identifier for the operator. Set by the engine when the
    /// dataflow graph executes.
    pub id: OperatorId,
    /// How many streaming windows make up one application window. `0` means
    /// the two coincide and the window callbacks fire on every streaming
    /// window; any other cadence is counted down by the base node.
    pub application_window_count: u32,
    /// How many streaming windows pass between checkpoints. `0` means a
    /// checkpoint is captured immediately on every barrier; any other
    /// cadence defers the capture to the base node's window accounting.
    pub checkpoint_window_count: u32,
}

impl OperatorConfig {
    pub fn new() -> Self {
        Self {
            name: None,
            id: OperatorId::nil(),
            application_window_count: 0,
            checkpoint_window_count: 0,
        }
    }

    /// Set the operator's name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set how many streaming windows make up one application window.
    pub fn application_window_count(mut self, count: u32) -> Self {
        self.application_window_count = count;
        self
    }

    /// Set how many streaming windows pass between checkpoints.
    pub fn checkpoint_window_count(mut self, count: u32) -> Self {
        self.checkpoint_window_count = count;
        self
    }

    /// Returns the name of the operator. If the name is not set,
    /// returns the ID of the operator.
    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("{}", self.id))
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
