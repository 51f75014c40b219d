//! The control-marker arbitration core of an operator node.
//!
//! Every named input of a node delivers, between its payload tuples, the
//! control markers defined in [`crate::dataflow::control`]. With several
//! upstream sources fanning into one operator, each window boundary, reset,
//! and termination arrives once *per source*, and the node must collapse
//! those duplicates into exactly-once callbacks on the wrapped operator.
//! [`ControlDispatcher::accept`] is that collapse: a small, order-sensitive
//! state machine that must never double-fire a window, lose a checkpoint, or
//! leave a port half-connected.
//!
//! This is the driver for the synchronous, single-threaded node variant:
//! markers are pushed in directly by the upstream operator rather than
//! drained from queued reservoirs, so `accept` is never invoked concurrently
//! and needs no locking.

use crate::{
    dataflow::{ControlMarker, ControlSink, Operator, OperatorConfig, ProtocolError, WindowId},
    node::{
        checkpoint::CheckpointCoordinator,
        port::{DeferredConnection, InputPort, PortRegistry},
    },
};

/// Errors raised by the dispatcher's query surface.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryError {
    /// The queried statistic is not tracked by this driver variant.
    Unsupported,
}

/// Arbitrates the control markers of one operator node.
///
/// Generic over the reservoir type `R` backing the input connections; the
/// dispatcher owns the port wiring but never drains tuples itself.
pub struct ControlDispatcher<R> {
    config: OperatorConfig,
    operator: Box<dyn Operator>,
    checkpointer: Box<dyn CheckpointCoordinator>,
    sinks: Vec<Box<dyn ControlSink>>,
    ports: PortRegistry<R>,
    deferred_connections: Vec<DeferredConnection<R>>,

    /// The window currently open for the wrapped operator. Advances only on
    /// the first begin marker of a new window.
    current_window_id: WindowId,
    /// Dedup guard for reset markers; starts below MIN so the first reset
    /// always forwards.
    last_reset_window_id: WindowId,
    /// Dedup guard for end-stream markers; starts above MAX.
    last_end_stream_window_id: WindowId,
    /// High-water mark of persisted checkpoints.
    last_checkpointed_window_id: WindowId,
    /// Begin markers seen across all fan-in sources not yet matched by an
    /// end marker. The end-of-window callback fires when this returns to
    /// exactly zero; negative means the upstream contract is broken.
    expecting_end_windows: i32,
    /// True exactly between a fired begin-window callback and its matching
    /// end-window callback.
    inside_window: bool,
    /// At most one checkpoint attempt may be in flight per window.
    checkpoint_pending: bool,

    // Cadence counts owned by the base node; this driver only tests for 0.
    application_window_count: u32,
    checkpoint_window_count: u32,

    logger: slog::Logger,
}

impl<R> ControlDispatcher<R> {
    pub fn new(
        config: OperatorConfig,
        operator: Box<dyn Operator>,
        checkpointer: Box<dyn CheckpointCoordinator>,
    ) -> Self {
        let logger = crate::get_terminal_logger();
        let application_window_count = config.application_window_count;
        let checkpoint_window_count = config.checkpoint_window_count;
        Self {
            config,
            operator,
            checkpointer,
            sinks: Vec::new(),
            ports: PortRegistry::new(logger.clone()),
            deferred_connections: Vec::new(),
            current_window_id: WindowId::BELOW_MIN,
            last_reset_window_id: WindowId::BELOW_MIN,
            last_end_stream_window_id: WindowId::ABOVE_MAX,
            last_checkpointed_window_id: WindowId::BELOW_MIN,
            expecting_end_windows: 0,
            inside_window: false,
            checkpoint_pending: false,
            application_window_count,
            checkpoint_window_count,
            logger,
        }
    }

    /// Registers a downstream consumer of forwarded markers.
    pub fn add_sink(&mut self, sink: Box<dyn ControlSink>) {
        self.sinks.push(sink);
    }

    /// Declares a named input port. Called once per name at wiring time.
    pub fn register_input_port(&mut self, name: &str, descriptor: Box<dyn InputPort>) {
        self.ports.register(name, descriptor);
    }

    /// Attaches a reservoir to a declared input port.
    pub fn connect_input(&mut self, name: &str, reservoir: R) {
        self.ports.connect(name.to_string(), reservoir);
    }

    /// Queues an input wiring whose target name is still occupied. Applied,
    /// in request order, once the occupying connection drains away.
    pub fn defer_input_connection(&mut self, name: &str, reservoir: R) {
        self.deferred_connections
            .push(DeferredConnection::new(name, reservoir));
    }

    /// Processes one control marker.
    ///
    /// Must be called in arrival order per source; markers from different
    /// fan-in sources may interleave arbitrarily. Fully handled markers are
    /// never re-processed. An `Err` is a fatal protocol violation: the
    /// caller must terminate the node's delivery loop.
    pub fn accept(&mut self, marker: ControlMarker) -> Result<(), ProtocolError> {
        match marker {
            ControlMarker::BeginWindow(window_id) => {
                // Every fan-in source's begin marker is counted; only the
                // first occurrence of a new window id advances state.
                self.expecting_end_windows += 1;
                if window_id != self.current_window_id {
                    self.current_window_id = window_id;
                    self.fan_out(&marker);
                    if self.application_window_count == 0 {
                        self.inside_window = true;
                        slog::debug!(
                            self.logger,
                            "Operator {}: beginning window {}",
                            self.config.get_name(),
                            window_id
                        );
                        self.operator.begin_window(window_id);
                    }
                }
            }

            ControlMarker::EndWindow(window_id) => {
                self.expecting_end_windows -= 1;
                if self.expecting_end_windows == 0 {
                    self.process_end_window(Some(&marker));
                } else if self.expecting_end_windows < 0 {
                    return Err(ProtocolError::UnmatchedEndWindow(window_id));
                }
            }

            ControlMarker::Checkpoint(_) => {
                // At most one attempt per window, and checkpoints never run
                // backward; ineligible barriers are dropped entirely.
                if self.last_checkpointed_window_id < self.current_window_id
                    && !self.checkpoint_pending
                {
                    if self.checkpoint_window_count == 0 {
                        if self.checkpointer.attempt_checkpoint(self.current_window_id) {
                            slog::debug!(
                                self.logger,
                                "Operator {}: checkpointed window {}",
                                self.config.get_name(),
                                self.current_window_id
                            );
                            self.last_checkpointed_window_id = self.current_window_id;
                        }
                    } else {
                        self.checkpoint_pending = true;
                    }
                    self.fan_out(&marker);
                }
            }

            ControlMarker::ResetWindow(window_id) => {
                // Resets are broadcast identically by every upstream; only
                // the first instance per id propagates.
                if window_id != self.last_reset_window_id {
                    self.last_reset_window_id = window_id;
                    self.fan_out(&marker);
                }
            }

            ControlMarker::EndStream(window_id) => {
                if window_id != self.last_end_stream_window_id {
                    self.last_end_stream_window_id = window_id;
                    self.handle_end_stream();
                }
            }
        }
        Ok(())
    }

    /// The count-query surface of the general multi-source driver. This
    /// synchronous variant does not track per-tuple counts, and fails
    /// explicitly rather than reporting a meaningless zero.
    pub fn tuple_count(&mut self, _reset: bool) -> Result<usize, QueryError> {
        Err(QueryError::Unsupported)
    }

    /// Adjusts the application-window cadence (owned by the base node).
    pub fn set_application_window_count(&mut self, count: u32) {
        self.application_window_count = count;
    }

    /// Adjusts the checkpoint cadence (owned by the base node).
    pub fn set_checkpoint_window_count(&mut self, count: u32) {
        self.checkpoint_window_count = count;
    }

    pub fn current_window_id(&self) -> WindowId {
        self.current_window_id
    }

    pub fn inside_window(&self) -> bool {
        self.inside_window
    }

    pub fn last_checkpointed_window_id(&self) -> WindowId {
        self.last_checkpointed_window_id
    }

    pub fn checkpoint_pending(&self) -> bool {
        self.checkpoint_pending
    }

    /// Number of live input connections.
    pub fn connected_inputs(&self) -> usize {
        self.ports.len()
    }

    /// Tears down the input side after the first end-stream marker of an id.
    ///
    /// Receiving end-stream on this single-source driver means the whole
    /// input side of this operator run is draining down, so every live port
    /// disconnects, not just the sender's. Deferred wirings are then
    /// replayed in request order; only if nothing reconnects does the node
    /// terminate.
    fn handle_end_stream(&mut self) {
        slog::debug!(
            self.logger,
            "Operator {}: end of stream at window {}",
            self.config.get_name(),
            self.current_window_id
        );
        self.ports.disconnect_all();

        let mut idx = 0;
        while idx < self.deferred_connections.len() {
            if self.ports.is_connected(&self.deferred_connections[idx].port_name) {
                idx += 1;
            } else {
                let connection = self.deferred_connections.remove(idx);
                slog::debug!(
                    self.logger,
                    "Operator {}: applying deferred connection to port {}",
                    self.config.get_name(),
                    connection.port_name
                );
                self.ports.connect(connection.port_name, connection.reservoir);
            }
        }

        if self.ports.is_empty() {
            if self.inside_window {
                // No input remains to supply the matching end-window
                // markers, so the join barrier is released by force.
                self.expecting_end_windows = 0;
                self.process_end_window(None);
            }
            self.emit_end_stream();
        }
    }

    /// The end-of-window sequence: fires the operator callback if a window
    /// is open, then forwards the terminal marker when one exists (`None` on
    /// the forced-close path, where no matching end-window ever arrived).
    fn process_end_window(&mut self, marker: Option<&ControlMarker>) {
        if self.inside_window {
            slog::debug!(
                self.logger,
                "Operator {}: closing window {}",
                self.config.get_name(),
                self.current_window_id
            );
            self.operator.end_window();
            self.inside_window = false;
        }
        if let Some(marker) = marker {
            self.fan_out(marker);
        }
    }

    /// Marks this node's output permanently closed.
    fn emit_end_stream(&mut self) {
        slog::debug!(
            self.logger,
            "Operator {}: closing output streams",
            self.config.get_name()
        );
        let marker = ControlMarker::EndStream(self.current_window_id);
        self.fan_out(&marker);
    }

    /// Forwards a marker to every sink, in reverse registration order.
    fn fan_out(&mut self, marker: &ControlMarker) {
        for sink in self.sinks.iter_mut().rev() {
            sink.put(marker);
        }
    }
}
