//! Test doubles shared by the dispatcher scenario tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use millrace::{
    dataflow::{ControlMarker, ControlSink, Operator, WindowId},
    node::{CheckpointCoordinator, ControlDispatcher, InputPort},
    OperatorConfig,
};

/// One callback invocation on a [`RecordingOperator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperatorCall {
    BeginWindow(WindowId),
    EndWindow,
}

/// Operator that records every window callback it receives.
pub struct RecordingOperator {
    calls: Arc<Mutex<Vec<OperatorCall>>>,
}

impl RecordingOperator {
    pub fn new() -> (Self, Arc<Mutex<Vec<OperatorCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Operator for RecordingOperator {
    fn begin_window(&mut self, window_id: WindowId) {
        self.calls
            .lock()
            .unwrap()
            .push(OperatorCall::BeginWindow(window_id));
    }

    fn end_window(&mut self) {
        self.calls.lock().unwrap().push(OperatorCall::EndWindow);
    }
}

/// Sink that records every forwarded marker.
pub struct RecordingSink {
    markers: Arc<Mutex<Vec<ControlMarker>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<ControlMarker>>>) {
        let markers = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                markers: Arc::clone(&markers),
            },
            markers,
        )
    }
}

impl ControlSink for RecordingSink {
    fn put(&mut self, marker: &ControlMarker) {
        self.markers.lock().unwrap().push(*marker);
    }
}

/// Sink that appends to a log shared with other sinks, tagged by name, so a
/// test can observe the fan-out order across sinks.
pub struct NamedSink {
    name: &'static str,
    log: Arc<Mutex<Vec<(&'static str, ControlMarker)>>>,
}

impl NamedSink {
    pub fn new(
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, ControlMarker)>>>,
    ) -> Self {
        Self { name, log }
    }
}

impl ControlSink for NamedSink {
    fn put(&mut self, marker: &ControlMarker) {
        self.log.lock().unwrap().push((self.name, *marker));
    }
}

/// Checkpoint coordinator that records every attempt and persists (or
/// refuses to) according to a shared switch.
pub struct StubCheckpointer {
    attempts: Arc<Mutex<Vec<WindowId>>>,
    persist: Arc<AtomicBool>,
}

impl StubCheckpointer {
    pub fn new() -> (Self, Arc<Mutex<Vec<WindowId>>>, Arc<AtomicBool>) {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let persist = Arc::new(AtomicBool::new(true));
        (
            Self {
                attempts: Arc::clone(&attempts),
                persist: Arc::clone(&persist),
            },
            attempts,
            persist,
        )
    }
}

impl CheckpointCoordinator for StubCheckpointer {
    fn attempt_checkpoint(&mut self, window_id: WindowId) -> bool {
        self.attempts.lock().unwrap().push(window_id);
        self.persist.load(Ordering::SeqCst)
    }
}

/// Input-port descriptor exposing its connected bit to the test.
pub struct FlagPort(pub Arc<AtomicBool>);

impl InputPort for FlagPort {
    fn set_connected(&mut self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

/// Stand-in for a tuple reservoir; the dispatcher never drains one.
pub struct FakeReservoir;

/// Everything a scenario needs to drive one dispatcher and observe it.
pub struct TestNode {
    pub dispatcher: ControlDispatcher<FakeReservoir>,
    pub operator_calls: Arc<Mutex<Vec<OperatorCall>>>,
    pub forwarded: Arc<Mutex<Vec<ControlMarker>>>,
    pub checkpoint_attempts: Arc<Mutex<Vec<WindowId>>>,
    pub checkpoint_persists: Arc<AtomicBool>,
}

impl TestNode {
    pub fn new(config: OperatorConfig) -> Self {
        let (operator, operator_calls) = RecordingOperator::new();
        let (checkpointer, checkpoint_attempts, checkpoint_persists) = StubCheckpointer::new();
        let mut dispatcher =
            ControlDispatcher::new(config, Box::new(operator), Box::new(checkpointer));
        let (sink, forwarded) = RecordingSink::new();
        dispatcher.add_sink(Box::new(sink));
        Self {
            dispatcher,
            operator_calls,
            forwarded,
            checkpoint_attempts,
            checkpoint_persists,
        }
    }

    /// Declares and connects one named input, returning its connected bit.
    pub fn wire_input(&mut self, name: &str) -> Arc<AtomicBool> {
        let connected = Arc::new(AtomicBool::new(false));
        self.dispatcher
            .register_input_port(name, Box::new(FlagPort(Arc::clone(&connected))));
        self.dispatcher.connect_input(name, FakeReservoir);
        connected
    }
}
