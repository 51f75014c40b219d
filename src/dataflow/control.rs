use abomonation_derive::Abomonation;
use serde::{Deserialize, Serialize};

use crate::dataflow::WindowId;

/// An out-of-band tuple carrying protocol meaning rather than payload data.
///
/// Every marker is tagged with the [`WindowId`] it refers to. Markers are
/// immutable once received and are forwarded downstream verbatim whenever the
/// dispatcher decides they must propagate.
#[derive(Abomonation, Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ControlMarker {
    /// Opens the window with the given id on this stream.
    BeginWindow(WindowId),
    /// Closes the window with the given id on this stream.
    EndWindow(WindowId),
    /// Checkpoint barrier: a consistent snapshot should be captured once the
    /// marker has been seen.
    Checkpoint(WindowId),
    /// The upstream window generator restarted; downstream state keyed on
    /// window ids must be reset.
    ResetWindow(WindowId),
    /// The sending stream is permanently finished.
    EndStream(WindowId),
}

// Wire codes for the marker kinds. Codes 0 and 1 are reserved by the
// transport for the no-message and payload tuples, which never reach the
// dispatcher.
const RESET_WINDOW_CODE: u8 = 2;
const BEGIN_WINDOW_CODE: u8 = 3;
const END_WINDOW_CODE: u8 = 4;
const END_STREAM_CODE: u8 = 5;
const CHECKPOINT_CODE: u8 = 6;

impl ControlMarker {
    /// Returns the window id this marker is tagged with.
    pub fn window_id(&self) -> WindowId {
        match *self {
            ControlMarker::BeginWindow(id)
            | ControlMarker::EndWindow(id)
            | ControlMarker::Checkpoint(id)
            | ControlMarker::ResetWindow(id)
            | ControlMarker::EndStream(id) => id,
        }
    }

    /// Returns the stable wire code of this marker's kind.
    pub fn kind_code(&self) -> u8 {
        match *self {
            ControlMarker::ResetWindow(_) => RESET_WINDOW_CODE,
            ControlMarker::BeginWindow(_) => BEGIN_WINDOW_CODE,
            ControlMarker::EndWindow(_) => END_WINDOW_CODE,
            ControlMarker::EndStream(_) => END_STREAM_CODE,
            ControlMarker::Checkpoint(_) => CHECKPOINT_CODE,
        }
    }

    /// Reconstructs a marker from its wire kind code and window id.
    ///
    /// A code outside the control-marker range means the producer and this
    /// node disagree on the protocol version; that is fatal for the node and
    /// surfaces as [`ProtocolError::UnrecognizedMarker`] before any
    /// dispatcher state is touched.
    pub fn from_wire(code: u8, window_id: WindowId) -> Result<ControlMarker, ProtocolError> {
        match code {
            RESET_WINDOW_CODE => Ok(ControlMarker::ResetWindow(window_id)),
            BEGIN_WINDOW_CODE => Ok(ControlMarker::BeginWindow(window_id)),
            END_WINDOW_CODE => Ok(ControlMarker::EndWindow(window_id)),
            END_STREAM_CODE => Ok(ControlMarker::EndStream(window_id)),
            CHECKPOINT_CODE => Ok(ControlMarker::Checkpoint(window_id)),
            _ => Err(ProtocolError::UnrecognizedMarker(code)),
        }
    }
}

/// A downstream consumer of forwarded control markers.
///
/// Sinks are the input mechanisms of other nodes; `put` is expected to
/// buffer quickly and never block the dispatching node for long.
pub trait ControlSink: Send {
    fn put(&mut self, marker: &ControlMarker);
}

/// Fatal violations of the control protocol.
///
/// These indicate that the upstream contract is broken; the node's delivery
/// loop must terminate rather than continue with possibly corrupted window or
/// checkpoint state.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The marker kind code read off the wire is not part of the protocol.
    UnrecognizedMarker(u8),
    /// An END_WINDOW arrived with no BEGIN_WINDOW left to match it.
    UnmatchedEndWindow(WindowId),
}
