use crate::dataflow::WindowId;

/// Captures consistent snapshots of the wrapped operator's state.
///
/// The coordinator owns serialization and the write to the checkpoint store;
/// the dispatcher only decides *when* a capture is eligible. The call is
/// synchronous and may take non-trivial time, but it must not reenter the
/// dispatcher.
pub trait CheckpointCoordinator: Send {
    /// Captures a snapshot of the operator for `window_id`.
    ///
    /// Returns `false` when the snapshot was not persisted; the dispatcher
    /// then leaves its high-water mark untouched and retries on the next
    /// eligible checkpoint barrier.
    fn attempt_checkpoint(&mut self, window_id: WindowId) -> bool;
}
