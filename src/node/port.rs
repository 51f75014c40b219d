//! Named input connections of an operator node.
//!
//! A node's input side is a mutable graph of named connections. Each name is
//! declared once, at wiring time, as an [`InputPort`] descriptor; over the
//! node's lifetime upstream sources attach to and drain away from that name,
//! each attachment backed by a fresh reservoir. The descriptor survives
//! disconnects so the slot can be rewired, which is what
//! [`DeferredConnection`] entries wait for.

use std::collections::HashMap;

/// Descriptor side of a named input connection.
///
/// The engine flips the connected bit as upstream sources attach and drain
/// away; the wrapped operator observes it to tell a quiet input from a dead
/// one.
pub trait InputPort: Send {
    fn set_connected(&mut self, connected: bool);
}

/// The live input connections of one node, keyed by port name.
///
/// Generic over the reservoir type `R`: the dispatcher owns the wiring but
/// never drains a reservoir itself, so no bound is needed here. Descriptors
/// and reservoirs are kept in separate maps because they have different
/// lifetimes: a descriptor outlives every reservoir that ever backs it.
pub struct PortRegistry<R> {
    descriptors: HashMap<String, Box<dyn InputPort>>,
    reservoirs: HashMap<String, R>,
    logger: slog::Logger,
}

impl<R> PortRegistry<R> {
    pub fn new(logger: slog::Logger) -> Self {
        Self {
            descriptors: HashMap::new(),
            reservoirs: HashMap::new(),
            logger,
        }
    }

    /// Declares a named port. Called once per name at node wiring time.
    pub fn register(&mut self, name: &str, descriptor: Box<dyn InputPort>) {
        self.descriptors.insert(name.to_string(), descriptor);
    }

    /// Attaches a reservoir to the named port and marks its descriptor
    /// connected.
    pub fn connect(&mut self, name: String, reservoir: R) {
        match self.descriptors.get_mut(&name) {
            Some(descriptor) => descriptor.set_connected(true),
            None => {
                slog::warn!(
                    self.logger,
                    "Connecting reservoir to undeclared input port {}",
                    name
                );
            }
        }
        self.reservoirs.insert(name, reservoir);
    }

    /// Marks every descriptor disconnected and drops all live reservoirs.
    /// Descriptors stay registered so the freed names can be rewired.
    pub fn disconnect_all(&mut self) {
        for name in self.reservoirs.keys() {
            if let Some(descriptor) = self.descriptors.get_mut(name) {
                descriptor.set_connected(false);
            }
        }
        self.reservoirs.clear();
    }

    /// Returns true when a reservoir is currently attached to `name`.
    pub fn is_connected(&self, name: &str) -> bool {
        self.reservoirs.contains_key(name)
    }

    /// Returns true when no reservoir remains attached.
    pub fn is_empty(&self) -> bool {
        self.reservoirs.is_empty()
    }

    /// Number of live input connections.
    pub fn len(&self) -> usize {
        self.reservoirs.len()
    }
}

/// A requested input wiring waiting for its target name to free up.
///
/// Created when the engine asks to (re)connect a name that is still occupied;
/// applied exactly once, transferring the reservoir into the registry, when
/// the occupying connection drains away.
pub struct DeferredConnection<R> {
    pub port_name: String,
    pub reservoir: R,
}

impl<R> DeferredConnection<R> {
    pub fn new(port_name: &str, reservoir: R) -> Self {
        Self {
            port_name: port_name.to_string(),
            reservoir,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    struct FlagPort(Arc<AtomicBool>);

    impl InputPort for FlagPort {
        fn set_connected(&mut self, connected: bool) {
            self.0.store(connected, Ordering::SeqCst);
        }
    }

    /// Test that descriptors survive a full disconnect and can be rewired.
    #[test]
    fn test_descriptor_survives_disconnect() {
        let connected = Arc::new(AtomicBool::new(false));
        let mut registry: PortRegistry<u32> = PortRegistry::new(crate::get_terminal_logger());
        registry.register("input", Box::new(FlagPort(Arc::clone(&connected))));

        registry.connect("input".to_string(), 1);
        assert!(connected.load(Ordering::SeqCst), "Connect must set the bit.");
        assert!(registry.is_connected("input"));

        registry.disconnect_all();
        assert!(
            !connected.load(Ordering::SeqCst),
            "Disconnect must clear the bit."
        );
        assert!(registry.is_empty());

        // The slot is free but still declared, so rewiring reconnects it.
        registry.connect("input".to_string(), 2);
        assert!(
            connected.load(Ordering::SeqCst),
            "Rewiring a freed name must reconnect its descriptor."
        );
        assert_eq!(registry.len(), 1);
    }
}
