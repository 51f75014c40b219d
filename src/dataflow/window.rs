use std::fmt;

use abomonation_derive::Abomonation;
use serde::{Deserialize, Serialize};

/// Identifies one logical window of tuples on a stream.
///
/// Window ids are totally ordered and strictly increasing over the lifetime
/// of a stream. The two bounds [`WindowId::MIN`] and [`WindowId::MAX`] are
/// reserved by the engine and never assigned to a real window; the window-id
/// generator hands out values strictly between them.
#[derive(
    Abomonation,
    Clone,
    Copy,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
pub struct WindowId(i64);

impl WindowId {
    /// The smallest window id the generator may reserve. Never assigned to a
    /// real window.
    pub const MIN: WindowId = WindowId(i64::MIN + 1);
    /// The largest window id the generator may reserve. Never assigned to a
    /// real window.
    pub const MAX: WindowId = WindowId(i64::MAX - 1);

    // Initializers for the dispatcher's dedup guards. Strictly outside
    // [MIN, MAX], so the first real marker of each kind always differs.
    pub(crate) const BELOW_MIN: WindowId = WindowId(i64::MIN);
    pub(crate) const ABOVE_MAX: WindowId = WindowId(i64::MAX);

    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl From<i64> for WindowId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WindowId({:#x})", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Test that the reserved bounds bracket every assignable window id.
    #[test]
    fn test_sentinel_ordering() {
        let id = WindowId::new(42);
        assert!(WindowId::MIN < id, "MIN must sort below real window ids.");
        assert!(id < WindowId::MAX, "MAX must sort above real window ids.");
        assert!(
            WindowId::BELOW_MIN < WindowId::MIN,
            "The reset guard initializer must sort below MIN."
        );
        assert!(
            WindowId::MAX < WindowId::ABOVE_MAX,
            "The end-stream guard initializer must sort above MAX."
        );
    }
}
