//! Coordinator readiness report entries.

use serde::{Deserialize, Serialize};

/// One subsystem's readiness flag, as reported by the coordinator.
///
/// The report is an ordered list, not a map: the gateway fails fast on the
/// first not-ready entry in the order the coordinator returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemReadiness {
    /// Subsystem name, e.g. `blockchain` or `transaction-pool`.
    pub name: String,
    /// Whether the subsystem accepts traffic.
    pub ready: bool,
}

impl SubsystemReadiness {
    pub fn new(name: impl Into<String>, ready: bool) -> Self {
        Self {
            name: name.into(),
            ready,
        }
    }
}
