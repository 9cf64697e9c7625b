//! Handler registry snapshot.
//!
//! Fetched from the coordinator once per connection context and never
//! mutated in place; a re-fetch produces a fresh snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of currently routable method names, partitioned by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSnapshot {
    /// Methods open to any validated peer, bound as `p2p.peer.<name>`.
    #[serde(default)]
    pub peer: BTreeSet<String>,
    /// Forger-only methods, bound as `p2p.internal.<name>`.
    #[serde(default)]
    pub internal: BTreeSet<String>,
}

impl HandlerSnapshot {
    /// Expand the snapshot into the full event names a connection binds.
    ///
    /// Events outside this set are never dispatched at all.
    pub fn bound_events(&self) -> BTreeSet<String> {
        self.peer
            .iter()
            .map(|name| format!("p2p.peer.{name}"))
            .chain(
                self.internal
                    .iter()
                    .map(|name| format!("p2p.internal.{name}")),
            )
            .collect()
    }

    /// Total number of advertised methods.
    pub fn len(&self) -> usize {
        self.peer.len() + self.internal.len()
    }

    /// Whether the coordinator advertised nothing.
    pub fn is_empty(&self) -> bool {
        self.peer.is_empty() && self.internal.is_empty()
    }
}
