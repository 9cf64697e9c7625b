//! Port traits: the gateway's seams to the transport and the coordinator.

pub mod inbound;
pub mod outbound;
