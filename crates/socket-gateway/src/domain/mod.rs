//! Domain model: event names, registry snapshots, error taxonomy, config.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod registry;
