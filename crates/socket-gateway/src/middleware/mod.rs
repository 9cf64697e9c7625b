//! Validation middleware: every inbound event passes here before any
//! forwarding happens.

pub mod headers;
pub mod validation;
