//! Application layer: the port traits the core talks through, and the
//! stock handlers the assistant ships with.
//!
//! Nothing here touches hardware.  Adapters in [`crate::adapters`]
//! implement the ports; the binary wires them together.

pub mod handlers;
pub mod ports;
