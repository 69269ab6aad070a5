//! hoverassist library.
//!
//! Debounced sensor events feeding a single-flight action dispatcher:
//! ultrasonic "hover buttons" and a photoresistor drive user handlers, at
//! most one of which runs at a time unless its event is marked concurrent.
//!
//! Everything hardware-facing goes through the traits in [`app::ports`],
//! so the whole pipeline runs on the host against simulated sensors.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod dispatcher;
pub mod drivers;
pub mod error;
pub mod events;
pub mod gates;
pub mod monitor;
pub mod ring_buffer;

pub use cancel::CancelToken;
pub use dispatcher::{Dispatcher, EventId, PollReport};
pub use error::{Error, Result};
pub use events::EventObject;
