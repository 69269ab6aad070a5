//! Unified error types for the assistant core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! wiring code's error handling uniform.  Only construction-time failures
//! (bad configuration, full registry, unknown ids) ever reach a caller;
//! sensor and handler errors are recovered inside the polling loops and
//! surface here only so they can be logged with a consistent format.

use core::fmt;

use crate::dispatcher::EventId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A threshold, capacity or interval was rejected.
    Config(ConfigError),
    /// A sensor read failed or timed out.
    Sensor(SensorError),
    /// A user handler returned an error or panicked.
    Handler(HandlerError),
    /// `update_handler` was called with an id that was never attached.
    UnknownEventId(EventId),
    /// The dispatcher registry has no free slot left.
    RegistryFull,
    /// A worker thread could not be created.
    Spawn(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Handler(e) => write!(f, "handler: {e}"),
            Self::UnknownEventId(id) => {
                write!(f, "event id {id} has not been attached to the dispatcher")
            }
            Self::RegistryFull => write!(f, "dispatcher registry full"),
            Self::Spawn(name) => write!(f, "failed to spawn thread '{name}'"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration file at the given path.
    NotFound,
    /// The file exists but is not valid JSON for the config schema.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bounded-time read did not complete in time.
    Timeout,
    /// The driver could not produce a reading at all.
    ReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "read timed out"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Handler errors
// ---------------------------------------------------------------------------

/// Outcome of a handler invocation that did not finish cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler returned `Err`; carries the rendered error chain.
    Failed(String),
    /// The handler panicked; carries the panic payload if it was a string.
    Panicked(String),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "failed: {msg}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<HandlerError> for Error {
    fn from(e: HandlerError) -> Self {
        Self::Handler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
