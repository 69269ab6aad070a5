//! Thread helpers for the long-lived loops and handler executions.

pub mod task;
