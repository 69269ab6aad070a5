//! Named thread spawning for the monitor, dispatcher and handler tasks.
//!
//! Every long-lived loop and every handler execution runs on its own OS
//! thread.  Threads are named after the sensor or event they serve so log
//! lines and panic messages identify the culprit.

use log::debug;

use crate::error::{Error, Result};

/// Stack size for monitor and dispatcher loops.
pub const LOOP_STACK_KB: usize = 64;

/// Handlers may call into audio or network stacks; give them more room.
pub const HANDLER_STACK_KB: usize = 256;

/// Spawn a named thread with an explicit stack size.
///
/// `role` is a static label reported in the error if the OS refuses the
/// thread.
pub fn spawn_named<T: Send + 'static>(
    role: &'static str,
    name: String,
    stack_kb: usize,
    f: impl FnOnce() -> T + Send + 'static,
) -> Result<std::thread::JoinHandle<T>> {
    debug!("Spawning '{}' ({}, stack={}KB)", name, role, stack_kb);

    std::thread::Builder::new()
        .name(name)
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|e| {
            log::error!("spawn of {} thread failed: {}", role, e);
            Error::Spawn(role)
        })
}
