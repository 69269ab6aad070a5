//! Panic reporting.
//!
//! Handler and monitor panics are caught and logged by their loops; the
//! hook installed here additionally routes every panic message through the
//! `log` facade so it lands in the same stream as everything else.

use std::any::Any;

/// Best-effort text of a panic payload.
pub fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Install a panic hook that logs the reason and the panicking thread.
///
/// Call once from `main` after the logger is initialised.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let reason = panic_reason(info.payload());
        match info.location() {
            Some(loc) => log::error!(
                "PANIC in '{}': {} ({}:{})",
                name,
                reason,
                loc.file(),
                loc.line()
            ),
            None => log::error!("PANIC in '{}': {}", name, reason),
        }
    }));
}
