//! One handler invocation, run to completion on its own thread.
//!
//! A *tracked* execution is the single-flight one: when it finishes, for
//! whatever reason, it clears the shared cancel token and then releases
//! the dispatcher's busy flag.  A *concurrent* execution (spawned for an
//! exempt event while another handler is busy) touches neither.
//!
//! Handler errors and panics are caught and logged here; they never reach
//! the dispatcher loop.

use core::sync::atomic::{AtomicBool, Ordering};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error, warn};

use crate::cancel::CancelToken;
use crate::diagnostics::panic_reason;
use crate::drivers::task::{HANDLER_STACK_KB, spawn_named};
use crate::error::{HandlerError, Result};
use crate::events::{Message, SharedHandler};

use super::EventId;

/// Releases the single-flight slot when dropped.
///
/// Owned by the execution's closure, so it fires on normal return, on an
/// unwinding panic, and when the thread could not be spawned at all (the
/// closure is dropped unrun).
struct Completion {
    cancel: CancelToken,
    busy: Arc<AtomicBool>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.cancel.reset();
        self.busy.store(false, Ordering::Release);
    }
}

pub struct HandlerExecution {
    id: EventId,
    handler: SharedHandler,
    message: Message,
    cancel: CancelToken,
    completion: Option<Completion>,
}

impl HandlerExecution {
    /// The single-flight execution; `busy` must already be set by the caller.
    pub fn tracked(
        id: EventId,
        handler: SharedHandler,
        message: Message,
        cancel: CancelToken,
        busy: Arc<AtomicBool>,
    ) -> Self {
        let completion = Some(Completion {
            cancel: cancel.clone(),
            busy,
        });
        Self {
            id,
            handler,
            message,
            cancel,
            completion,
        }
    }

    /// An exempt execution that bypasses the busy gate.
    pub fn concurrent(
        id: EventId,
        handler: SharedHandler,
        message: Message,
        cancel: CancelToken,
    ) -> Self {
        Self {
            id,
            handler,
            message,
            cancel,
            completion: None,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.completion.is_some()
    }

    /// Run on a fresh thread.  If the thread cannot be created the
    /// execution is dropped, which still signals completion.
    pub fn spawn(self) -> Result<JoinHandle<core::result::Result<(), HandlerError>>> {
        let name = if self.is_tracked() {
            format!("handler-{}", self.id)
        } else {
            format!("handler-{}-concurrent", self.id)
        };
        spawn_named("handler", name, HANDLER_STACK_KB, move || self.run())
    }

    /// Run on the calling thread and report the outcome.
    pub fn run(self) -> core::result::Result<(), HandlerError> {
        debug!("event {}: handler started ({:?})", self.id, self.message.as_str());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.handler.handle(&self.cancel, &self.message)
        }));

        let result = match outcome {
            Ok(Ok(())) => {
                debug!("event {}: handler finished", self.id);
                Ok(())
            }
            Ok(Err(e)) => {
                let err = HandlerError::Failed(format!("{e:#}"));
                warn!("event {}: handler {}", self.id, err);
                Err(err)
            }
            Err(payload) => {
                let err = HandlerError::Panicked(panic_reason(payload.as_ref()).to_owned());
                error!("event {}: handler {}", self.id, err);
                Err(err)
            }
        };

        // Dropping `self` here runs `Completion` for tracked executions.
        result
    }
}
