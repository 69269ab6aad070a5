//! Single-flight event dispatcher.
//!
//! Polls every attached [`EventObject`] in attach order and starts the
//! handler of each triggered one, subject to one rule: at most one
//! non-exempt handler runs at a time.
//!
//! ```text
//!  triggered? ──no──▶ next mailbox
//!      │yes
//!      ▼
//!  busy == false ──yes──▶ busy = true, reset cancel, spawn tracked execution
//!      │no
//!      ▼
//!  allow_concurrent ──yes──▶ spawn untracked execution (busy untouched)
//!      │no
//!      ▼
//!  drop the firing (not queued, never retried)
//! ```
//!
//! In every branch the mailbox's trigger flag is cleared.  Dropping an
//! event that arrives while a handler runs is the debounce policy: a user
//! hovering over a second sensor mid-announcement does not get that
//! action replayed later.
//!
//! Cancellation is advisory.  The dispatcher shares one [`CancelToken`]
//! with every execution and never stops a handler itself.

pub mod execution;

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, error, info, warn};

use crate::app::ports::ActionHandler;
use crate::cancel::CancelToken;
use crate::drivers::task::{LOOP_STACK_KB, spawn_named};
use crate::error::{ConfigError, Error, Result};
use crate::events::{EventObject, Firing, SharedHandler};

use execution::HandlerExecution;

/// Stable id returned by [`Dispatcher::attach`], assigned from 0 upwards.
pub type EventId = usize;

/// Maximum number of mailboxes one dispatcher can watch.
pub const MAX_EVENT_OBJECTS: usize = 16;

type Registry = heapless::Vec<Registration, MAX_EVENT_OBJECTS>;

struct Registration {
    id: EventId,
    event: Arc<EventObject>,
}

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Tracked (single-flight) executions started.
    pub started: usize,
    /// Untracked executions started for exempt events.
    pub concurrent: usize,
    /// Firings discarded because a handler was busy.
    pub dropped: usize,
}

impl PollReport {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// State shared between the owning `Dispatcher` and its polling thread.
struct Shared {
    registry: Mutex<CriticalSectionRawMutex, RefCell<Registry>>,
    busy: Arc<AtomicBool>,
    cancel: CancelToken,
    running: AtomicBool,
}

impl Shared {
    fn snapshot(&self) -> heapless::Vec<(EventId, Arc<EventObject>), MAX_EVENT_OBJECTS> {
        self.registry.lock(|cell| {
            cell.borrow()
                .iter()
                .map(|r| (r.id, Arc::clone(&r.event)))
                .collect()
        })
    }

    fn poll_once(&self) -> PollReport {
        let mut report = PollReport::default();
        for (id, event) in self.snapshot() {
            if let Some(firing) = event.take() {
                self.dispatch(id, firing, &mut report);
            }
        }
        report
    }

    fn dispatch(&self, id: EventId, firing: Firing, report: &mut PollReport) {
        let Some(handler) = firing.handler else {
            warn!("event {}: fired without a handler, dropped", id);
            report.dropped += 1;
            return;
        };

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.cancel.reset();
            info!("event {}: dispatching {:?}", id, firing.message.as_str());
            let exec = HandlerExecution::tracked(
                id,
                handler,
                firing.message,
                self.cancel.clone(),
                Arc::clone(&self.busy),
            );
            // On spawn failure the execution is dropped, which releases `busy`.
            if exec.spawn().is_ok() {
                report.started += 1;
            }
        } else if firing.allow_concurrent {
            info!("event {}: dispatching concurrently {:?}", id, firing.message.as_str());
            let exec =
                HandlerExecution::concurrent(id, handler, firing.message, self.cancel.clone());
            if exec.spawn().is_ok() {
                report.concurrent += 1;
            }
        } else {
            debug!("event {}: handler busy, dropped {:?}", id, firing.message.as_str());
            report.dropped += 1;
        }
    }
}

pub struct Dispatcher {
    shared: Arc<Shared>,
    poll_interval: Duration,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// A dispatcher with its own cancel token.
    pub fn new(poll_interval: Duration) -> Result<Self> {
        Self::with_cancel_token(poll_interval, CancelToken::new())
    }

    /// A dispatcher sharing an externally created cancel token.
    pub fn with_cancel_token(poll_interval: Duration, cancel: CancelToken) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(ConfigError::ValidationFailed("dispatcher poll interval must be > 0").into());
        }
        Ok(Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(RefCell::new(Registry::new())),
                busy: Arc::new(AtomicBool::new(false)),
                cancel,
                running: AtomicBool::new(false),
            }),
            poll_interval,
            worker: None,
        })
    }

    // ── Wiring ────────────────────────────────────────────────

    /// Register `event` and set its handler.  Returns a sequential id for
    /// later [`update_handler`](Self::update_handler) calls.
    pub fn attach<H: ActionHandler + 'static>(
        &self,
        event: &Arc<EventObject>,
        handler: H,
    ) -> Result<EventId> {
        self.attach_shared(event, Arc::new(handler))
    }

    pub fn attach_shared(&self, event: &Arc<EventObject>, handler: SharedHandler) -> Result<EventId> {
        let id = self.shared.registry.lock(|cell| {
            let mut registry = cell.borrow_mut();
            let id = registry.len();
            registry
                .push(Registration {
                    id,
                    event: Arc::clone(event),
                })
                .map_err(|_| Error::RegistryFull)?;
            Ok::<_, Error>(id)
        })?;
        event.set_handler(handler);
        info!(
            "Dispatcher: attached event {} (concurrent={})",
            id,
            event.allows_concurrent()
        );
        Ok(id)
    }

    /// Replace the handler of an attached event.
    pub fn update_handler<H: ActionHandler + 'static>(&self, id: EventId, handler: H) -> Result<()> {
        let event = self
            .shared
            .registry
            .lock(|cell| {
                cell.borrow()
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| Arc::clone(&r.event))
            })
            .ok_or(Error::UnknownEventId(id))?;
        event.set_handler(Arc::new(handler));
        info!("Dispatcher: updated handler for event {}", id);
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the polling thread.  Calling `start` twice is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            warn!("Dispatcher: already running");
            return Ok(());
        }
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let poll_interval = self.poll_interval;
        let worker = spawn_named("dispatcher", "dispatcher".into(), LOOP_STACK_KB, move || {
            info!(
                "Dispatcher started (poll={:?}, {} events)",
                poll_interval,
                shared.snapshot().len()
            );
            while shared.running.load(Ordering::Acquire) {
                shared.poll_once();
                std::thread::sleep(poll_interval);
            }
            info!("Dispatcher stopped");
        });

        match worker {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Stop the polling thread and wait for it to exit.  Running handlers
    /// are left to finish on their own.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Dispatcher: polling thread panicked");
            }
        }
    }

    // ── Polling ───────────────────────────────────────────────

    /// Run one poll cycle on the calling thread.
    pub fn poll_once(&self) -> PollReport {
        self.shared.poll_once()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.shared.running.load(Ordering::Acquire)
    }

    /// `true` while a tracked execution is in flight.
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    /// The token shared with every execution.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.shared.cancel
    }

    /// Number of attached events.
    pub fn len(&self) -> usize {
        self.shared.registry.lock(|cell| cell.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
