//! Single-slot event mailbox shared by one monitor and the dispatcher.
//!
//! ```text
//! ┌──────────────┐  raise(msg)  ┌──────────────┐  take()   ┌──────────────┐
//! │   Monitor    │─────────────▶│ EventObject  │──────────▶│  Dispatcher  │
//! │  (producer)  │              │ (one slot)   │           │  (consumer)  │
//! └──────────────┘              └──────────────┘           └──────────────┘
//! ```
//!
//! The trigger flag and the message live in one slot behind a blocking
//! mutex, so a consumer that sees `triggered` always sees the message that
//! was written with it.  A second `raise` before the dispatcher consumes
//! the first overwrites it: last write wins, nothing is queued.

use core::cell::RefCell;
use core::fmt;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::ActionHandler;

/// Longest message a mailbox holds; longer text is truncated.
pub const MESSAGE_CAPACITY: usize = 128;

pub type Message = heapless::String<MESSAGE_CAPACITY>;

/// Handler reference shared between a mailbox and running executions.
pub type SharedHandler = Arc<dyn ActionHandler>;

struct Slot {
    triggered: bool,
    message: Message,
    handler: Option<SharedHandler>,
}

/// A consumed firing, handed from the mailbox to the dispatcher.
#[derive(Clone)]
pub struct Firing {
    pub message: Message,
    pub handler: Option<SharedHandler>,
    pub allow_concurrent: bool,
}

pub struct EventObject {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
    /// Exempt from the dispatcher's single-flight rule.
    allow_concurrent: bool,
}

impl EventObject {
    /// A mailbox subject to single-flight dispatch.
    pub fn new() -> Self {
        Self::with_policy(false)
    }

    /// A mailbox whose handler may run while another handler is busy
    /// (e.g. a "cancel" sensor).
    pub fn concurrent() -> Self {
        Self::with_policy(true)
    }

    fn with_policy(allow_concurrent: bool) -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                triggered: false,
                message: Message::new(),
                handler: None,
            })),
            allow_concurrent,
        }
    }

    /// Producer side: store `message` and set the trigger flag.
    pub fn raise(&self, message: &str) {
        let message = truncate(message);
        self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            slot.message = message;
            slot.triggered = true;
        });
    }

    /// Consumer side: clear the trigger flag and return the pending firing.
    /// `None` if nothing was raised since the last take.
    pub fn take(&self) -> Option<Firing> {
        self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if !slot.triggered {
                return None;
            }
            slot.triggered = false;
            Some(Firing {
                message: slot.message.clone(),
                handler: slot.handler.clone(),
                allow_concurrent: self.allow_concurrent,
            })
        })
    }

    pub fn is_triggered(&self) -> bool {
        self.slot.lock(|cell| cell.borrow().triggered)
    }

    /// Last message written, whether or not it has been consumed.
    pub fn message(&self) -> Message {
        self.slot.lock(|cell| cell.borrow().message.clone())
    }

    pub fn allows_concurrent(&self) -> bool {
        self.allow_concurrent
    }

    pub fn has_handler(&self) -> bool {
        self.slot.lock(|cell| cell.borrow().handler.is_some())
    }

    pub(crate) fn set_handler(&self, handler: SharedHandler) {
        self.slot.lock(|cell| cell.borrow_mut().handler = Some(handler));
    }
}

impl Default for EventObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventObject")
            .field("triggered", &self.is_triggered())
            .field("allow_concurrent", &self.allow_concurrent)
            .finish_non_exhaustive()
    }
}

/// Copy `text` into a fixed-capacity message, cutting at a char boundary.
fn truncate(text: &str) -> Message {
    let mut out = Message::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
