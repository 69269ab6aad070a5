//! Port traits — the boundary between the coordination core and the
//! outside world.
//!
//! ```text
//!   SensorDriver ──▶ Monitor ──▶ EventObject ──▶ Dispatcher ──▶ ActionHandler
//!                                                                  │
//!                                               Speaker ◀──────────┤
//!                                               ContentSource ◀────┤
//!                                               MemoRecorder ◀─────┘
//! ```
//!
//! Hardware, audio and network adapters implement these traits.  The core
//! consumes them via generics or trait objects, so it never touches a pin,
//! a sound card or a socket directly.

use core::time::Duration;

use crate::cancel::CancelToken;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor driver (driven adapter: hardware → monitor)
// ───────────────────────────────────────────────────────────────

/// One physical sensor plus its optional indicator LED.
///
/// `read` must be bounded in time: a driver that cannot get an answer
/// within its timeout returns [`SensorError::Timeout`] instead of
/// blocking.
pub trait SensorDriver: Send {
    /// Take one raw reading.
    fn read(&mut self) -> Result<f32, SensorError>;

    /// Best-effort indicator update; drivers without an LED ignore it.
    fn set_indicator(&mut self, _on: bool) {}
}

impl<D: SensorDriver + ?Sized> SensorDriver for Box<D> {
    fn read(&mut self) -> Result<f32, SensorError> {
        (**self).read()
    }

    fn set_indicator(&mut self, on: bool) {
        (**self).set_indicator(on);
    }
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic time source for the monitors.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed epoch.
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Action handler (driving adapter: dispatcher → user code)
// ───────────────────────────────────────────────────────────────

/// User code run when an event fires.
///
/// Handlers may block on arbitrary I/O but must poll `cancel` often enough
/// to stop promptly when asked.  Errors are logged by the dispatcher and
/// never propagate further.
pub trait ActionHandler: Send + Sync {
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()>;
}

/// Adapter turning a closure into an [`ActionHandler`].
pub struct FnHandler<F>(F);

/// Wrap a closure as an [`ActionHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&CancelToken, &str) -> anyhow::Result<()> + Send + Sync,
{
    FnHandler(f)
}

impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(&CancelToken, &str) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, cancel: &CancelToken, message: &str) -> anyhow::Result<()> {
        (self.0)(cancel, message)
    }
}

// ───────────────────────────────────────────────────────────────
// Output ports used by the stock handlers
// ───────────────────────────────────────────────────────────────

/// Text-to-speech and playback.
///
/// Implementations poll `cancel` while audio is playing and stop early
/// when it is set.
pub trait Speaker: Send + Sync {
    fn speak(&self, cancel: &CancelToken, text: &str) -> anyhow::Result<()>;
}

/// Something worth reading out: a weather report, news headlines.
pub trait ContentSource: Send + Sync {
    fn fetch(&self) -> anyhow::Result<String>;
}

/// Microphone capture and playback of a single voice memo.
///
/// Both calls block while audio flows and return once `cancel` is set or
/// the clip ends.  A new recording replaces the previous one.
pub trait MemoRecorder: Send + Sync {
    /// Record until cancelled or the recorder's length limit is reached.
    fn record(&self, cancel: &CancelToken) -> anyhow::Result<()>;

    /// Play the stored memo.  `Ok(false)` when nothing has been recorded.
    fn play(&self, cancel: &CancelToken) -> anyhow::Result<bool>;
}

impl<M: MemoRecorder + ?Sized> MemoRecorder for std::sync::Arc<M> {
    fn record(&self, cancel: &CancelToken) -> anyhow::Result<()> {
        (**self).record(cancel)
    }

    fn play(&self, cancel: &CancelToken) -> anyhow::Result<bool> {
        (**self).play(cancel)
    }
}

impl<S: Speaker + ?Sized> Speaker for std::sync::Arc<S> {
    fn speak(&self, cancel: &CancelToken, text: &str) -> anyhow::Result<()> {
        (**self).speak(cancel, text)
    }
}
