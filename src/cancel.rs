//! Shared cooperative cancellation flag.
//!
//! One token exists per dispatcher and is cloned into every handler
//! invocation.  Setting it asks whatever is running to wrap up; nothing
//! is ever forcibly stopped.  The dispatcher clears it when a tracked
//! execution starts and again when it completes.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

/// Cloneable handle to a single process-wide cancel flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running handlers to stop soon.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear the flag.  Handlers that play several segments call this to
    /// make a cancel skip only the current segment.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Sleep for `duration` in `slice`-sized steps, checking the flag
    /// between steps.  Returns `true` if cancelled before the time was up.
    /// A duration past the clock's range waits until cancelled.
    pub fn sleep(&self, duration: Duration, slice: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let slice = slice.max(Duration::from_millis(1));
        loop {
            if self.is_cancelled() {
                return true;
            }
            let step = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    slice.min(deadline - now)
                }
                None => slice,
            };
            std::thread::sleep(step);
        }
    }

    /// `true` if both handles share the same flag.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
        b.reset();
        assert!(!a.is_cancelled());
        assert!(a.same_as(&b));
        assert!(!a.same_as(&CancelToken::new()));
    }

    #[test]
    fn sleep_runs_to_completion_when_not_cancelled() {
        let t = CancelToken::new();
        let start = Instant::now();
        assert!(!t.sleep(Duration::from_millis(20), Duration::from_millis(5)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn sleep_returns_early_on_cancel() {
        let t = CancelToken::new();
        let remote = t.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });
        let start = Instant::now();
        assert!(t.sleep(Duration::from_secs(10), Duration::from_millis(5)));
        assert!(start.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();
    }

    #[test]
    fn unbounded_sleep_still_honours_cancel() {
        let t = CancelToken::new();
        t.cancel();
        assert!(t.sleep(Duration::MAX, Duration::from_millis(5)));
    }
}
