//! Mock output adapters for integration tests.
//!
//! Records every spoken line so tests can assert on the full history
//! without an audio device.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hoverassist::CancelToken;
use hoverassist::app::ports::Speaker;

// ── MockSpeaker ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn has_spoken(&self, text: &str) -> bool {
        self.spoken.lock().unwrap().iter().any(|s| s == text)
    }
}

impl Speaker for MockSpeaker {
    fn speak(&self, _cancel: &CancelToken, text: &str) -> anyhow::Result<()> {
        self.spoken.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}

// ── Polling helper ────────────────────────────────────────────

/// Poll `cond` until it holds or five seconds pass.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
