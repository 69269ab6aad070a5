//! In-memory voice memo adapter.
//!
//! Implements [`MemoRecorder`] without audio hardware: "recording" waits
//! until the cancel token is set or `max_duration` passes and remembers
//! how long it ran; "playback" waits that long again.  Both waits poll the
//! token every `poll`, like [`LogSpeaker`](super::speaker::LogSpeaker).

use core::cell::Cell;
use core::time::Duration;
use std::time::Instant;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;

use crate::app::ports::MemoRecorder;
use crate::cancel::CancelToken;

/// Longest memo kept; recording stops by itself after this.
pub const DEFAULT_MAX_MEMO: Duration = Duration::from_secs(45);

/// Cancel-token polling period while recording or playing.
pub const DEFAULT_POLL: Duration = Duration::from_millis(250);

pub struct InMemoryRecorder {
    max_duration: Duration,
    poll: Duration,
    clip: Mutex<CriticalSectionRawMutex, Cell<Option<Duration>>>,
}

impl Default for InMemoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self {
            max_duration: DEFAULT_MAX_MEMO,
            poll: DEFAULT_POLL,
            clip: Mutex::new(Cell::new(None)),
        }
    }

    pub fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration = max;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn has_memo(&self) -> bool {
        self.memo_len().is_some()
    }

    /// Length of the stored memo, if any.
    pub fn memo_len(&self) -> Option<Duration> {
        self.clip.lock(Cell::get)
    }
}

impl MemoRecorder for InMemoryRecorder {
    fn record(&self, cancel: &CancelToken) -> anyhow::Result<()> {
        info!("MIC | recording (max {:?})", self.max_duration);
        let started = Instant::now();
        let stopped = cancel.sleep(self.max_duration, self.poll);
        let len = started.elapsed().min(self.max_duration);
        self.clip.lock(|c| c.set(Some(len)));
        info!(
            "MIC | {} after {:.1} s",
            if stopped { "stopped" } else { "limit reached" },
            len.as_secs_f32()
        );
        Ok(())
    }

    fn play(&self, cancel: &CancelToken) -> anyhow::Result<bool> {
        let Some(len) = self.memo_len() else {
            return Ok(false);
        };
        info!("PLAY | memo ({:.1} s)", len.as_secs_f32());
        if cancel.sleep(len, self.poll) {
            info!("PLAY | interrupted");
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn quick() -> InMemoryRecorder {
        InMemoryRecorder::new().with_poll(Duration::from_millis(1))
    }

    #[test]
    fn nothing_to_play_before_recording() {
        let r = quick();
        assert!(!r.has_memo());
        assert!(!r.play(&CancelToken::new()).unwrap());
    }

    #[test]
    fn recording_stops_at_limit() {
        let r = quick().with_max_duration(Duration::from_millis(20));
        r.record(&CancelToken::new()).unwrap();
        assert_eq!(r.memo_len(), Some(Duration::from_millis(20)));
        assert!(r.play(&CancelToken::new()).unwrap());
    }

    #[test]
    fn cancel_ends_recording_early() {
        let r = Arc::new(quick());
        let t = CancelToken::new();
        let worker = {
            let (r, t) = (Arc::clone(&r), t.clone());
            std::thread::spawn(move || r.record(&t))
        };
        std::thread::sleep(Duration::from_millis(30));
        t.cancel();
        worker.join().unwrap().unwrap();

        let len = r.memo_len().unwrap();
        assert!(len >= Duration::from_millis(30));
        assert!(len < Duration::from_secs(5), "recorded {:?}", len);
    }

    #[test]
    fn new_recording_replaces_old() {
        let r = quick().with_max_duration(Duration::from_millis(10));
        r.record(&CancelToken::new()).unwrap();
        let t = CancelToken::new();
        t.cancel();
        r.record(&t).unwrap();
        assert!(r.memo_len().unwrap() < Duration::from_millis(10));
    }
}
