//! Log-based speaker adapter.
//!
//! Implements [`Speaker`] by writing the text to the log and then waiting
//! roughly as long as reading it aloud would take.  The wait checks the
//! cancel token every `poll` (250 ms by default), the same cadence a real
//! audio player loop would use.  A text-to-speech backend would implement
//! the same trait.

use core::time::Duration;

use log::info;

use crate::app::ports::Speaker;
use crate::cancel::CancelToken;

/// Speaking rate used to estimate playback time (150 words per minute).
pub const DEFAULT_WORDS_PER_SEC: f32 = 2.5;

/// Cancel-token polling period during playback.
pub const DEFAULT_POLL: Duration = Duration::from_millis(250);

/// Adapter that "plays" text to the log.
#[derive(Debug, Clone)]
pub struct LogSpeaker {
    words_per_sec: f32,
    poll: Duration,
}

impl Default for LogSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSpeaker {
    pub fn new() -> Self {
        Self {
            words_per_sec: DEFAULT_WORDS_PER_SEC,
            poll: DEFAULT_POLL,
        }
    }

    /// Override the speaking rate; non-positive rates play instantly.
    pub fn with_rate(mut self, words_per_sec: f32) -> Self {
        self.words_per_sec = words_per_sec;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Estimated playback time for `text`.
    pub fn playback_time(&self, text: &str) -> Duration {
        if self.words_per_sec.is_nan() || self.words_per_sec <= 0.0 {
            return Duration::ZERO;
        }
        let words = text.split_whitespace().count() as f32;
        Duration::try_from_secs_f32(words / self.words_per_sec).unwrap_or(Duration::MAX)
    }
}

impl Speaker for LogSpeaker {
    fn speak(&self, cancel: &CancelToken, text: &str) -> anyhow::Result<()> {
        info!("SAY | {}", text);
        if cancel.sleep(self.playback_time(text), self.poll) {
            info!("SAY | interrupted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn playback_time_scales_with_words() {
        let s = LogSpeaker::new().with_rate(2.0);
        assert_eq!(s.playback_time("one two three four"), Duration::from_secs(2));
        assert_eq!(s.playback_time(""), Duration::ZERO);
        assert_eq!(LogSpeaker::new().with_rate(0.0).playback_time("a b"), Duration::ZERO);
    }

    #[test]
    fn tiny_rate_saturates_playback_time() {
        let s = LogSpeaker::new().with_rate(1e-30).with_poll(Duration::from_millis(5));
        assert_eq!(s.playback_time("hello there"), Duration::MAX);

        let t = CancelToken::new();
        t.cancel();
        s.speak(&t, "hello there").unwrap();
    }

    #[test]
    fn cancelled_token_cuts_playback_short() {
        let s = LogSpeaker::new().with_rate(0.1).with_poll(Duration::from_millis(5));
        let t = CancelToken::new();
        t.cancel();
        let start = Instant::now();
        s.speak(&t, "a long sentence that would take a minute").unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
