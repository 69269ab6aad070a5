//! Ratio-based debounce for an ultrasonic distance sensor.
//!
//! Single distance readings are unreliable: a hand hovering 8 cm away but
//! wiggling slightly can read as 40 cm.  The gate therefore judges a window
//! of recent samples and reports Active once more than
//! `close_rate_threshold` of them are nearer than `distance_threshold`.
//!
//! Holding the hand in place counts as a "virtual button press" every
//! `hover_threshold`.  After each press the window is drained so samples
//! from the previous press cannot bias the next judgement.
//!
//! ## Denominator
//!
//! `count_seen` grows with each admitted sample until the window first
//! fills and then stays pinned at the window capacity.  It only returns to
//! zero when a press drains the window.

use core::time::Duration;

use crate::config::ProximityConfig;
use crate::error::ConfigError;
use crate::ring_buffer::RingBuffer;

use super::ActivationState;

/// Result of feeding one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityUpdate {
    /// Debounced state after this sample; drives the indicator LED.
    pub state: ActivationState,
    /// `true` when this sample completed a hover press.
    pub activated: bool,
}

#[derive(Debug)]
pub struct ProximityGate {
    window: RingBuffer<f32>,
    count_close: usize,
    count_seen: usize,
    state: ActivationState,
    last_activated: Duration,
    distance_threshold: f32,
    close_rate_threshold: f32,
    hover_threshold: Duration,
}

impl ProximityGate {
    pub fn new(config: &ProximityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            window: RingBuffer::new(config.window_capacity)?,
            count_close: 0,
            count_seen: 0,
            state: ActivationState::Inactive,
            last_activated: Duration::ZERO,
            distance_threshold: config.distance_threshold_cm,
            close_rate_threshold: config.close_rate_threshold,
            hover_threshold: config.hover_threshold(),
        })
    }

    /// Feed one distance sample taken at monotonic time `now`.
    pub fn observe(&mut self, distance: f32, now: Duration) -> ProximityUpdate {
        let previous = self.state;
        self.admit(distance);

        let ratio = self.ratio();
        self.state = ActivationState::from(ratio > self.close_rate_threshold);

        let mut activated = false;
        if self.state != previous {
            if self.state.is_active() {
                self.last_activated = now;
            }
        } else if self.state.is_active()
            && now.saturating_sub(self.last_activated) >= self.hover_threshold
        {
            self.last_activated = now;
            activated = true;
            self.drain();
        }

        ProximityUpdate {
            state: self.state,
            activated,
        }
    }

    fn admit(&mut self, distance: f32) {
        if self.window.is_full() {
            if let Some(oldest) = self.window.dequeue() {
                if self.is_close(oldest) {
                    self.count_close -= 1;
                }
            }
        } else {
            self.count_seen += 1;
        }

        let admitted = self.window.enqueue(distance);
        debug_assert!(admitted, "window must have room after eviction");

        if self.is_close(distance) {
            self.count_close += 1;
        }
    }

    fn drain(&mut self) {
        self.window.clear();
        self.count_close = 0;
        self.count_seen = 0;
    }

    fn is_close(&self, distance: f32) -> bool {
        distance < self.distance_threshold
    }

    /// Fraction of admitted samples that were near; 0 when nothing admitted.
    pub fn ratio(&self) -> f32 {
        if self.count_seen == 0 {
            return 0.0;
        }
        self.count_close as f32 / self.count_seen as f32
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn count_close(&self) -> usize {
        self.count_close
    }

    pub fn count_seen(&self) -> usize {
        self.count_seen
    }

    /// Samples currently in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}
