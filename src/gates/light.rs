//! Duration-gated debounce for a photoresistor.
//!
//! Reports a switch-on only after the room has been dark for at least
//! `dark_threshold`, so a light flicked off and straight back on again is
//! not mistaken for someone waking up.  Switch-offs are always reported.
//!
//! The gate initialises itself from the first observed level without
//! firing.

use core::time::Duration;

use super::ActivationState;

/// A reported light transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTransition {
    /// Light came on after `dark_for` of darkness.
    SwitchedOn { dark_for: Duration },
    /// Light went off after `lit_for` of light.
    SwitchedOff { lit_for: Duration },
}

#[derive(Debug)]
pub struct LightGate {
    /// `None` until the first observation.
    state: Option<ActivationState>,
    last_off_to_on: Duration,
    last_on_to_off: Duration,
    dark_threshold: Duration,
}

impl LightGate {
    pub fn new(dark_threshold: Duration) -> Self {
        Self {
            state: None,
            last_off_to_on: Duration::ZERO,
            last_on_to_off: Duration::ZERO,
            dark_threshold,
        }
    }

    /// Feed the current light level observed at monotonic time `now`.
    pub fn observe(&mut self, lit: bool, now: Duration) -> Option<LightTransition> {
        let next = ActivationState::from(lit);
        let Some(previous) = self.state else {
            self.state = Some(next);
            self.last_off_to_on = now;
            self.last_on_to_off = now;
            return None;
        };
        if previous == next {
            return None;
        }
        self.state = Some(next);

        match next {
            ActivationState::Active => {
                self.last_off_to_on = now;
                let dark_for = now.saturating_sub(self.last_on_to_off);
                (dark_for >= self.dark_threshold)
                    .then_some(LightTransition::SwitchedOn { dark_for })
            }
            ActivationState::Inactive => {
                self.last_on_to_off = now;
                let lit_for = now.saturating_sub(self.last_off_to_on);
                Some(LightTransition::SwitchedOff { lit_for })
            }
        }
    }

    /// Current level; `Inactive` (dark) before the first observation.
    pub fn state(&self) -> ActivationState {
        self.state.unwrap_or_default()
    }

    pub fn is_initialised(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    #[test]
    fn first_observation_never_fires() {
        let mut g = LightGate::new(s(10));
        assert_eq!(g.observe(true, s(0)), None);
        assert!(g.is_initialised());
        assert_eq!(g.state(), ActivationState::Active);
    }

    #[test]
    fn short_darkness_filtered_long_darkness_reported() {
        let mut g = LightGate::new(s(10));
        assert_eq!(g.observe(false, s(0)), None);
        // Only 5 s of darkness.
        assert_eq!(g.observe(true, s(5)), None);
        // Off again immediately: switch-offs always fire.
        assert_eq!(
            g.observe(false, s(5)),
            Some(LightTransition::SwitchedOff { lit_for: s(0) })
        );
        // 15 s of darkness clears the threshold.
        assert_eq!(
            g.observe(true, s(20)),
            Some(LightTransition::SwitchedOn { dark_for: s(15) })
        );
    }

    #[test]
    fn steady_level_is_silent() {
        let mut g = LightGate::new(s(1));
        g.observe(false, s(0));
        for t in 1..50 {
            assert_eq!(g.observe(false, s(t)), None);
        }
    }

    #[test]
    fn switch_off_carries_lit_duration() {
        let mut g = LightGate::new(s(0));
        g.observe(true, s(100));
        assert_eq!(
            g.observe(false, s(160)),
            Some(LightTransition::SwitchedOff { lit_for: s(60) })
        );
    }

    #[test]
    fn exact_threshold_fires() {
        let mut g = LightGate::new(s(10));
        g.observe(false, s(0));
        assert_eq!(
            g.observe(true, s(10)),
            Some(LightTransition::SwitchedOn { dark_for: s(10) })
        );
    }
}
