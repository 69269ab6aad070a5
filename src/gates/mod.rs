//! Debounce gates: pure state machines turning raw samples into
//! Active/Inactive transitions.
//!
//! Gates own no I/O and no clock.  The caller passes the sample together
//! with the current monotonic time, which keeps every gate deterministic
//! under test.
//!
//! | Gate            | Input                 | Fires                               |
//! |-----------------|-----------------------|-------------------------------------|
//! | `ProximityGate` | distance (cm)         | every `hover_threshold` while held  |
//! | `LightGate`     | lit / dark            | switch-on after long darkness, every switch-off |

pub mod light;
pub mod proximity;

pub use light::{LightGate, LightTransition};
pub use proximity::{ProximityGate, ProximityUpdate};

/// Debounced binary state, one per gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Inactive,
    Active,
}

impl ActivationState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl From<bool> for ActivationState {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}
