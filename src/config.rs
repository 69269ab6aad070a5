//! System configuration parameters
//!
//! All tunable parameters for the debounce gates, monitors and dispatcher.
//! Values come from an optional JSON file; any field left out keeps its
//! default.

use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ultrasonic proximity gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Number of recent distance samples judged together.
    pub window_capacity: usize,
    /// A sample closer than this (cm) counts as "near".
    pub distance_threshold_cm: f32,
    /// Fraction of near samples required for the Active state, in (0, 1].
    pub close_rate_threshold: f32,
    /// How long (seconds) a hover must be held to count as one press.
    pub hover_threshold_secs: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            window_capacity: 16,
            distance_threshold_cm: 10.0,
            close_rate_threshold: 0.7,
            hover_threshold_secs: 1.0,
        }
    }
}

impl ProximityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "proximity.window_capacity must be > 0",
            ));
        }
        if !(self.distance_threshold_cm.is_finite() && self.distance_threshold_cm > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "proximity.distance_threshold_cm must be > 0",
            ));
        }
        if !(self.close_rate_threshold > 0.0 && self.close_rate_threshold <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "proximity.close_rate_threshold must be in (0, 1]",
            ));
        }
        validate_secs(
            self.hover_threshold_secs,
            "proximity.hover_threshold_secs must be >= 0 and fit a Duration",
        )
    }

    /// Hover threshold as a `Duration`.  Only meaningful after `validate()`.
    pub fn hover_threshold(&self) -> Duration {
        secs_to_duration(self.hover_threshold_secs)
    }
}

/// Photoresistor light gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Minimum darkness (seconds) before a switch-on is reported.
    pub dark_threshold_secs: f32,
    /// Charge-time readings below this count as "light on".
    pub light_on_threshold: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            dark_threshold_secs: 600.0,
            light_on_threshold: 300_000.0,
        }
    }
}

impl LightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_secs(
            self.dark_threshold_secs,
            "light.dark_threshold_secs must be >= 0 and fit a Duration",
        )?;
        if !(self.light_on_threshold.is_finite() && self.light_on_threshold > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "light.light_on_threshold must be > 0",
            ));
        }
        Ok(())
    }

    /// Dark threshold as a `Duration`.  Only meaningful after `validate()`.
    pub fn dark_threshold(&self) -> Duration {
        secs_to_duration(self.dark_threshold_secs)
    }
}

/// Core system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub proximity: ProximityConfig,
    pub light: LightConfig,

    // --- Timing ---
    #[serde(flatten)]
    pub timing: TimingConfig,
}

/// Poll intervals for the cooperative loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Dispatcher mailbox poll interval (milliseconds)
    pub dispatcher_poll_interval_ms: u64,
    /// Sensor monitor sample interval (milliseconds)
    pub monitor_poll_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            dispatcher_poll_interval_ms: 1,
            monitor_poll_interval_ms: 10,
        }
    }
}

impl AssistantConfig {
    /// Check every field; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proximity.validate()?;
        self.light.validate()?;
        if self.timing.dispatcher_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "dispatcher_poll_interval_ms must be > 0",
            ));
        }
        if self.timing.monitor_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "monitor_poll_interval_ms must be > 0",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("config parse error: {}", e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            warn!("config read error ({}): {}", path.display(), e);
            ConfigError::NotFound
        })?;
        Self::from_json_str(&json)
    }

    pub fn dispatcher_poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.dispatcher_poll_interval_ms)
    }

    pub fn monitor_poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.monitor_poll_interval_ms)
    }
}

/// Accepts any value `Duration` can hold; rejects NaN, negatives and
/// overflow.
fn validate_secs(secs: f32, reason: &'static str) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f32(secs) {
        Ok(_) => Ok(()),
        Err(_) => Err(ConfigError::ValidationFailed(reason)),
    }
}

/// Saturating conversion for values that skipped validation.
fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = AssistantConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.proximity.window_capacity, 16);
        assert!((c.proximity.close_rate_threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn serde_roundtrip() {
        let c = AssistantConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = AssistantConfig::from_json_str(&json).unwrap();
        assert_eq!(c.proximity.window_capacity, c2.proximity.window_capacity);
        assert!((c.light.dark_threshold_secs - c2.light.dark_threshold_secs).abs() < 0.001);
        assert_eq!(
            c.timing.dispatcher_poll_interval_ms,
            c2.timing.dispatcher_poll_interval_ms
        );
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let c = AssistantConfig::from_json_str(
            r#"{ "light": { "dark_threshold_secs": 10.0 }, "monitor_poll_interval_ms": 5 }"#,
        )
        .unwrap();
        assert!((c.light.dark_threshold_secs - 10.0).abs() < f32::EPSILON);
        assert!((c.light.light_on_threshold - 300_000.0).abs() < 1.0);
        assert_eq!(c.timing.monitor_poll_interval_ms, 5);
        assert_eq!(c.proximity.window_capacity, 16);
    }

    #[test]
    fn garbage_is_corrupted() {
        assert_eq!(
            AssistantConfig::from_json_str("not json").unwrap_err(),
            ConfigError::Corrupted
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = AssistantConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err, ConfigError::NotFound);
    }

    #[test]
    fn invalid_values_rejected() {
        let mut c = AssistantConfig::default();
        c.proximity.distance_threshold_cm = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));

        let mut c = AssistantConfig::default();
        c.proximity.close_rate_threshold = 1.5;
        assert!(c.validate().is_err());

        let mut c = AssistantConfig::default();
        c.proximity.close_rate_threshold = 0.0;
        assert!(c.validate().is_err());

        let mut c = AssistantConfig::default();
        c.proximity.window_capacity = 0;
        assert!(c.validate().is_err());

        let mut c = AssistantConfig::default();
        c.light.dark_threshold_secs = -1.0;
        assert!(c.validate().is_err());

        let mut c = AssistantConfig::default();
        c.timing.dispatcher_poll_interval_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn close_rate_of_one_is_allowed() {
        let mut c = AssistantConfig::default();
        c.proximity.close_rate_threshold = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn thresholds_beyond_duration_range_rejected() {
        assert!(matches!(
            AssistantConfig::from_json_str(r#"{"proximity":{"hover_threshold_secs":1e20}}"#),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert!(matches!(
            AssistantConfig::from_json_str(r#"{"light":{"dark_threshold_secs":1e20}}"#),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut c = AssistantConfig::default();
        c.proximity.hover_threshold_secs = f32::INFINITY;
        assert!(c.validate().is_err());
    }

    #[test]
    fn duration_accessors_saturate_instead_of_panicking() {
        let mut p = ProximityConfig::default();
        p.hover_threshold_secs = 1e20;
        assert_eq!(p.hover_threshold(), Duration::MAX);
        p.hover_threshold_secs = -3.0;
        assert_eq!(p.hover_threshold(), Duration::ZERO);

        let mut l = LightConfig::default();
        l.dark_threshold_secs = f32::NAN;
        assert_eq!(l.dark_threshold(), Duration::ZERO);
    }
}
