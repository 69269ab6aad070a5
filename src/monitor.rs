//! Per-sensor polling loops.
//!
//! Each monitor owns one [`SensorDriver`] and one gate, and is the sole
//! producer of its [`EventObject`]s.  [`SensorMonitor::spawn`] runs a
//! monitor on its own thread:
//!
//! ```text
//!   loop while running:
//!     now = clock.now()
//!     step(now)            read → gate → raise on edge   (panics caught)
//!     sleep(poll_interval)
//! ```
//!
//! A timed-out read becomes `f32::INFINITY` ("nothing near" for a distance
//! sensor, "dark" for a light sensor) and is fed to the gate as usual.  A
//! failed read skips the sample.  Neither ends the loop.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error, info, warn};

use crate::app::ports::{Clock, SensorDriver};
use crate::config::{LightConfig, ProximityConfig};
use crate::diagnostics::panic_reason;
use crate::drivers::task::{LOOP_STACK_KB, spawn_named};
use crate::error::{ConfigError, Result, SensorError};
use crate::events::EventObject;
use crate::gates::{LightGate, LightTransition, ProximityGate};

/// Sample substituted for a read that timed out.
pub const TIMEOUT_SENTINEL: f32 = f32::INFINITY;

/// One sampling step of a sensor, driven by [`SensorMonitor`].
pub trait Monitor: Send + 'static {
    fn name(&self) -> &str;

    /// Take one sample at monotonic time `now` and raise events on edges.
    fn step(&mut self, now: Duration);
}

/// Read a driver, mapping a timeout to [`TIMEOUT_SENTINEL`].  `None` means
/// skip this sample.
fn sample<D: SensorDriver>(name: &str, driver: &mut D) -> Option<f32> {
    match driver.read() {
        Ok(value) => Some(value),
        Err(SensorError::Timeout) => {
            debug!("{}: read timed out", name);
            Some(TIMEOUT_SENTINEL)
        }
        Err(SensorError::ReadFailed) => {
            warn!("{}: read failed, sample skipped", name);
            None
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Proximity
// ───────────────────────────────────────────────────────────────

/// Hover-to-press monitor for a distance sensor.
///
/// Writes the debounced state to the driver's indicator on every sample
/// (so a dropped LED write is retried next poll) and raises
/// `"<name> activated"` on every hover press.
pub struct ProximityMonitor<D> {
    name: String,
    driver: D,
    gate: ProximityGate,
    event: Arc<EventObject>,
}

impl<D: SensorDriver> ProximityMonitor<D> {
    pub fn new(
        name: impl Into<String>,
        driver: D,
        config: &ProximityConfig,
        event: Arc<EventObject>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            driver,
            gate: ProximityGate::new(config)?,
            event,
        })
    }

    pub fn gate(&self) -> &ProximityGate {
        &self.gate
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: SensorDriver + 'static> Monitor for ProximityMonitor<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, now: Duration) {
        let Some(distance) = sample(&self.name, &mut self.driver) else {
            return;
        };
        let update = self.gate.observe(distance, now);

        self.driver.set_indicator(update.state.is_active());

        if update.activated {
            info!("{}: activated", self.name);
            self.event.raise(&format!("{} activated", self.name));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Light
// ───────────────────────────────────────────────────────────────

/// Switch-on/switch-off monitor for a photoresistor.
///
/// A reading below `light_on_threshold` counts as lit.  Either event
/// object is optional; a transition with no listener is only logged.
pub struct LightMonitor<D> {
    name: String,
    driver: D,
    gate: LightGate,
    light_on_threshold: f32,
    on_event: Option<Arc<EventObject>>,
    off_event: Option<Arc<EventObject>>,
}

impl<D: SensorDriver> LightMonitor<D> {
    pub fn new(name: impl Into<String>, driver: D, config: &LightConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            driver,
            gate: LightGate::new(config.dark_threshold()),
            light_on_threshold: config.light_on_threshold,
            on_event: None,
            off_event: None,
        })
    }

    /// Raise on `event` when the light comes on after a long dark spell.
    pub fn on_switch_on(mut self, event: Arc<EventObject>) -> Self {
        self.on_event = Some(event);
        self
    }

    /// Raise on `event` whenever the light goes off.
    pub fn on_switch_off(mut self, event: Arc<EventObject>) -> Self {
        self.off_event = Some(event);
        self
    }

    pub fn gate(&self) -> &LightGate {
        &self.gate
    }
}

impl<D: SensorDriver + 'static> Monitor for LightMonitor<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, now: Duration) {
        let Some(reading) = sample(&self.name, &mut self.driver) else {
            return;
        };
        let lit = reading < self.light_on_threshold;

        match self.gate.observe(lit, now) {
            Some(LightTransition::SwitchedOn { dark_for }) => {
                let msg = format!(
                    "Light switched ON after {:.1} seconds of being OFF!",
                    dark_for.as_secs_f32()
                );
                info!("{}: {}", self.name, msg);
                if let Some(event) = &self.on_event {
                    event.raise(&msg);
                }
            }
            Some(LightTransition::SwitchedOff { lit_for }) => {
                let msg = format!(
                    "Light switched OFF after {:.1} seconds of being ON!",
                    lit_for.as_secs_f32()
                );
                info!("{}: {}", self.name, msg);
                if let Some(event) = &self.off_event {
                    event.raise(&msg);
                }
            }
            None => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Polling thread
// ───────────────────────────────────────────────────────────────

/// Handle to a monitor running on its own thread.  Dropping it stops the
/// loop.
pub struct SensorMonitor {
    name: String,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SensorMonitor {
    pub fn spawn<M: Monitor>(
        mut monitor: M,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(ConfigError::ValidationFailed("monitor poll interval must be > 0").into());
        }
        let name = monitor.name().to_owned();
        let running = Arc::new(AtomicBool::new(true));

        let flag = Arc::clone(&running);
        let thread_name = format!("monitor-{}", name);
        let worker = spawn_named("monitor", thread_name, LOOP_STACK_KB, move || {
            info!("{}: monitor started (poll={:?})", monitor.name(), poll_interval);
            while flag.load(Ordering::Acquire) {
                let now = clock.now();
                if let Err(payload) =
                    panic::catch_unwind(AssertUnwindSafe(|| monitor.step(now)))
                {
                    error!(
                        "{}: monitor step panicked: {}",
                        monitor.name(),
                        panic_reason(payload.as_ref())
                    );
                }
                std::thread::sleep(poll_interval);
            }
            info!("{}: monitor stopped", monitor.name());
        })?;

        Ok(Self {
            name,
            running,
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Ask the loop to exit and wait for it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("{}: monitor thread panicked", self.name);
            }
        }
    }
}

impl Drop for SensorMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
