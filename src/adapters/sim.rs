//! Simulated sensors for host runs and tests.
//!
//! [`SimSensor`] holds its reading in an atomic so another thread (a demo
//! script, a test) can move the "hand" while a monitor polls it.
//! [`ScriptedSensor`] replays a fixed sequence of readings.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::app::ports::SensorDriver;
use crate::error::SensorError;

const FAULT_NONE: u8 = 0;
const FAULT_TIMEOUT: u8 = 1;
const FAULT_READ_FAILED: u8 = 2;

#[derive(Debug)]
struct SimState {
    value: AtomicU32,
    fault: AtomicU8,
    indicator: AtomicBool,
}

/// Cloneable simulated sensor.  All clones share one reading.
#[derive(Debug, Clone)]
pub struct SimSensor {
    state: Arc<SimState>,
}

impl SimSensor {
    pub fn new(initial: f32) -> Self {
        Self {
            state: Arc::new(SimState {
                value: AtomicU32::new(initial.to_bits()),
                fault: AtomicU8::new(FAULT_NONE),
                indicator: AtomicBool::new(false),
            }),
        }
    }

    pub fn set(&self, value: f32) {
        self.state.value.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn value(&self) -> f32 {
        f32::from_bits(self.state.value.load(Ordering::Relaxed))
    }

    /// Make subsequent reads fail with `fault`, or succeed again with `None`.
    pub fn set_fault(&self, fault: Option<SensorError>) {
        let code = match fault {
            None => FAULT_NONE,
            Some(SensorError::Timeout) => FAULT_TIMEOUT,
            Some(SensorError::ReadFailed) => FAULT_READ_FAILED,
        };
        self.state.fault.store(code, Ordering::Relaxed);
    }

    /// Last indicator state written by the monitor.
    pub fn indicator(&self) -> bool {
        self.state.indicator.load(Ordering::Relaxed)
    }
}

impl SensorDriver for SimSensor {
    fn read(&mut self) -> Result<f32, SensorError> {
        match self.state.fault.load(Ordering::Relaxed) {
            FAULT_TIMEOUT => Err(SensorError::Timeout),
            FAULT_READ_FAILED => Err(SensorError::ReadFailed),
            _ => Ok(self.value()),
        }
    }

    fn set_indicator(&mut self, on: bool) {
        self.state.indicator.store(on, Ordering::Relaxed);
    }
}

/// Replays a script of readings, then times out forever.
///
/// Indicator writes are recorded in a log shared with the caller (see
/// [`ScriptedSensor::indicator_log`]).
#[derive(Debug)]
pub struct ScriptedSensor {
    script: VecDeque<Result<f32, SensorError>>,
    indicator_log: Arc<Mutex<Vec<bool>>>,
}

impl ScriptedSensor {
    pub fn new(script: impl IntoIterator<Item = Result<f32, SensorError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            indicator_log: Arc::default(),
        }
    }

    /// Script of plain readings.
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Self {
        Self::new(values.into_iter().map(Ok))
    }

    pub fn indicator_log(&self) -> Arc<Mutex<Vec<bool>>> {
        Arc::clone(&self.indicator_log)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SensorDriver for ScriptedSensor {
    fn read(&mut self) -> Result<f32, SensorError> {
        self.script.pop_front().unwrap_or(Err(SensorError::Timeout))
    }

    fn set_indicator(&mut self, on: bool) {
        if let Ok(mut log) = self.indicator_log.lock() {
            log.push(on);
        }
    }
}
