//! Monitors driving the dispatcher end to end.
//!
//! Stepped tests call `Monitor::step` with explicit timestamps; threaded
//! tests run real `SensorMonitor` loops against `SimSensor`s.

use std::sync::Arc;
use std::time::Duration;

use hoverassist::adapters::sim::{ScriptedSensor, SimSensor};
use hoverassist::adapters::time::{ManualClock, MonotonicClock};
use hoverassist::app::handlers::{AnnounceHandler, BriefingHandler, StaticContent};
use hoverassist::app::ports::{Clock, SensorDriver};
use hoverassist::config::{LightConfig, ProximityConfig};
use hoverassist::error::SensorError;
use hoverassist::monitor::{LightMonitor, Monitor, ProximityMonitor, SensorMonitor};
use hoverassist::{Dispatcher, EventObject};

use crate::mock_hw::{MockSpeaker, wait_until};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ── Stepped ───────────────────────────────────────────────────

#[test]
fn hover_press_is_announced() {
    let event = Arc::new(EventObject::new());
    let speaker = MockSpeaker::new();
    let d = Dispatcher::new(ms(1)).unwrap();
    d.attach(&event, AnnounceHandler::new(speaker.clone())).unwrap();

    let mut m = ProximityMonitor::new(
        "Sensor #3",
        ScriptedSensor::from_values([5.0; 3]),
        &ProximityConfig::default(),
        Arc::clone(&event),
    )
    .unwrap();

    let clock = ManualClock::new();
    for _ in 0..3 {
        m.step(clock.now());
        clock.advance(ms(500));
    }
    assert!(event.is_triggered());
    assert_eq!(d.poll_once().started, 1);
    assert!(wait_until(|| speaker.has_spoken("Sensor #3 activated")));
}

#[test]
fn held_hover_presses_once_per_threshold() {
    let event = Arc::new(EventObject::new());
    let mut m = ProximityMonitor::new(
        "Sensor #2",
        ScriptedSensor::from_values([5.0; 30]),
        &ProximityConfig::default(),
        Arc::clone(&event),
    )
    .unwrap();

    let mut presses = 0;
    for i in 0..30 {
        m.step(ms(100 * i));
        if event.take().is_some() {
            presses += 1;
        }
    }
    // Presses at t = 1.0 s and t = 2.0 s.
    assert_eq!(presses, 2);
}

#[test]
fn timeouts_never_activate() {
    let event = Arc::new(EventObject::new());
    let sensor = ScriptedSensor::new([Err(SensorError::Timeout); 20]);
    let indicator = sensor.indicator_log();
    let mut m =
        ProximityMonitor::new("Sensor #1", sensor, &ProximityConfig::default(), Arc::clone(&event))
            .unwrap();

    for i in 0..20 {
        m.step(ms(100 * i));
    }
    assert_eq!(m.gate().count_close(), 0);
    assert_eq!(m.gate().count_seen(), 16);
    assert!(!event.is_triggered());
    let log = indicator.lock().unwrap();
    assert_eq!(log.len(), 20, "indicator written on every sample");
    assert!(log.iter().all(|on| !on));
}

#[test]
fn light_after_long_dark_starts_wakeup_briefing() {
    let wake = Arc::new(EventObject::new());
    let speaker = MockSpeaker::new();
    let d = Dispatcher::new(ms(1)).unwrap();
    d.attach(
        &wake,
        BriefingHandler::new(speaker.clone(), "Good morning!")
            .segment("Weather", StaticContent("Sunny".into())),
    )
    .unwrap();

    let mut m = LightMonitor::new(
        "Light",
        ScriptedSensor::from_values([1_000_000.0, 1_000_000.0, 1_000.0]),
        &LightConfig::default(),
    )
    .unwrap()
    .on_switch_on(Arc::clone(&wake));

    m.step(Duration::ZERO);
    m.step(Duration::from_secs(300));
    m.step(Duration::from_secs(700));
    assert_eq!(
        wake.message().as_str(),
        "Light switched ON after 700.0 seconds of being OFF!"
    );

    assert_eq!(d.poll_once().started, 1);
    assert!(wait_until(|| !d.is_busy()));
    assert_eq!(speaker.spoken(), vec!["Good morning!", "Weather", "Sunny"]);
}

#[test]
fn short_dark_spell_is_ignored() {
    let wake = Arc::new(EventObject::new());
    let mut m = LightMonitor::new(
        "Light",
        ScriptedSensor::from_values([1_000.0, 1_000_000.0, 1_000.0]),
        &LightConfig::default(),
    )
    .unwrap()
    .on_switch_on(Arc::clone(&wake));

    m.step(Duration::ZERO);
    m.step(Duration::from_secs(10));
    m.step(Duration::from_secs(20));
    assert!(!wake.is_triggered());
}

// ── Threaded ──────────────────────────────────────────────────

#[test]
fn threaded_pipeline_announces_hover() {
    let cfg = ProximityConfig {
        window_capacity: 4,
        hover_threshold_secs: 0.05,
        ..ProximityConfig::default()
    };
    let event = Arc::new(EventObject::new());
    let speaker = MockSpeaker::new();
    let mut d = Dispatcher::new(ms(1)).unwrap();
    d.attach(&event, AnnounceHandler::new(speaker.clone())).unwrap();
    d.start().unwrap();

    let sim = SimSensor::new(200.0);
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let mut monitor = SensorMonitor::spawn(
        ProximityMonitor::new("Sensor #1", sim.clone(), &cfg, event).unwrap(),
        clock,
        ms(2),
    )
    .unwrap();
    assert!(monitor.is_running());
    assert_eq!(monitor.name(), "Sensor #1");

    sim.set(5.0);
    assert!(wait_until(|| sim.indicator()));
    assert!(wait_until(|| speaker.has_spoken("Sensor #1 activated")));

    sim.set(200.0);
    assert!(wait_until(|| !sim.indicator()));

    // A lost LED write is repaired by the next sample.
    sim.clone().set_indicator(true);
    assert!(wait_until(|| !sim.indicator()));

    monitor.stop();
    d.stop();
    assert!(!monitor.is_running());
}
