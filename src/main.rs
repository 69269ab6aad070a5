//! hoverassist — host entry point.
//!
//! Wires simulated sensors to the monitors, dispatcher and stock handlers,
//! plays a short scripted scenario, and shuts everything down after
//! `--run-secs`.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  SimSensor #1 ─▶ ProximityMonitor ─▶ EventObject (concurrent) │──┐
//! │  SimSensor #2 ─▶ ProximityMonitor ─▶ EventObject              │──┤
//! │  SimSensor #3 ─▶ ProximityMonitor ─▶ EventObject              │──┼─▶ Dispatcher
//! │  SimSensor LDR ─▶ LightMonitor ─────▶ EventObject (on / off)  │──┘      │
//! └───────────────────────────────────────────────────────────────┘         ▼
//!   CancelHandler · BriefingHandler · RecordMemoHandler · wake-up briefing / AnnounceHandler
//! ```
//!
//! Sensor #1 is the cancel sensor: its event may run while another handler
//! is busy, so hovering over it interrupts whatever is being spoken or
//! ends a memo recording.  Sensor #3 records a memo that the sensor #2
//! briefing plays back before the weather and news.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use hoverassist::adapters::memo::InMemoryRecorder;
use hoverassist::adapters::sim::SimSensor;
use hoverassist::adapters::speaker::LogSpeaker;
use hoverassist::adapters::time::MonotonicClock;
use hoverassist::app::handlers::{
    AnnounceHandler, BriefingHandler, CancelHandler, RecordMemoHandler, StaticContent,
};
use hoverassist::app::ports::Clock;
use hoverassist::config::AssistantConfig;
use hoverassist::diagnostics;
use hoverassist::dispatcher::Dispatcher;
use hoverassist::drivers::task::{LOOP_STACK_KB, spawn_named};
use hoverassist::events::EventObject;
use hoverassist::monitor::{LightMonitor, ProximityMonitor, SensorMonitor};

/// Distance reported by an idle proximity sensor (cm).
const FAR_CM: f32 = 200.0;
/// Distance of a hovering hand (cm).
const NEAR_CM: f32 = 5.0;
/// Photoresistor readings: low resistance when lit.
const LDR_LIT: f32 = 1_000.0;
const LDR_DARK: f32 = 1_000_000.0;

/// Hover-gesture assistant (simulated sensors)
#[derive(Parser, Debug)]
#[command(name = "hoverassist", version, long_about = None)]
struct Args {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Seconds to run before shutting down
    #[arg(long, default_value_t = 25)]
    run_secs: u64,
}

struct SimRig {
    cancel: SimSensor,
    briefing: SimSensor,
    memo: SimSensor,
    light: SimSensor,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();
    diagnostics::install_panic_hook();

    info!("╔══════════════════════════════════════╗");
    info!("║  hoverassist v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Configuration ──────────────────────────────────────
    let config = match &args.config {
        Some(path) => AssistantConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            AssistantConfig::default()
        }
    };
    config.validate().context("validating config")?;

    // ── 2. Mailboxes and dispatcher ───────────────────────────
    let cancel_event = Arc::new(EventObject::concurrent());
    let briefing_event = Arc::new(EventObject::new());
    let memo_event = Arc::new(EventObject::new());
    let wake_event = Arc::new(EventObject::new());
    let lights_out_event = Arc::new(EventObject::new());

    let speaker = Arc::new(LogSpeaker::new());
    let recorder = Arc::new(InMemoryRecorder::new());
    let mut dispatcher = Dispatcher::new(config.dispatcher_poll_interval())?;

    dispatcher.attach(&cancel_event, CancelHandler)?;
    dispatcher.attach(
        &briefing_event,
        BriefingHandler::new(
            Arc::clone(&speaker),
            "Here are your reminders, weather and news. Hover CANCEL to skip to the next.",
        )
        .memo("Your memo", Arc::clone(&recorder))
        .segment("Weather", StaticContent("Clear skies, 18 degrees.".into()))
        .segment("News", StaticContent("No headlines this hour.".into())),
    )?;
    dispatcher.attach(
        &memo_event,
        RecordMemoHandler::new(Arc::clone(&recorder), Arc::clone(&speaker)),
    )?;
    dispatcher.attach(
        &wake_event,
        BriefingHandler::new(Arc::clone(&speaker), "Good morning!")
            .segment("Today", StaticContent("Nothing on the calendar.".into())),
    )?;
    dispatcher.attach(&lights_out_event, AnnounceHandler::new(Arc::clone(&speaker)))?;

    // ── 3. Sensors and monitors ───────────────────────────────
    let rig = SimRig {
        cancel: SimSensor::new(FAR_CM),
        briefing: SimSensor::new(FAR_CM),
        memo: SimSensor::new(FAR_CM),
        light: SimSensor::new(LDR_DARK),
    };

    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let poll = config.monitor_poll_interval();
    let mut monitors = vec![
        SensorMonitor::spawn(
            ProximityMonitor::new("Sensor #1", rig.cancel.clone(), &config.proximity, cancel_event)?,
            Arc::clone(&clock),
            poll,
        )?,
        SensorMonitor::spawn(
            ProximityMonitor::new("Sensor #2", rig.briefing.clone(), &config.proximity, briefing_event)?,
            Arc::clone(&clock),
            poll,
        )?,
        SensorMonitor::spawn(
            ProximityMonitor::new("Sensor #3", rig.memo.clone(), &config.proximity, memo_event)?,
            Arc::clone(&clock),
            poll,
        )?,
        SensorMonitor::spawn(
            LightMonitor::new("Light", rig.light.clone(), &config.light)?
                .on_switch_on(wake_event)
                .on_switch_off(lights_out_event),
            Arc::clone(&clock),
            poll,
        )?,
    ];

    dispatcher.start()?;
    info!("System ready. Running for {} s.", args.run_secs);

    // ── 4. Scripted scenario ──────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    let scenario = {
        let stop = Arc::clone(&stop);
        let hover = config.proximity.hover_threshold() + Duration::from_millis(500);
        spawn_named("scenario", "scenario".into(), LOOP_STACK_KB, move || {
            run_scenario(&rig, hover, &stop);
        })?
    };

    std::thread::sleep(Duration::from_secs(args.run_secs));

    // ── 5. Shutdown ───────────────────────────────────────────
    info!("Shutting down");
    stop.store(true, Ordering::Release);
    if scenario.join().is_err() {
        warn!("scenario thread panicked");
    }
    for monitor in &mut monitors {
        monitor.stop();
    }
    dispatcher.cancel_token().cancel();
    dispatcher.stop();
    info!("Bye");
    Ok(())
}

/// Sleep in short steps; `false` if asked to stop meanwhile.
fn pause(stop: &AtomicBool, total: Duration) -> bool {
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;
    while waited < total {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        std::thread::sleep(step);
        waited += step;
    }
    !stop.load(Ordering::Acquire)
}

/// Hold a hand over `sensor` for `hold`, then take it away.
fn hover_over(sensor: &SimSensor, hold: Duration, stop: &AtomicBool) -> bool {
    sensor.set(NEAR_CM);
    let ok = pause(stop, hold);
    sensor.set(FAR_CM);
    ok
}

fn run_scenario(rig: &SimRig, hover: Duration, stop: &AtomicBool) {
    info!("scenario: lights on");
    rig.light.set(LDR_LIT);
    if !pause(stop, Duration::from_secs(1)) {
        return;
    }

    info!("scenario: hover over sensor #3 (record a memo), then cancel to end it");
    if !hover_over(&rig.memo, hover, stop) || !pause(stop, Duration::from_secs(5)) {
        return;
    }
    if !hover_over(&rig.cancel, hover, stop) || !pause(stop, Duration::from_secs(2)) {
        return;
    }

    info!("scenario: hover over sensor #2 (briefing), then cancel the current segment");
    if !hover_over(&rig.briefing, hover, stop) || !pause(stop, Duration::from_secs(1)) {
        return;
    }
    if !hover_over(&rig.cancel, hover, stop) {
        return;
    }

    info!("scenario: hover over sensor #3 while the briefing runs (dropped)");
    if !hover_over(&rig.memo, hover, stop) || !pause(stop, Duration::from_secs(4)) {
        return;
    }

    info!("scenario: lights off");
    rig.light.set(LDR_DARK);
}
