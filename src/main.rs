//! AquaFeed Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single-threaded polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                    LogEventSink   NvsAdapter  │
//! │  (Time+Display+Keypad+Actuator)     (EventSink)    (Settings+  │
//! │                                                     Config)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Menu FSM · Input editor · Pump/feed runs              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ScheduleMonitor (delegate-driven, per-minute latches)         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::{anyhow, Result};
use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::{AnyInputPin, Input, InputPin as _, OutputPin as _, PinDriver, Pull};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;

use aquafeed::adapters::hardware::HardwareAdapter;
use aquafeed::adapters::log_sink::LogEventSink;
use aquafeed::adapters::nvs::NvsAdapter;
use aquafeed::app::ports::{ActuatorPort, ConfigPort};
use aquafeed::app::service::AppService;
use aquafeed::config::FirmwareConfig;
use aquafeed::drivers::feeder::FeederServo;
use aquafeed::drivers::keypad::{KeypadConfig, MatrixKeypad};
use aquafeed::drivers::lcd::{self, Lcd};
use aquafeed::drivers::pump::{ActiveLevel, PumpRelay};
use aquafeed::pins;
use aquafeed::ui::screens::{self, Notice};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AquaFeed v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load settings store and config from NVS ────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsAdapter::default()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            FirmwareConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    // Pin numbers in `pins` document this wiring.
    let p = Peripherals::take()?;

    let i2c = I2cDriver::new(
        p.i2c0,
        p.pins.gpio8,
        p.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ)),
    )?;

    let rows = [
        PinDriver::output(p.pins.gpio4.downgrade_output())?,
        PinDriver::output(p.pins.gpio5.downgrade_output())?,
        PinDriver::output(p.pins.gpio6.downgrade_output())?,
        PinDriver::output(p.pins.gpio7.downgrade_output())?,
    ];
    let cols = [
        pull_up(p.pins.gpio15.downgrade_input())?,
        pull_up(p.pins.gpio16.downgrade_input())?,
        pull_up(p.pins.gpio17.downgrade_input())?,
        pull_up(p.pins.gpio18.downgrade_input())?,
    ];
    let keypad = MatrixKeypad::new(rows, cols, KeypadConfig::default())
        .map_err(|e| anyhow!("keypad init failed: {:?}", e))?;

    let pump = PumpRelay::new(PinDriver::output(p.pins.gpio10)?, ActiveLevel::High)?;

    let servo_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::SERVO_PWM_FREQ_HZ))
            .resolution(Resolution::Bits14),
    )?;
    let feeder = FeederServo::new(LedcDriver::new(p.ledc.channel0, &servo_timer, p.pins.gpio11)?)?;

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        i2c,
        Lcd::new(lcd::DEFAULT_ADDRESS),
        keypad,
        pump,
        feeder,
        Delay::new_default(),
        nvs,
    );
    let mut log_sink = LogEventSink::new();

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(config.clone());

    if let Err(e) = app.start(&mut hw, &mut log_sink) {
        // Never run the schedule on an unknown clock.
        error!("Startup failed: {}, halting", e);
        screens::render_notice(&mut hw, &Notice::clock_fault());
        hw.all_off();
        #[allow(clippy::empty_loop)]
        loop {}
    }

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        app.tick(&mut hw, &mut log_sink);
        hw.delay_ms(config.loop_interval_ms);
    }
}

fn pull_up(pin: AnyInputPin) -> Result<PinDriver<'static, AnyInputPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(driver)
}
