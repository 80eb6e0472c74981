//! Nixie clock firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  Ds3231 (RtcPort)   HardwareAdapter (LedPort + NixieTube)    │
//! │  NvsStore           LogEventSink      console → Inbox        │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          ClockService (animator · face · sleep)    │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                           ▲                                  │
//! │            Timebase (SQW ISR · 1 ms esp_timer)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info, warn};

use nixieclock::adapters::console;
use nixieclock::adapters::ds3231::Ds3231;
use nixieclock::adapters::hardware::HardwareAdapter;
use nixieclock::adapters::log_sink::LogEventSink;
use nixieclock::adapters::nvs::NvsStore;
use nixieclock::adapters::time::Delay;
use nixieclock::app::boundary::{self, Inbox};
use nixieclock::app::ports::{ConfigStorePort, RtcPort};
use nixieclock::app::service::{self, ClockService};
use nixieclock::config::ClockConfig;
use nixieclock::counters::Timebase;
use nixieclock::drivers::hw_init;
use nixieclock::drivers::hw_timer::TickTimer;
use nixieclock::drivers::watchdog::Watchdog;
use nixieclock::pins;

const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  NixieClock v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = ClockConfig::default();

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}; restarting", e);
        // SAFETY: esp_restart never returns.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }
    let mut hw = HardwareAdapter::from_pins();
    if let Err(e) = hw.initialize() {
        warn!("Tube init failed: {}", e);
    }

    let peripherals = Peripherals::take()?;
    // SAFETY: the I²C pins are not claimed by any other driver.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut rtc = Ds3231::new(i2c);

    // ── 3. Stored configuration (or defaults) ─────────────────
    let mut store = match NvsStore::new() {
        Ok(store) => store,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsStore::default()
        }
    };
    let led = store.load_led().unwrap_or_else(|e| {
        warn!("LED config load failed ({}), using defaults", e);
        Default::default()
    });
    let sleep = store.load_sleep().unwrap_or_else(|e| {
        warn!("Sleep config load failed ({}), using defaults", e);
        Default::default()
    });

    // ── 4. RTC ────────────────────────────────────────────────
    if let Err(e) = rtc.configure_square_wave() {
        error!("RTC square wave config failed: {}", e);
    }
    match rtc.is_time_valid() {
        Ok(true) => {}
        Ok(false) => warn!("RTC oscillator stopped since last set; time needs setting"),
        Err(e) => warn!("RTC status read failed: {}", e),
    }

    // ── 5. Time base: align to the RTC second, then start ticking ─
    let timebase: &'static Timebase = Box::leak(Box::new(Timebase::new()));
    let mut delay = Delay::new();
    let aligned =
        service::align_to_rtc_second(&mut rtc, &mut delay, timebase, config.align_timeout_ms);
    let now = match aligned {
        Ok(now) => Some(now),
        Err(e) => {
            error!("RTC read failed during alignment: {}", e);
            None
        }
    };
    let _tick_timer = TickTimer::start(timebase, config.tick_period_ms)?;
    if let Err(e) = hw_init::init_isr_service(timebase) {
        error!("ISR service init failed: {}; minute boundaries disabled", e);
    }

    // ── 6. Core + boundary ────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut service = ClockService::new(config, timebase, led, sleep);
    service.start(now, &mut sink);

    let inbox: &'static Inbox = Box::leak(Box::new(Inbox::new()));
    if let Err(e) = console::spawn(inbox) {
        warn!("Console reader not started: {}", e);
    }

    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    info!("System ready. Entering main loop.");

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        while let Ok(req) = inbox.try_receive() {
            let resp = boundary::handle_request(
                &req,
                &mut service,
                &mut rtc,
                &mut store,
                &mut hw,
                &mut sink,
            );
            println!("{}", console::render(&resp));
        }

        service.poll(&mut rtc, &mut hw, &mut sink);
        watchdog.feed();
        delay.delay_ms(config.tick_period_ms);
    }
}
