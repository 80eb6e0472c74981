//! Periodic tick timer feeding [`Timebase::on_timer_tick`].
//!
//! On ESP-IDF this is an `esp_timer` dispatched from the timer task; the
//! `&'static Timebase` travels as the callback argument, so there is no
//! global.  On host targets a plain thread approximates the period, which
//! is enough for simulation and tests.

use crate::counters::Timebase;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use std::sync::Arc;
#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicBool, Ordering};

/// Errors starting the tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    CreateFailed(i32),
    StartFailed(i32),
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CreateFailed(rc) => write!(f, "tick timer create failed (rc={})", rc),
            Self::StartFailed(rc) => write!(f, "tick timer start failed (rc={})", rc),
        }
    }
}

impl std::error::Error for TimerError {}

/// Running tick timer.  Stops when dropped.
pub struct TickTimer {
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(not(target_os = "espidf"))]
    running: Arc<AtomicBool>,
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: arg is the &'static Timebase passed to TickTimer::start().
    let timebase = unsafe { &*(arg as *const Timebase) };
    timebase.on_timer_tick();
}

impl TickTimer {
    /// Start ticking `timebase` every `period_ms`.
    #[cfg(target_os = "espidf")]
    pub fn start(timebase: &'static Timebase, period_ms: u32) -> Result<Self, TimerError> {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::from_ref(timebase).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"tick".as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: args outlives the call; the callback only touches atomics
        // on a 'static Timebase.
        unsafe {
            let ret = esp_timer_create(&args, &mut handle);
            if ret != ESP_OK as i32 {
                return Err(TimerError::CreateFailed(ret));
            }
            let ret = esp_timer_start_periodic(handle, u64::from(period_ms) * 1_000);
            if ret != ESP_OK as i32 {
                esp_timer_delete(handle);
                return Err(TimerError::StartFailed(ret));
            }
        }
        log::info!("hw_timer: tick timer started ({} ms)", period_ms);
        Ok(Self { handle })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start(timebase: &'static Timebase, period_ms: u32) -> Result<Self, TimerError> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = std::time::Duration::from_millis(u64::from(period_ms.max(1)));
        std::thread::Builder::new()
            .name("tick".into())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    std::thread::sleep(period);
                    timebase.on_timer_tick();
                }
            })
            .map_err(|_| TimerError::CreateFailed(-1))?;
        log::info!("hw_timer(sim): tick thread started ({} ms)", period_ms);
        Ok(Self { running })
    }

    pub fn stop(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if !self.handle.is_null() {
                // SAFETY: handle came from esp_timer_create and is deleted once.
                unsafe {
                    esp_timer_stop(self.handle);
                    esp_timer_delete(self.handle);
                }
                self.handle = core::ptr::null_mut();
            }
        }
        #[cfg(not(target_os = "espidf"))]
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
