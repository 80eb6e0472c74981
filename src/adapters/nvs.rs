//! NVS (Non-Volatile Storage) configuration store.
//!
//! Implements [`ConfigStorePort`].  Each record is one JSON blob in the
//! `nixieclock` namespace under the keys `led_info` and `sleep_info`.
//! ESP-IDF NVS commits are atomic per `nvs_commit()`, so a power cut
//! leaves either the old or the new record.
//!
//! Host builds keep the blobs in memory (simulation backend).

use core::ffi::CStr;

use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::ports::{ConfigError, ConfigStorePort};
use crate::config::{LedInfo, SleepInfo};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &CStr = c"nixieclock";
pub const LED_KEY: &CStr = c"led_info";
pub const SLEEP_KEY: &CStr = c"sleep_info";

pub struct NvsStore {
    #[cfg(not(target_os = "espidf"))]
    blobs: HashMap<&'static CStr, Vec<u8>>,
}

impl NvsStore {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a layout version change the partition is
    /// erased and initialised again.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from main() before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32
            {
                warn!("nvs: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                warn!("nvs: flash init failed ({})", ret);
                return Err(ConfigError::IoError);
            }
            info!("nvs: flash initialised");
            Ok(Self {})
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("nvs(sim): in-memory backend");
            Ok(Self {
                blobs: HashMap::new(),
            })
        }
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &'static CStr) -> Result<T, ConfigError> {
        let Some(bytes) = self.read_blob(key)? else {
            info!("nvs: {:?} not stored, using defaults", key);
            return Ok(T::default());
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("nvs: {:?} is corrupt: {}", key, e);
            ConfigError::Corrupted
        })
    }

    fn save<T: Serialize>(&mut self, key: &'static CStr, value: &T) -> Result<(), ConfigError> {
        let json = serde_json::to_vec(value).map_err(|_| ConfigError::Corrupted)?;
        self.write_blob(key, &json)?;
        info!("nvs: {:?} saved ({} bytes)", key, json.len());
        Ok(())
    }

    // ── Backend: in-memory (host) ─────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &'static CStr) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.blobs.get(key).cloned())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, key: &'static CStr, bytes: &[u8]) -> Result<(), ConfigError> {
        self.blobs.insert(key, bytes.to_vec());
        Ok(())
    }

    // ── Backend: ESP-IDF NVS ──────────────────────────────────

    /// Open the namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, i32>,
    ) -> Result<T, i32> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: NAMESPACE is NUL-terminated and `handle` outlives the call.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        // SAFETY: handle came from a successful nvs_open above.
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &'static CStr) -> Result<Option<Vec<u8>>, ConfigError> {
        let result = Self::with_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: a null buffer asks NVS for the stored length only.
            let ret =
                unsafe { nvs_get_blob(handle, key.as_ptr(), core::ptr::null_mut(), &mut size) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret =
                unsafe { nvs_get_blob(handle, key.as_ptr(), buf.as_mut_ptr().cast(), &mut size) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            buf.truncate(size);
            Ok(buf)
        });
        match result {
            Ok(buf) => Ok(Some(buf)),
            // Also returned when the namespace has never been written.
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(None),
            Err(e) => {
                warn!("nvs: reading {:?} failed ({})", key, e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, key: &'static CStr, bytes: &[u8]) -> Result<(), ConfigError> {
        Self::with_handle(true, |handle| {
            // SAFETY: key is NUL-terminated; bytes is valid for its length.
            let ret =
                unsafe { nvs_set_blob(handle, key.as_ptr(), bytes.as_ptr().cast(), bytes.len()) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("nvs: writing {:?} failed ({})", key, e);
            ConfigError::IoError
        })
    }
}

/// A store whose flash init failed.  Loads and saves report errors, so
/// the clock runs on defaults without persistence.
impl Default for NvsStore {
    fn default() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            blobs: HashMap::new(),
        }
    }
}

impl ConfigStorePort for NvsStore {
    fn load_led(&self) -> Result<LedInfo, ConfigError> {
        self.load(LED_KEY)
    }

    fn save_led(&mut self, info: &LedInfo) -> Result<(), ConfigError> {
        self.save(LED_KEY, info)
    }

    fn load_sleep(&self) -> Result<SleepInfo, ConfigError> {
        let info: SleepInfo = self.load(SLEEP_KEY)?;
        if !info.is_valid() {
            warn!("nvs: {:?} holds out-of-range hours", SLEEP_KEY);
            return Err(ConfigError::Corrupted);
        }
        Ok(info)
    }

    fn save_sleep(&mut self, info: &SleepInfo) -> Result<(), ConfigError> {
        if !info.is_valid() {
            return Err(ConfigError::ValidationFailed("sleep hours must be 0-23"));
        }
        self.save(SLEEP_KEY, info)
    }
}
