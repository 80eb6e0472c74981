//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                  |
//! |------------|-------------------|------------------------------|
//! | `ds3231`   | RtcPort           | DS3231 over I²C              |
//! | `hardware` | LedPort           | LEDC PWM (RGB LED)           |
//! |            | NixieTube         | BCD GPIOs                    |
//! | `nvs`      | ConfigStorePort   | JSON blobs in NVS flash      |
//! | `log_sink` | EventSink         | Serial log output            |
//! | `console`  | (request source)  | stdin → boundary inbox       |
//! | `time`     | DelayNs           | FreeRTOS / thread sleep      |

pub mod console;
pub mod ds3231;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
