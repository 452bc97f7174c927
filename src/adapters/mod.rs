//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC, GPIO, bus cache |
//! |            | ActuatorPort       | ESP32 LEDC PWM, GPIO     |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `time`     | ClockPort          | ESP32 system timer       |
//! | `http`     | (API transport)    | ESP-IDF HTTP server      |
//! | `wifi`     | (network link)     | ESP-IDF WiFi STA         |

pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
