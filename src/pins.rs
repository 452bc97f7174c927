//! GPIO / peripheral pin assignments for the hydroponic tower controller
//! board (ESP32-WROOM-32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Circulation pump (relay + MOSFET)
// ---------------------------------------------------------------------------

/// Digital output driving the pump relay.  HIGH = pump running.
pub const PUMP_GPIO: i32 = 19;
/// LEDC PWM output to the pump MOSFET gate (same net as the relay coil
/// driver on boards without a MOSFET stage).
pub const PUMP_PWM_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// pH dosing pumps (peristaltic, via ULN2003)
// ---------------------------------------------------------------------------

/// Digital output: pH Up reagent pump.  HIGH = dosing.
pub const PH_UP_GPIO: i32 = 25;
/// Digital output: pH Down reagent pump.  HIGH = dosing.
pub const PH_DOWN_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// pH probe amplifier output.  ADC1 channel 0 (GPIO 36 / SENSOR_VP).
pub const PH_ADC_GPIO: i32 = 36;

// ---------------------------------------------------------------------------
// Sensors: Digital / bus
// ---------------------------------------------------------------------------

/// Float switch.  LOW = water present (inverted by the level divider).
pub const WATER_LEVEL_GPIO: i32 = 14;
/// DS18B20 one-wire water temperature probe.
pub const WATER_TEMP_GPIO: i32 = 13;
/// DHT22 air temperature / humidity.
pub const DHT_GPIO: i32 = 4;
/// MH-Z19 CO2 sensor UART2 (board RX ← sensor TX).
pub const CO2_UART_RX_GPIO: i32 = 16;
/// MH-Z19 CO2 sensor UART2 (board TX → sensor RX).
pub const CO2_UART_TX_GPIO: i32 = 17;
/// I²C bus shared by the BH1750 light sensor and the TFT touch controller.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the pump (25 kHz, inaudible).
pub const PUMP_PWM_FREQ_HZ: u32 = 25_000;
