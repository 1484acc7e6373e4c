//! # LM75BD Driver
//!
//! This module provides an asynchronous, architecture-agnostic driver for the
//! `LM75BD` digital temperature sensor and thermal watchdog, communicating
//! over the I²C protocol.
//!
//! Besides reading the temperature, the driver configures the sensor's
//! overtemperature shutdown (OS) output, which can be wired to an interrupt
//! line to signal threshold crossings detected in hardware.
//!
//! The driver does not store the device address: every operation receives it,
//! so a single driver instance can talk to any sensor on the same bus.
//!
//! For detailed information and specifications, see the [datasheet](https://www.nxp.com/docs/en/data-sheet/LM75B.pdf).

use core::result::Result::{self, Err, Ok};

use embedded_hal_async::i2c::I2c;

// Register pointers.
const TEMPERATURE_REGISTER: u8 = 0x00;
const CONFIGURATION_REGISTER: u8 = 0x01;
const HYSTERESIS_REGISTER: u8 = 0x02;
const OVERTEMPERATURE_REGISTER: u8 = 0x03;

// Configuration register layout.
const SHUTDOWN_BIT: u8 = 0x01;
const OS_MODE_SHIFT: u8 = 1;
const OS_POLARITY_SHIFT: u8 = 2;
const FAULT_QUEUE_SHIFT: u8 = 3;

// Temperature register: 11 bits, left-aligned, 0.125 °C per count.
const TEMPERATURE_SHIFT: u8 = 5;
const TEMPERATURE_RESOLUTION_C: f32 = 0.125;

// Threshold registers: 9 bits, left-aligned, 0.5 °C per count.
const THRESHOLD_SHIFT: u8 = 7;
const THRESHOLD_RESOLUTION_C: f32 = 0.5;

/// Default I²C address, with the `A2`, `A1` and `A0` pins tied to VCC.
pub const DEFAULT_ADDRESS: u8 = 0x4F;

/// Minimum threshold accepted by the sensor, in degrees Celsius.
pub const THRESHOLD_MIN_C: f32 = -55.0;
/// Maximum threshold accepted by the sensor, in degrees Celsius.
pub const THRESHOLD_MAX_C: f32 = 125.0;

/// Errors that may occur while interacting with the `LM75BD` sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lm75bdError<E> {
    /// I²C bus error.
    I2c(E),
    /// Invalid threshold.
    ///
    /// Occurs when a threshold lies outside of
    /// [`THRESHOLD_MIN_C`]..=[`THRESHOLD_MAX_C`], or when the hysteresis
    /// threshold is above the overtemperature threshold.
    InvalidThreshold,
}

impl<E> From<E> for Lm75bdError<E> {
    fn from(e: E) -> Self {
        Lm75bdError::I2c(e)
    }
}

/// Number of consecutive faults required to activate the OS output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultQueue {
    /// One fault.
    One = 0,
    /// Two consecutive faults.
    Two = 1,
    /// Four consecutive faults.
    Four = 2,
    /// Six consecutive faults.
    Six = 3,
}

/// Active level of the OS output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsPolarity {
    /// The OS output is pulled low when active.
    ActiveLow = 0,
    /// The OS output is driven high when active.
    ActiveHigh = 1,
}

/// Operating mode of the OS output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsMode {
    /// The OS output stays active while the temperature is above the
    /// overtemperature threshold and until it falls below the hysteresis
    /// threshold.
    Comparator = 0,
    /// The OS output pulses on every threshold crossing and is cleared by
    /// reading any register.
    Interrupt = 1,
}

/// Operating mode of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// Continuous conversion.
    Normal = 0,
    /// Low power, no conversions.
    Shutdown = 1,
}

/// `LM75BD` configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// I²C address of the sensor.
    pub address: u8,
    /// OS fault queue length.
    pub fault_queue: FaultQueue,
    /// OS output polarity.
    pub os_polarity: OsPolarity,
    /// OS output mode.
    pub os_mode: OsMode,
    /// Device operating mode.
    pub device_mode: DeviceMode,
    /// Overtemperature threshold (`Tos`) in degrees Celsius.
    pub overtemperature_threshold: f32,
    /// Hysteresis threshold (`Thyst`) in degrees Celsius.
    pub hysteresis_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl Config {
    /// Creates a [`Config`] for the sensor at the given address.
    ///
    /// The OS output is configured as an active-low interrupt with a
    /// two-fault queue, the overtemperature threshold is 80 °C and the
    /// hysteresis threshold is 75 °C.
    #[must_use]
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            fault_queue: FaultQueue::Two,
            os_polarity: OsPolarity::ActiveLow,
            os_mode: OsMode::Interrupt,
            device_mode: DeviceMode::Normal,
            overtemperature_threshold: 80.0,
            hysteresis_threshold: 75.0,
        }
    }

    /// Sets the OS fault queue length.
    #[must_use]
    pub const fn fault_queue(mut self, fault_queue: FaultQueue) -> Self {
        self.fault_queue = fault_queue;
        self
    }

    /// Sets the OS output polarity.
    #[must_use]
    pub const fn os_polarity(mut self, os_polarity: OsPolarity) -> Self {
        self.os_polarity = os_polarity;
        self
    }

    /// Sets the OS output mode.
    #[must_use]
    pub const fn os_mode(mut self, os_mode: OsMode) -> Self {
        self.os_mode = os_mode;
        self
    }

    /// Sets the device operating mode.
    #[must_use]
    pub const fn device_mode(mut self, device_mode: DeviceMode) -> Self {
        self.device_mode = device_mode;
        self
    }

    /// Sets the overtemperature and hysteresis thresholds, in degrees
    /// Celsius.
    #[must_use]
    pub const fn thresholds(mut self, overtemperature: f32, hysteresis: f32) -> Self {
        self.overtemperature_threshold = overtemperature;
        self.hysteresis_threshold = hysteresis;
        self
    }

    /// Returns the value of the configuration register.
    #[must_use]
    pub const fn register_value(&self) -> u8 {
        ((self.fault_queue as u8) << FAULT_QUEUE_SHIFT)
            | ((self.os_polarity as u8) << OS_POLARITY_SHIFT)
            | ((self.os_mode as u8) << OS_MODE_SHIFT)
            | self.device_mode as u8
    }
}

/// `LM75BD` driver.
pub struct Lm75bd<I2C> {
    i2c: I2C,
}

impl<I2C, E> Lm75bd<I2C>
where
    I2C: I2c<u8, Error = E>,
{
    /// Creates a new [`Lm75bd`] driver with the given I²C bus.
    #[must_use]
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Releases the underlying I²C bus.
    #[must_use]
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Writes the whole [`Config`] to the sensor at `config.address`.
    ///
    /// The configuration register is written first, then the
    /// overtemperature and hysteresis thresholds.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Lm75bdError::InvalidThreshold`] if a threshold is out of range or
    ///   the hysteresis threshold is above the overtemperature one. Nothing is
    ///   written to the sensor in this case.
    /// - An I²C error if communication with the device fails.
    pub async fn configure(&mut self, config: &Config) -> Result<(), Lm75bdError<E>> {
        if config.hysteresis_threshold > config.overtemperature_threshold {
            return Err(Lm75bdError::InvalidThreshold);
        }

        let overtemperature = encode_threshold::<E>(config.overtemperature_threshold)?;
        let hysteresis = encode_threshold::<E>(config.hysteresis_threshold)?;

        self.write_byte(
            config.address,
            CONFIGURATION_REGISTER,
            config.register_value(),
        )
        .await?;
        self.write_word(config.address, OVERTEMPERATURE_REGISTER, overtemperature)
            .await?;
        self.write_word(config.address, HYSTERESIS_REGISTER, hysteresis)
            .await
    }

    /// Reads the temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns an error if communication over I²C fails.
    pub async fn read_temperature(&mut self, address: u8) -> Result<f32, Lm75bdError<E>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(address, &[TEMPERATURE_REGISTER], &mut buf)
            .await?;

        Ok(decode_temperature(buf))
    }

    /// Reads the raw configuration register.
    ///
    /// # Errors
    ///
    /// Returns an error if communication over I²C fails.
    pub async fn read_configuration(&mut self, address: u8) -> Result<u8, Lm75bdError<E>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(address, &[CONFIGURATION_REGISTER], &mut buf)
            .await?;

        Ok(buf[0])
    }

    /// Sets the overtemperature threshold (`Tos`), in degrees Celsius.
    ///
    /// The value is truncated to the sensor's 0.5 °C resolution.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Lm75bdError::InvalidThreshold`] if the value is out of range.
    /// - An I²C error if communication with the device fails.
    pub async fn set_overtemperature_threshold(
        &mut self,
        address: u8,
        celsius: f32,
    ) -> Result<(), Lm75bdError<E>> {
        let value = encode_threshold::<E>(celsius)?;
        self.write_word(address, OVERTEMPERATURE_REGISTER, value)
            .await
    }

    /// Sets the hysteresis threshold (`Thyst`), in degrees Celsius.
    ///
    /// The value is truncated to the sensor's 0.5 °C resolution.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`Lm75bdError::InvalidThreshold`] if the value is out of range.
    /// - An I²C error if communication with the device fails.
    pub async fn set_hysteresis_threshold(
        &mut self,
        address: u8,
        celsius: f32,
    ) -> Result<(), Lm75bdError<E>> {
        let value = encode_threshold::<E>(celsius)?;
        self.write_word(address, HYSTERESIS_REGISTER, value).await
    }

    /// Puts the sensor into the low power `Shutdown` mode.
    ///
    /// The other configuration bits are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if communication over I²C fails.
    pub async fn shutdown(&mut self, address: u8) -> Result<(), Lm75bdError<E>> {
        let configuration = self.read_configuration(address).await?;
        self.write_byte(address, CONFIGURATION_REGISTER, configuration | SHUTDOWN_BIT)
            .await
    }

    /// Puts the sensor back into the `Normal` mode.
    ///
    /// The other configuration bits are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if communication over I²C fails.
    pub async fn wake_up(&mut self, address: u8) -> Result<(), Lm75bdError<E>> {
        let configuration = self.read_configuration(address).await?;
        self.write_byte(address, CONFIGURATION_REGISTER, configuration & !SHUTDOWN_BIT)
            .await
    }

    #[inline]
    async fn write_byte(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), Lm75bdError<E>> {
        self.i2c.write(address, &[register, value]).await?;

        Ok(())
    }

    #[inline]
    async fn write_word(
        &mut self,
        address: u8,
        register: u8,
        [msb, lsb]: [u8; 2],
    ) -> Result<(), Lm75bdError<E>> {
        self.i2c.write(address, &[register, msb, lsb]).await?;

        Ok(())
    }
}

fn decode_temperature(raw: [u8; 2]) -> f32 {
    // The arithmetic shift keeps the sign of the 11-bit two's complement value.
    f32::from(i16::from_be_bytes(raw) >> TEMPERATURE_SHIFT) * TEMPERATURE_RESOLUTION_C
}

fn encode_threshold<E>(celsius: f32) -> Result<[u8; 2], Lm75bdError<E>> {
    // `contains` is false for NaN as well.
    if !(THRESHOLD_MIN_C..=THRESHOLD_MAX_C).contains(&celsius) {
        return Err(Lm75bdError::InvalidThreshold);
    }

    let counts = (celsius / THRESHOLD_RESOLUTION_C) as i16;

    Ok((counts << THRESHOLD_SHIFT).to_be_bytes())
}
