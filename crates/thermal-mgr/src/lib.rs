//! `thermal-mgr` is a library crate that supervises a temperature sensor and
//! raises safety alerts when a threshold is crossed.
//!
//! It is built around a single consumer, the monitor task, fed by a
//! fixed-capacity event queue. Events come from two kinds of producers:
//!
//! - the interrupt handler of the sensor overtemperature shutdown (OS)
//!   output, which signals a threshold crossing detected in hardware;
//! - any task that requests a measurement, usually on a periodic schedule.
//!
//! For each event the monitor reads the sensor and reports the outcome to a
//! notifier: measurements become telemetry, while interrupts are compared
//! against [`OVER_TEMPERATURE_THRESHOLD_C`] and raise either an
//! over-temperature alert or a safe condition alert. Sensor failures are
//! reported as diagnostics and never stop the monitor.
//!
//! Sending an event never blocks, so interrupt handlers can produce events
//! safely. Interrupt events that cannot be enqueued are counted rather than
//! silently lost.
//!
//! The crate is `no_std` and does not allocate: the queue storage is part of
//! the [`ThermalManager`], which is meant to live in a `static`.
//!
//! The sensor and the notifier are abstracted by the [`TemperatureSensor`]
//! and [`Notifier`] traits. With the `lm75bd` feature, the `LM75BD` driver of
//! the `thermal-drivers` crate is a [`TemperatureSensor`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![no_std]

use embassy_time::Duration;

/// Error management.
pub mod error;
/// Thermal events.
pub mod event;
/// Temperature sensor abstraction.
pub mod gateway;
/// The thermal manager context and its producers.
pub mod manager;
/// The monitor task.
pub mod monitor;
/// Outcome notifiers.
pub mod notify;
/// The fixed-capacity event queue.
pub mod queue;

pub use error::{ErrorCode, ThermalError};
pub use event::ThermalEvent;
pub use gateway::{SensorConfig, TemperatureSensor};
pub use manager::ThermalManager;
pub use monitor::{MonitorTask, Outcome};
pub use notify::{LogNotifier, Notifier};

/// Number of events the queue can hold.
pub const QUEUE_LENGTH: usize = 10;

/// How long the monitor waits for an event before starting a new
/// iteration.
pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Temperature, in degrees Celsius, above which an interrupt raises an
/// over-temperature alert.
pub const OVER_TEMPERATURE_THRESHOLD_C: f32 = 75.0;
