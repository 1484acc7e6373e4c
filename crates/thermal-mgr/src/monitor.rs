use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};

use embassy_time::Duration;

use log::{debug, info, trace, warn};

use crate::error::ErrorCode;
use crate::event::ThermalEvent;
use crate::gateway::{SensorConfig, TemperatureSensor};
use crate::manager::ThermalManager;
use crate::notify::Notifier;
use crate::{OVER_TEMPERATURE_THRESHOLD_C, QUEUE_LENGTH, RECEIVE_TIMEOUT};

/// The outcome of a handled event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// A measurement has been reported as telemetry.
    Telemetry(f32),
    /// The temperature is above the over-temperature threshold.
    OverTemperature(f32),
    /// The temperature is at or below the over-temperature threshold.
    SafeCondition(f32),
    /// The sensor could not be read.
    Diagnostic(ErrorCode),
}

/// The monitor task, the only consumer of the thermal manager events.
///
/// Created by [`ThermalManager::init`]. Each iteration waits for an event,
/// reads the sensor and reports the outcome to the [`Notifier`].
pub struct MonitorTask<'a, C, S, T, M = CriticalSectionRawMutex, const N: usize = QUEUE_LENGTH>
where
    M: RawMutex,
{
    manager: &'a ThermalManager<M, N>,
    config: &'a C,
    sensor: S,
    notifier: T,
    receive_timeout: Duration,
    // Dropped interrupt events already warned about.
    reported_drops: u32,
}

impl<'a, C, S, T, M, const N: usize> MonitorTask<'a, C, S, T, M, N>
where
    C: SensorConfig,
    S: TemperatureSensor,
    T: Notifier,
    M: RawMutex,
{
    pub(crate) fn new(
        manager: &'a ThermalManager<M, N>,
        config: &'a C,
        sensor: S,
        notifier: T,
    ) -> Self {
        Self {
            manager,
            config,
            sensor,
            notifier,
            receive_timeout: RECEIVE_TIMEOUT,
            reported_drops: 0,
        }
    }

    /// Sets how long each iteration waits for an event.
    ///
    /// Defaults to [`RECEIVE_TIMEOUT`].
    #[must_use]
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Runs the monitor forever.
    pub async fn run(mut self) -> ! {
        info!(
            "Thermal monitor started, over-temperature threshold: {OVER_TEMPERATURE_THRESHOLD_C} deg C"
        );

        loop {
            let _ = self.poll().await;
        }
    }

    /// Runs a single iteration of the monitor.
    ///
    /// Waits for the next event and handles it. Returns [`None`] when no
    /// event arrives within the receive timeout.
    pub async fn poll(&mut self) -> Option<Outcome> {
        let event = self
            .manager
            .queue()
            .receive(self.receive_timeout)
            .await;

        self.warn_dropped_events();

        let Some(event) = event else {
            trace!(
                "No thermal event in the last {} ms",
                self.receive_timeout.as_millis()
            );
            return None;
        };

        Some(self.handle(event).await)
    }

    /// Handles an event.
    ///
    /// The sensor is read for every event. A read failure is reported as a
    /// diagnostic and ends the handling, otherwise:
    ///
    /// - a [`ThermalEvent::MeasureTemperature`] reports the sample as
    ///   telemetry;
    /// - a [`ThermalEvent::OsInterrupt`] raises the over-temperature alert if
    ///   the sample is strictly above [`OVER_TEMPERATURE_THRESHOLD_C`], the
    ///   safe condition alert otherwise.
    pub async fn handle(&mut self, event: ThermalEvent) -> Outcome {
        debug!("Handling thermal event {event:?}");

        let celsius = match self.sensor.read_temperature(self.config.address()).await {
            Ok(celsius) => celsius,
            Err(e) => {
                let code: ErrorCode = e.into();
                self.notifier.report_diagnostic(code);
                return Outcome::Diagnostic(code);
            }
        };

        match event {
            ThermalEvent::MeasureTemperature => {
                self.notifier.report_telemetry(celsius);
                Outcome::Telemetry(celsius)
            }
            ThermalEvent::OsInterrupt if celsius > OVER_TEMPERATURE_THRESHOLD_C => {
                self.notifier.report_over_temperature(celsius);
                Outcome::OverTemperature(celsius)
            }
            ThermalEvent::OsInterrupt => {
                self.notifier.report_safe_condition(celsius);
                Outcome::SafeCondition(celsius)
            }
        }
    }

    /// Returns the sensor configuration.
    #[must_use]
    pub const fn config(&self) -> &C {
        self.config
    }

    /// Returns the temperature sensor.
    #[must_use]
    pub const fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Returns the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &T {
        &self.notifier
    }

    fn warn_dropped_events(&mut self) {
        let dropped = self.manager.dropped_events();
        if dropped != self.reported_drops {
            warn!(
                "{} interrupt events dropped, {dropped} in total",
                dropped.wrapping_sub(self.reported_drops)
            );
            self.reported_drops = dropped;
        }
    }
}
