use log::{error, info, warn};

use crate::error::ErrorCode;

/// Receiver of the monitor outcomes.
///
/// Implementations are called from the monitor task, never from interrupt
/// context, so they are free to block on a console or a telemetry bus.
pub trait Notifier {
    /// Reports a temperature sample measured on request.
    fn report_telemetry(&mut self, celsius: f32);

    /// Reports that the temperature is above the over-temperature threshold.
    fn report_over_temperature(&mut self, celsius: f32);

    /// Reports that the temperature is back at or below the over-temperature
    /// threshold.
    fn report_safe_condition(&mut self, celsius: f32);

    /// Reports a failure of the temperature sensor.
    fn report_diagnostic(&mut self, code: ErrorCode);
}

/// A [`Notifier`] writing every outcome to the [`log`] facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a [`LogNotifier`].
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn report_telemetry(&mut self, celsius: f32) {
        info!("Temperature telemetry: {celsius:.3} deg C");
    }

    fn report_over_temperature(&mut self, celsius: f32) {
        warn!("Over temperature detected: {celsius:.3} deg C");
    }

    fn report_safe_condition(&mut self, celsius: f32) {
        info!("Returned to safe operating conditions: {celsius:.3} deg C");
    }

    fn report_diagnostic(&mut self, code: ErrorCode) {
        error!("Temperature sensor failure: {code}");
    }
}
