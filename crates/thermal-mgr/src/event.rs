use crate::error::ThermalError;

/// Events handled by the thermal manager.
///
/// Events carry no payload: the monitor always reads a fresh sample from
/// the temperature sensor when it handles one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalEvent {
    /// Measure the temperature and report it as telemetry.
    MeasureTemperature,
    /// The sensor OS output has been asserted.
    ///
    /// The temperature is read again and compared against
    /// [`OVER_TEMPERATURE_THRESHOLD_C`](crate::OVER_TEMPERATURE_THRESHOLD_C).
    OsInterrupt,
}

impl ThermalEvent {
    /// Returns the raw code of the event.
    #[must_use]
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::MeasureTemperature => 0,
            Self::OsInterrupt => 1,
        }
    }
}

impl TryFrom<u8> for ThermalEvent {
    type Error = ThermalError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::MeasureTemperature),
            1 => Ok(Self::OsInterrupt),
            _ => Err(ThermalError::InvalidArgument),
        }
    }
}
