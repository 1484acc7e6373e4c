use core::fmt;

/// Numeric diagnostic codes.
///
/// Every failure the thermal manager can observe, its own or one raised by a
/// temperature sensor, is reduced to one of these codes before being reported
/// on the diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Unclassified failure.
    Unknown = 1,
    /// An argument is missing or malformed.
    InvalidArgument = 2,
    /// The operation is not allowed in the current state.
    InvalidState = 3,
    /// The event queue has no free slot.
    QueueFull = 4,
    /// The device did not acknowledge its address or a data byte.
    I2cNoAcknowledge = 5,
    /// The bus arbitration was lost.
    I2cArbitrationLoss = 6,
    /// A bus error, such as a misplaced start or stop condition.
    I2cBus = 7,
    /// The peripheral receive buffer was overrun.
    I2cOverrun = 8,
    /// Any other bus failure.
    I2cOther = 9,
    /// A sensor threshold is out of range.
    InvalidThreshold = 10,
}

impl ErrorCode {
    /// Returns the numeric value of the code.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::Unknown => "unknown error",
            Self::InvalidArgument => "invalid argument",
            Self::InvalidState => "invalid state",
            Self::QueueFull => "queue full",
            Self::I2cNoAcknowledge => "i2c no acknowledge",
            Self::I2cArbitrationLoss => "i2c arbitration loss",
            Self::I2cBus => "i2c bus error",
            Self::I2cOverrun => "i2c overrun",
            Self::I2cOther => "i2c error",
            Self::InvalidThreshold => "invalid threshold",
        };
        write!(f, "{description} ({})", self.value())
    }
}

/// Errors returned by the thermal manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalError {
    /// The submitted event is missing or unknown.
    InvalidArgument,
    /// The thermal manager has not been initialized yet, or has already been
    /// initialized when initialization is requested again.
    InvalidState,
    /// The event queue is full.
    QueueFull,
    /// The temperature sensor could not be read.
    SensorRead(ErrorCode),
}

impl ThermalError {
    /// Returns the [`ErrorCode`] associated with the error.
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::InvalidArgument => ErrorCode::InvalidArgument,
            Self::InvalidState => ErrorCode::InvalidState,
            Self::QueueFull => ErrorCode::QueueFull,
            Self::SensorRead(code) => code,
        }
    }
}

impl fmt::Display for ThermalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("Missing or unknown event"),
            Self::InvalidState => f.write_str("Thermal manager in the wrong state"),
            Self::QueueFull => f.write_str("Event queue full"),
            Self::SensorRead(code) => write!(f, "Temperature sensor read failed: {code}"),
        }
    }
}

impl From<crate::queue::QueueFull> for ThermalError {
    fn from(_: crate::queue::QueueFull) -> Self {
        Self::QueueFull
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, ThermalError};

    extern crate std;
    use std::string::ToString;

    #[test]
    fn thermal_error_codes() {
        assert_eq!(
            ThermalError::InvalidArgument.code(),
            ErrorCode::InvalidArgument
        );
        assert_eq!(ThermalError::InvalidState.code(), ErrorCode::InvalidState);
        assert_eq!(ThermalError::QueueFull.code(), ErrorCode::QueueFull);
        assert_eq!(
            ThermalError::SensorRead(ErrorCode::I2cBus).code(),
            ErrorCode::I2cBus
        );
    }

    #[test]
    fn display() {
        assert_eq!(ErrorCode::QueueFull.to_string(), "queue full (4)");
        assert_eq!(
            ThermalError::SensorRead(ErrorCode::I2cNoAcknowledge).to_string(),
            "Temperature sensor read failed: i2c no acknowledge (5)"
        );
    }
}
