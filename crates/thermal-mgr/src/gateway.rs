use core::future::Future;

use crate::error::ErrorCode;

/// Configuration of the supervised temperature sensor.
///
/// The monitor borrows the configuration for its whole lifetime and only
/// ever reads the device address out of it.
pub trait SensorConfig {
    /// Returns the bus address of the sensor.
    fn address(&self) -> u8;
}

impl SensorConfig for u8 {
    fn address(&self) -> u8 {
        *self
    }
}

/// A temperature sensor.
///
/// Failures are reduced to an [`ErrorCode`] before being reported, so the
/// sensor error type only needs to convert into one.
pub trait TemperatureSensor {
    /// The error raised when a read fails.
    type Error: Into<ErrorCode>;

    /// Reads the temperature, in degrees Celsius, from the sensor at
    /// `address`.
    fn read_temperature(&mut self, address: u8)
    -> impl Future<Output = Result<f32, Self::Error>>;
}

#[cfg(feature = "lm75bd")]
mod lm75bd {
    use embedded_hal_async::i2c::{Error, ErrorKind, I2c};

    use thermal_drivers::lm75bd::{Config, Lm75bd, Lm75bdError};

    use crate::error::ErrorCode;

    use super::{SensorConfig, TemperatureSensor};

    impl SensorConfig for Config {
        fn address(&self) -> u8 {
            self.address
        }
    }

    impl<E> From<Lm75bdError<E>> for ErrorCode
    where
        E: Error,
    {
        fn from(error: Lm75bdError<E>) -> Self {
            match error {
                Lm75bdError::I2c(e) => match e.kind() {
                    ErrorKind::NoAcknowledge(_) => Self::I2cNoAcknowledge,
                    ErrorKind::ArbitrationLoss => Self::I2cArbitrationLoss,
                    ErrorKind::Bus => Self::I2cBus,
                    ErrorKind::Overrun => Self::I2cOverrun,
                    _ => Self::I2cOther,
                },
                Lm75bdError::InvalidThreshold => Self::InvalidThreshold,
            }
        }
    }

    impl<I2C, E> TemperatureSensor for Lm75bd<I2C>
    where
        I2C: I2c<u8, Error = E>,
        E: Error,
    {
        type Error = Lm75bdError<E>;

        async fn read_temperature(&mut self, address: u8) -> Result<f32, Self::Error> {
            Lm75bd::read_temperature(self, address).await
        }
    }
}

#[cfg(test)]
#[cfg(feature = "lm75bd")]
mod tests {
    extern crate std;
    use std::vec;

    use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    use thermal_drivers::lm75bd::{Config, Lm75bd, Lm75bdError};

    use crate::error::ErrorCode;

    use super::{SensorConfig, TemperatureSensor};

    #[test]
    fn lm75bd_error_codes() {
        let cases = [
            (
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
                ErrorCode::I2cNoAcknowledge,
            ),
            (ErrorKind::ArbitrationLoss, ErrorCode::I2cArbitrationLoss),
            (ErrorKind::Bus, ErrorCode::I2cBus),
            (ErrorKind::Overrun, ErrorCode::I2cOverrun),
            (ErrorKind::Other, ErrorCode::I2cOther),
        ];

        for (kind, code) in cases {
            assert_eq!(ErrorCode::from(Lm75bdError::I2c(kind)), code);
        }

        assert_eq!(
            ErrorCode::from(Lm75bdError::<ErrorKind>::InvalidThreshold),
            ErrorCode::InvalidThreshold
        );
    }

    #[tokio::test]
    async fn lm75bd_as_temperature_sensor() {
        let config = Config::new(0x48);
        let expectations = [I2cTransaction::write_read(
            config.address(),
            vec![0x00],
            vec![0x4C, 0x00],
        )];

        let mut i2c = I2cMock::new(&expectations);
        let mut sensor = Lm75bd::new(&mut i2c);

        let celsius = TemperatureSensor::read_temperature(&mut sensor, config.address())
            .await
            .unwrap();
        assert!((celsius - 76.0).abs() < f32::EPSILON);

        i2c.done();
    }
}
