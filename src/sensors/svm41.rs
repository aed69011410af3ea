//! SVM41 combined VOC/NOx/RH/T module, continuous measurement mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{SensorError, bus_error, parse_words};

/// SVM41 I2C address.
pub const SVM41_I2C_ADDRESS: u8 = 0x6A;

const CMD_DEVICE_RESET: [u8; 2] = [0xD3, 0x04];
const CMD_START_MEASUREMENT: [u8; 2] = [0x00, 0x10];
const CMD_READ_MEASURED_RAW_VALUES: [u8; 2] = [0x03, 0xD2];

const RESET_DELAY_MS: u32 = 100;
const START_DELAY_MS: u32 = 50;
const READ_DELAY_MS: u32 = 10;

const SENSOR: &str = "SVM41";

/// Raw values from one continuous-mode readout.
///
/// Humidity and temperature ticks are signed fixed-point (RH% × 100 and
/// °C × 200); VOC and NOx stay in tick units and are logged unconverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Svm41RawValues {
    pub humidity_ticks: i16,
    pub temperature_ticks: i16,
    pub raw_voc: u16,
    pub raw_nox: u16,
}

pub struct Svm41<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Svm41<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: SVM41_I2C_ADDRESS,
        }
    }

    /// Reset the device to its power-up state.
    pub fn device_reset(&mut self) -> Result<(), SensorError> {
        const OPERATION: &str = "device_reset";

        self.i2c
            .write(self.address, &CMD_DEVICE_RESET)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Start continuous measurement. Raw values become readable about one
    /// second later.
    pub fn start_measurement(&mut self) -> Result<(), SensorError> {
        const OPERATION: &str = "start_measurement";

        self.i2c
            .write(self.address, &CMD_START_MEASUREMENT)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;
        self.delay.delay_ms(START_DELAY_MS);
        Ok(())
    }

    /// Read the most recent raw values from the running measurement.
    pub fn read_measured_raw_values(&mut self) -> Result<Svm41RawValues, SensorError> {
        const OPERATION: &str = "read_measured_raw_values";

        self.i2c
            .write(self.address, &CMD_READ_MEASURED_RAW_VALUES)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        self.delay.delay_ms(READ_DELAY_MS);

        let mut buf = [0u8; 12];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        let [humidity, temperature, raw_voc, raw_nox] = parse_words::<4>(&buf, SENSOR, OPERATION)?;
        Ok(Svm41RawValues {
            humidity_ticks: humidity as i16,
            temperature_ticks: temperature as i16,
            raw_voc,
            raw_nox,
        })
    }
}
