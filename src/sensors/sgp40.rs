//! SGP40 VOC sensor, raw-signal measurement with on-chip compensation.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{SensorError, bus_error, encode_word, parse_words};

/// SGP40 I2C address.
pub const SGP40_I2C_ADDRESS: u8 = 0x59;

/// Measure raw signal, parameterized with humidity and temperature ticks.
const CMD_MEASURE_RAW_SIGNAL: [u8; 2] = [0x26, 0x0F];

/// Measurement duration per the SGP40 datasheet.
const MEASUREMENT_DELAY_MS: u32 = 30;

const SENSOR: &str = "SGP40";

pub struct Sgp40<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Sgp40<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: SGP40_I2C_ADDRESS,
        }
    }

    /// Measure the raw VOC signal.
    ///
    /// `humidity_ticks` and `temperature_ticks` are the on-chip
    /// compensation parameters, in SHT3x tick units. The caller passes the
    /// offset-compensated humidity ticks so the compensation is applied
    /// exactly once per cycle.
    pub fn measure_raw_signal(
        &mut self,
        humidity_ticks: u16,
        temperature_ticks: u16,
    ) -> Result<u16, SensorError> {
        const OPERATION: &str = "measure_raw_signal";

        let mut cmd = [0u8; 8];
        cmd[..2].copy_from_slice(&CMD_MEASURE_RAW_SIGNAL);
        cmd[2..5].copy_from_slice(&encode_word(humidity_ticks));
        cmd[5..8].copy_from_slice(&encode_word(temperature_ticks));

        self.i2c
            .write(self.address, &cmd)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        self.delay.delay_ms(MEASUREMENT_DELAY_MS);

        let mut buf = [0u8; 3];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        let [raw_voc] = parse_words::<1>(&buf, SENSOR, OPERATION)?;
        Ok(raw_voc)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::{FakeI2c, NoDelay};
    use super::*;

    #[test]
    fn test_measure_raw_signal_encodes_compensation_words() {
        let fake = FakeI2c::new(vec![encode_word(1234).to_vec()]);
        let writes = fake.writes.clone();
        let mut sgp40 = Sgp40::new(fake, NoDelay);

        let raw_voc = sgp40.measure_raw_signal(0x8000, 0x6666).unwrap();
        assert_eq!(raw_voc, 1234);

        let writes = writes.borrow();
        assert_eq!(writes[0][..2], CMD_MEASURE_RAW_SIGNAL);
        assert_eq!(writes[0][2..5], encode_word(0x8000));
        assert_eq!(writes[0][5..8], encode_word(0x6666));
    }

    #[test]
    fn test_bus_failure_is_reported() {
        let mut fake = FakeI2c::new(vec![]);
        fake.fail_on_command = Some(CMD_MEASURE_RAW_SIGNAL);
        let mut sgp40 = Sgp40::new(fake, NoDelay);

        assert_eq!(
            sgp40.measure_raw_signal(0, 0),
            Err(SensorError::Bus {
                sensor: "SGP40",
                operation: "measure_raw_signal",
            })
        );
    }
}
