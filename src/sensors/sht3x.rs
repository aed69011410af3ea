//! SHT31 temperature/humidity sensor, single-shot mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{SensorError, bus_error, parse_words};

/// Default SHT31 I2C address (ADDR pin pulled low).
pub const SHT31_I2C_ADDRESS: u8 = 0x44;

/// Single-shot measurement, high repeatability, no clock stretching.
const CMD_MEASURE_SINGLE_SHOT_HIGH: [u8; 2] = [0x24, 0x00];

/// Worst-case duration of a high-repeatability measurement.
const MEASUREMENT_DELAY_MS: u32 = 16;

const SENSOR: &str = "SHT31";

/// Raw ticks from one single-shot measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sht3xReading {
    pub temperature_ticks: u16,
    pub humidity_ticks: u16,
}

pub struct Sht3x<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Sht3x<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: SHT31_I2C_ADDRESS,
        }
    }

    /// Trigger one high-repeatability measurement and read both signals.
    pub fn measure_single_shot(&mut self) -> Result<Sht3xReading, SensorError> {
        const OPERATION: &str = "measure_single_shot";

        self.i2c
            .write(self.address, &CMD_MEASURE_SINGLE_SHOT_HIGH)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        self.delay.delay_ms(MEASUREMENT_DELAY_MS);

        let mut buf = [0u8; 6];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|e| bus_error(SENSOR, OPERATION, e))?;

        let [temperature_ticks, humidity_ticks] = parse_words::<2>(&buf, SENSOR, OPERATION)?;
        Ok(Sht3xReading {
            temperature_ticks,
            humidity_ticks,
        })
    }
}

/// Tick-to-Celsius transfer function from the SHT3x datasheet.
pub fn signal_temperature(ticks: u16) -> f32 {
    -45.0 + 175.0 * f32::from(ticks) / 65535.0
}

/// Tick-to-percent transfer function from the SHT3x datasheet.
pub fn signal_humidity(ticks: u16) -> f32 {
    100.0 * f32::from(ticks) / 65535.0
}

#[cfg(test)]
mod tests {
    use super::super::encode_word;
    use super::super::fake::{FakeI2c, NoDelay};
    use super::*;

    #[test]
    fn test_transfer_functions_at_full_scale() {
        assert_eq!(signal_temperature(0), -45.0);
        assert_eq!(signal_temperature(65535), 130.0);
        assert_eq!(signal_humidity(0), 0.0);
        assert_eq!(signal_humidity(65535), 100.0);
    }

    #[test]
    fn test_measure_single_shot_parses_both_words() {
        let mut response = encode_word(0x6123).to_vec();
        response.extend_from_slice(&encode_word(0x8000));
        let mut sht3x = Sht3x::new(FakeI2c::new(vec![response]), NoDelay);

        let reading = sht3x.measure_single_shot().unwrap();
        assert_eq!(reading.temperature_ticks, 0x6123);
        assert_eq!(reading.humidity_ticks, 0x8000);
    }

    #[test]
    fn test_measure_single_shot_sends_high_repeatability_command() {
        let mut response = encode_word(1).to_vec();
        response.extend_from_slice(&encode_word(2));
        let fake = FakeI2c::new(vec![response]);
        let writes = fake.writes.clone();
        let mut sht3x = Sht3x::new(fake, NoDelay);

        sht3x.measure_single_shot().unwrap();
        assert_eq!(writes.borrow()[0], CMD_MEASURE_SINGLE_SHOT_HIGH);
    }

    #[test]
    fn test_corrupted_response_is_a_crc_error() {
        let mut response = encode_word(0x6123).to_vec();
        response.extend_from_slice(&encode_word(0x8000));
        response[5] ^= 0x01;
        let mut sht3x = Sht3x::new(FakeI2c::new(vec![response]), NoDelay);

        assert_eq!(
            sht3x.measure_single_shot(),
            Err(SensorError::Crc {
                sensor: "SHT31",
                operation: "measure_single_shot",
            })
        );
    }
}
