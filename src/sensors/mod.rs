//! Sensirion sensor drivers and the per-cycle polling source.
//!
//! Each driver speaks the Sensirion I2C framing: 16-bit big-endian
//! commands, data as 16-bit big-endian words each followed by a CRC-8, and
//! a fixed delay between command and readout. Drivers are generic over
//! [`embedded_hal::i2c::I2c`] and [`embedded_hal::delay::DelayNs`], so the
//! same code runs against the Linux i2cdev bus and against test fakes.

mod sgp40;
mod sht3x;
mod svm41;

pub use sgp40::Sgp40;
pub use sht3x::Sht3x;
pub use svm41::Svm41;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use thiserror::Error;

use crate::calibration::{self, CalibrationParams};

/// Errors surfaced by a sensor transaction.
///
/// Any error aborts the current sampling cycle; nothing is retried, the
/// loop simply waits for the next clock tick.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SensorError {
    /// The underlying I2C transaction failed.
    #[error("{sensor}: bus error during {operation}")]
    Bus {
        sensor: &'static str,
        operation: &'static str,
    },
    /// A response word failed its CRC-8 check.
    #[error("{sensor}: checksum mismatch in {operation} response")]
    Crc {
        sensor: &'static str,
        operation: &'static str,
    },
}

/// Log the underlying bus error (the structured error cannot carry the
/// bus-specific error type) and collapse it to [`SensorError::Bus`].
pub(crate) fn bus_error<E: core::fmt::Debug>(
    sensor: &'static str,
    operation: &'static str,
    err: E,
) -> SensorError {
    log::error!("{sensor}: I2C error during {operation}: {err:?}");
    SensorError::Bus { sensor, operation }
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF, computed over one data word.
pub(crate) fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Encode one data word as `hi, lo, crc` for a command parameter.
pub(crate) fn encode_word(word: u16) -> [u8; 3] {
    let bytes = word.to_be_bytes();
    [bytes[0], bytes[1], crc8(&bytes)]
}

/// Split a response buffer of `hi, lo, crc` triplets into validated words.
pub(crate) fn parse_words<const W: usize>(
    buf: &[u8],
    sensor: &'static str,
    operation: &'static str,
) -> Result<[u16; W], SensorError> {
    debug_assert_eq!(buf.len(), W * 3);
    let mut words = [0u16; W];
    for (i, chunk) in buf.chunks_exact(3).enumerate() {
        if crc8(&chunk[..2]) != chunk[2] {
            log::error!("{sensor}: CRC mismatch in {operation} response word {i}");
            return Err(SensorError::Crc { sensor, operation });
        }
        words[i] = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

/// One converted value per logged channel for a single successful cycle.
///
/// A `CycleSample` only exists for cycles in which every sensor read
/// succeeded; partial cycles never materialize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSample {
    pub sht31_temperature_c: f32,
    pub sht31_humidity_pct: f32,
    pub sgp40_raw_voc: u16,
    pub svm41_temperature_c: f32,
    pub svm41_humidity_pct: f32,
    pub svm41_raw_voc: u16,
    pub svm41_raw_nox: u16,
}

/// One full polling cycle across every sensor.
///
/// This is the seam between the pipeline and the hardware: production code
/// uses [`SensorBank`], tests drive the pipeline with scripted sources.
pub trait SampleSource {
    fn sample(&mut self) -> Result<CycleSample, SensorError>;
}

/// The three sensors of one deployment plus the calibration applied to
/// their raw ticks.
///
/// All bus reads for a cycle are sequential; the first failure aborts the
/// whole cycle so that no channel ever receives a partial contribution.
pub struct SensorBank<I, D> {
    sht3x: Sht3x<I, D>,
    sgp40: Sgp40<I, D>,
    svm41: Svm41<I, D>,
    calibration: CalibrationParams,
}

impl<I: I2c, D: DelayNs> SensorBank<I, D> {
    pub fn new(
        sht3x: Sht3x<I, D>,
        sgp40: Sgp40<I, D>,
        svm41: Svm41<I, D>,
        calibration: CalibrationParams,
    ) -> Self {
        Self {
            sht3x,
            sgp40,
            svm41,
            calibration,
        }
    }
}

impl<I: I2c, D: DelayNs> SampleSource for SensorBank<I, D> {
    fn sample(&mut self) -> Result<CycleSample, SensorError> {
        let sht = self.sht3x.measure_single_shot()?;

        // Offset compensation happens in tick space, once per cycle. The
        // SGP40 receives the compensated humidity ticks together with the
        // raw temperature ticks.
        let humidity_ticks = self
            .calibration
            .compensate_humidity_ticks(sht.humidity_ticks);

        let sgp40_raw_voc = self
            .sgp40
            .measure_raw_signal(humidity_ticks, sht.temperature_ticks)?;

        let svm = self.svm41.read_measured_raw_values()?;

        Ok(CycleSample {
            sht31_temperature_c: sht3x::signal_temperature(sht.temperature_ticks),
            sht31_humidity_pct: sht3x::signal_humidity(humidity_ticks),
            sgp40_raw_voc,
            svm41_temperature_c: calibration::svm41_temperature_c(svm.temperature_ticks),
            svm41_humidity_pct: calibration::svm41_humidity_pct(svm.humidity_ticks),
            svm41_raw_voc: svm.raw_voc,
            svm41_raw_nox: svm.raw_nox,
        })
    }
}
