//! The fixed-period sample loop: clock, orchestration, record emission.

use std::io;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::config::SampleWindow;
use crate::sensors::SampleSource;
use crate::storage::{Accumulator, CsvLog, LogRecord};

/// Fixed interval between sampling cycles.
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Timestamp format for emitted records: local time, second resolution.
const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Drives the loop at a fixed period.
///
/// The clock sleeps the full period between cycles; cycle execution time
/// is not subtracted, so the effective period is the fixed interval plus
/// however long the cycle took. Nothing here is hard real-time, each tick
/// is independent and there is no catch-up on long cycles.
#[derive(Debug, Clone, Copy)]
pub struct SampleClock {
    period: Duration,
}

impl SampleClock {
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Block until the next cycle is due.
    pub fn wait(&self) {
        thread::sleep(self.period);
    }
}

impl Default for SampleClock {
    fn default() -> Self {
        Self::new(SAMPLE_PERIOD)
    }
}

/// The sampling-aggregation-logging pipeline.
///
/// Owns every piece of mutable state (clock, sample source, the
/// accumulator for the current window, the record log), so there are no
/// process-wide singletons. Single-threaded by construction.
pub struct Pipeline<S> {
    clock: SampleClock,
    source: S,
    accumulator: Accumulator,
    log: CsvLog,
}

impl<S: SampleSource> Pipeline<S> {
    pub fn new(clock: SampleClock, source: S, window: SampleWindow, log: CsvLog) -> Self {
        Self {
            clock,
            source,
            accumulator: Accumulator::new(window),
            log,
        }
    }

    /// Run one cycle: poll, accumulate, emit when the window completes.
    ///
    /// Returns the emitted record if this cycle completed a window. A
    /// failed sensor read discards the whole cycle: no channel is touched
    /// and the sample counter does not advance; the window just takes
    /// longer in wall-clock time to fill.
    pub fn tick(&mut self) -> io::Result<Option<LogRecord>> {
        let sample = match self.source.sample() {
            Ok(sample) => sample,
            Err(e) => {
                // The driver already reported the details
                log::debug!("cycle aborted: {e}");
                return Ok(None);
            }
        };

        self.accumulator.ingest(&sample);
        if !self.accumulator.is_full() {
            return Ok(None);
        }

        let averages = self.accumulator.drain();
        let record = LogRecord {
            // Stamped at drain time, not window-start time
            timestamp: Local::now().format(RECORD_TIMESTAMP_FORMAT).to_string(),
            averages,
        };
        self.log.append(&record)?;
        self.log_summary(&record);
        Ok(Some(record))
    }

    fn log_summary(&self, record: &LogRecord) {
        let a = &record.averages;
        log::info!(
            "[SHT31 + SGP40] Temp: {:.2} °C | Hum: {:.2} % | VOC Raw: {}",
            a.sht31_temperature_c,
            a.sht31_humidity_pct,
            a.sgp40_raw_voc
        );
        log::info!(
            "[SVM41]         Temp: {:.2} °C | Hum: {:.2} % | VOC Raw: {} | NOX Raw: {}",
            a.svm41_temperature_c,
            a.svm41_humidity_pct,
            a.svm41_raw_voc,
            a.svm41_raw_nox
        );
        log::info!("Timestamp:     {}", record.timestamp);
    }

    /// Run the loop until the process is terminated.
    ///
    /// There is no graceful-shutdown protocol: a partially filled window
    /// at termination is discarded, never flushed. An append failure loses
    /// the drained window; the next window accumulates fresh.
    pub fn run(&mut self) -> ! {
        loop {
            self.clock.wait();
            if let Err(e) = self.tick() {
                log::error!("failed to append record: {e}");
            }
        }
    }
}
