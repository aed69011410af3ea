//! Running-sum state for the current oversampling window.

use crate::config::SampleWindow;
use crate::sensors::CycleSample;

/// Per-channel running sums plus the shared sample counter.
///
/// All channels advance in lockstep: a cycle either contributes to every
/// channel ([`ingest`](Self::ingest)) or to none (the caller skips the
/// cycle entirely). Continuous channels accumulate in `f64`; raw discrete
/// channels accumulate in `u64` and average with truncating integer
/// division.
#[derive(Debug)]
pub struct Accumulator {
    window: SampleWindow,
    sht31_temperature_sum: f64,
    sht31_humidity_sum: f64,
    sgp40_voc_sum: u64,
    svm41_temperature_sum: f64,
    svm41_humidity_sum: f64,
    svm41_voc_sum: u64,
    svm41_nox_sum: u64,
    sample_count: u32,
}

/// Averages over one completed window, in declared channel order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverages {
    pub sht31_temperature_c: f64,
    pub sht31_humidity_pct: f64,
    pub sgp40_raw_voc: u64,
    pub svm41_temperature_c: f64,
    pub svm41_humidity_pct: f64,
    pub svm41_raw_voc: u64,
    pub svm41_raw_nox: u64,
}

impl Accumulator {
    /// Create an empty accumulator for the given window size.
    pub fn new(window: SampleWindow) -> Self {
        Self {
            window,
            sht31_temperature_sum: 0.0,
            sht31_humidity_sum: 0.0,
            sgp40_voc_sum: 0,
            svm41_temperature_sum: 0.0,
            svm41_humidity_sum: 0.0,
            svm41_voc_sum: 0,
            svm41_nox_sum: 0,
            sample_count: 0,
        }
    }

    /// Add one successful cycle to every channel.
    pub fn ingest(&mut self, sample: &CycleSample) {
        self.sht31_temperature_sum += f64::from(sample.sht31_temperature_c);
        self.sht31_humidity_sum += f64::from(sample.sht31_humidity_pct);
        self.sgp40_voc_sum += u64::from(sample.sgp40_raw_voc);
        self.svm41_temperature_sum += f64::from(sample.svm41_temperature_c);
        self.svm41_humidity_sum += f64::from(sample.svm41_humidity_pct);
        self.svm41_voc_sum += u64::from(sample.svm41_raw_voc);
        self.svm41_nox_sum += u64::from(sample.svm41_raw_nox);
        self.sample_count += 1;
    }

    /// Number of successful cycles accumulated so far.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether the window is complete and ready to drain.
    pub fn is_full(&self) -> bool {
        self.sample_count >= self.window.get()
    }

    /// Compute per-channel averages and reset all state for the next
    /// window.
    ///
    /// Must only be called when [`is_full`](Self::is_full). The truncating
    /// integer division for discrete channels is deliberate policy, not an
    /// accident.
    pub fn drain(&mut self) -> WindowAverages {
        debug_assert!(self.is_full(), "drain called on a partial window");

        let count = u64::from(self.window.get());
        let averages = WindowAverages {
            sht31_temperature_c: self.sht31_temperature_sum / count as f64,
            sht31_humidity_pct: self.sht31_humidity_sum / count as f64,
            sgp40_raw_voc: self.sgp40_voc_sum / count,
            svm41_temperature_c: self.svm41_temperature_sum / count as f64,
            svm41_humidity_pct: self.svm41_humidity_sum / count as f64,
            svm41_raw_voc: self.svm41_voc_sum / count,
            svm41_raw_nox: self.svm41_nox_sum / count,
        };

        *self = Self::new(self.window);
        averages
    }
}
