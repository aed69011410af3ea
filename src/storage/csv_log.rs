//! Append-only CSV record log.
//!
//! The file is exclusively owned by the process for its lifetime: one
//! writer, no concurrent access. Records are flushed as they are written
//! so an external tailing process only ever observes complete rows.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use super::accumulator::WindowAverages;

/// Header row, written only when the file is empty at open time.
pub const CSV_HEADER: &str = "Timestamp,Temperature_C_sht31,Humidity_pct_sht31,Raw_VOC_sgp40,Temperature_C_svm41,Humidity_pct_svm41,Raw_VOC_svm41,Raw_NOX_svm41";

/// One emitted row: drain-time timestamp plus the window averages.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Local time at drain time, `YYYY-MM-DD_HH:MM:SS`.
    pub timestamp: String,
    pub averages: WindowAverages,
}

impl LogRecord {
    /// Format the record as one CSV line, without the trailing newline.
    ///
    /// Continuous channels print with two decimals, raw discrete channels
    /// as bare unsigned integers, in the declared column order.
    pub fn to_csv_row(&self) -> String {
        let a = &self.averages;
        format!(
            "{},{:.2},{:.2},{},{:.2},{:.2},{},{}",
            self.timestamp,
            a.sht31_temperature_c,
            a.sht31_humidity_pct,
            a.sgp40_raw_voc,
            a.svm41_temperature_c,
            a.svm41_humidity_pct,
            a.svm41_raw_voc,
            a.svm41_raw_nox,
        )
    }
}

/// Build the log file name: `<tag>_<timestamp>.csv`, or
/// `log_<timestamp>.csv` when no tag is given.
pub fn log_file_name(tag: Option<&str>, timestamp: &str) -> String {
    match tag {
        Some(tag) => format!("{tag}_{timestamp}.csv"),
        None => format!("log_{timestamp}.csv"),
    }
}

/// Exclusive append-only writer for the record log.
pub struct CsvLog {
    file: File,
}

impl CsvLog {
    /// Open `path` for appending, writing the header row iff the file is
    /// empty.
    ///
    /// Emptiness is detected by seeking to the end and checking the
    /// length, so re-running against an existing log appends without
    /// duplicating the header.
    pub fn create(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        let len = file.seek(SeekFrom::End(0))?;
        if len == 0 {
            file.write_all(CSV_HEADER.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
        }

        Ok(Self { file })
    }

    /// Append one record and flush immediately.
    ///
    /// The row goes out in a single write so a tailing reader never
    /// observes a partial record; the flush makes a completed window
    /// durable before the next cycle starts.
    pub fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        let mut row = record.to_csv_row();
        row.push('\n');
        self.file.write_all(row.as_bytes())?;
        self.file.flush()
    }
}
