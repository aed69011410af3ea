pub mod accumulator;
pub mod csv_log;

pub use accumulator::{Accumulator, WindowAverages};
pub use csv_log::{CSV_HEADER, CsvLog, LogRecord};
