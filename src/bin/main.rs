//! airlog-rs: oversampling CSV logger for SHT31/SGP40/SVM41 sensors.
//!
//! Samples every sensor once per second over the shared I2C bus, averages
//! a configurable window of cycles per channel, and appends one
//! timestamped record per completed window to a CSV file under `logs/`.
//!
//! Usage: `airlog-rs [tag]`. The optional positional tag is embedded in
//! the log file name. Exits 1 if the log file cannot be opened.

use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::Local;
use embedded_hal_bus::i2c::RefCellDevice;
use linux_embedded_hal::{Delay, I2cdev};
use log::{error, info, warn};

use airlog_rs::config::Config;
use airlog_rs::sampling::{Pipeline, SampleClock};
use airlog_rs::sensors::{SensorBank, Sgp40, Sht3x, Svm41};
use airlog_rs::storage::csv_log::{self, CsvLog};

/// Directory that receives the CSV logs.
const LOG_DIR: &str = "logs";

/// Configuration file, looked up in the working directory.
const CONFIG_FILE: &str = "config.txt";

/// I2C character device for the sensor bus.
const I2C_BUS: &str = "/dev/i2c-1";

/// Timestamp format for log file names (filesystem-safe, no colons).
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load(Path::new(CONFIG_FILE));
    info!(
        "Configuration: oversample_count = {}, humidity_offset = {:.2}",
        config.window.get(),
        config.calibration.humidity_offset_pct
    );

    // The tag is the only accepted argument; no flags
    let tag = env::args().nth(1);
    let timestamp = Local::now().format(FILE_TIMESTAMP_FORMAT).to_string();
    let file_name = csv_log::log_file_name(tag.as_deref(), &timestamp);

    // Creating the directory when it already exists is fine; any other
    // failure surfaces as the log-open error below
    let _ = fs::create_dir_all(LOG_DIR);

    let path = Path::new(LOG_DIR).join(file_name);
    let log = match CsvLog::create(&path) {
        Ok(log) => log,
        Err(e) => {
            error!("failed to open log file {}: {e}", path.display());
            return ExitCode::from(1);
        }
    };
    info!("Logging to file: {}", path.display());

    let i2c = match I2cdev::new(I2C_BUS) {
        Ok(dev) => dev,
        Err(e) => {
            error!("failed to open I2C bus {I2C_BUS}: {e}");
            return ExitCode::from(1);
        }
    };
    let bus = RefCell::new(i2c);

    let sht3x = Sht3x::new(RefCellDevice::new(&bus), Delay);
    let sgp40 = Sgp40::new(RefCellDevice::new(&bus), Delay);
    let mut svm41 = Svm41::new(RefCellDevice::new(&bus), Delay);

    // Startup failures are reported but not fatal: the module may still
    // come up, and every cycle read checks for itself
    if let Err(e) = svm41.device_reset() {
        warn!("SVM41 reset failed: {e}");
    }
    if let Err(e) = svm41.start_measurement() {
        warn!("SVM41 start measurement failed: {e}");
    }

    let bank = SensorBank::new(sht3x, sgp40, svm41, config.calibration);
    let mut pipeline = Pipeline::new(SampleClock::default(), bank, config.window, log);
    pipeline.run()
}
