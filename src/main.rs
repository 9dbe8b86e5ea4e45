//! # POV Capture
//!
//! Log POV display controller status records from a serial device.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Parse the device index (usage text and exit status 1 on bad arguments)
//!    - Set up logging with tracing subscriber
//!    - Load configuration, open the serial device and the first output file
//!
//! 2. **Main Loop**
//!    - Read one line, decode it and append the formatted record
//!    - Rotate the output file every 18000 records
//!
//! 3. **Shutdown**
//!    - Ctrl+C flushes and closes the current file
//!    - Any read, parse or write failure ends the process with an error
//!
//! Expected output:
//! ```text
//! INFO pov_capture: POV Capture v0.1.0 starting...
//! INFO pov_capture: Capturing from /dev/ttyACM0
//! INFO pov_capture::serial: Opened serial device at /dev/ttyACM0
//! INFO pov_capture::output: Writing records to ./data/POV_Raw_Input_Tue_14_Nov_2023_22.13.20.txt
//! 5 12345 10 -3 1
//! ```

use anyhow::Result;
use tracing::{info, warn};

use pov_capture::capture::CaptureLoop;
use pov_capture::cli::{parse_args, USAGE};
use pov_capture::config::CaptureConfig;
use pov_capture::output::{RotatingLog, SystemClock};
use pov_capture::serial::CaptureSerial;

#[tokio::main]
async fn main() -> Result<()> {
    let device_index = match parse_args(std::env::args_os()) {
        Ok(index) => index,
        Err(_) => {
            print!("{}", USAGE);
            std::process::exit(1);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("POV Capture v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = CaptureConfig::from_env()?;
    let device_path = config.device_path(device_index);
    info!("Capturing from {}", device_path);

    let serial = CaptureSerial::open(&device_path, config.serial.baud_rate)?;
    let log = RotatingLog::create(&config.output, SystemClock)?;

    info!("Press Ctrl+C to exit");
    let summary = CaptureLoop::new(serial.into_reader(), log)
        .run(shutdown_signal())
        .await?;

    info!(
        "Captured {} records into {} file(s)",
        summary.total_records,
        summary.rotations + 1
    );

    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
