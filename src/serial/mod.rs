//! # Serial Communication Module
//!
//! Handles the serial connection to the POV display controller.
//!
//! This module handles:
//! - Opening the serial port at 115,200 baud (8N1, no flow control)
//! - Reading newline-terminated records from the port

use crate::error::{CaptureError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Baud rate of the display controller link
pub const CAPTURE_BAUD_RATE: u32 = 115_200;

/// Serial Port Handler
///
/// Owns the connection to the display controller for the lifetime of the
/// capture.
pub struct CaptureSerial {
    /// Buffered serial port handle
    reader: BufReader<tokio_serial::SerialStream>,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl std::fmt::Debug for CaptureSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl CaptureSerial {
    /// Open the serial device at `path`
    ///
    /// There is no retry: a device that cannot be opened is a fatal error.
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Line speed, normally [`CAPTURE_BAUD_RATE`]
    ///
    /// # Returns
    ///
    /// * `Result<CaptureSerial>` - Connected serial port or error
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Serial`] if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pov_capture::serial::{CaptureSerial, CAPTURE_BAUD_RATE};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = CaptureSerial::open("/dev/ttyACM0", CAPTURE_BAUD_RATE)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", path, baud_rate);
        let port = Self::open_port(path, baud_rate)?;
        info!("Opened serial device at {}", path);

        Ok(Self {
            reader: BufReader::new(port),
            device_path: path.to_string(),
        })
    }

    /// Open a specific serial port with 8N1 settings
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| CaptureError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Hand over the buffered reader for line-by-line capture
    pub fn into_reader(self) -> BufReader<tokio_serial::SerialStream> {
        self.reader
    }
}

/// Read one line from `reader`
///
/// Waits without timeout until a newline or end of stream. The returned
/// line keeps its terminator; invalid UTF-8 is replaced lossily. `buf` is
/// scratch space reused between calls.
///
/// # Arguments
///
/// * `reader` - Buffered line source (the serial port in production)
/// * `buf` - Scratch buffer, cleared on entry
///
/// # Returns
///
/// * `Result<String>` - One line, terminator included when present
///
/// # Errors
///
/// - [`CaptureError::SerialClosed`] at end of stream
/// - [`CaptureError::Serial`] if the read fails
pub async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();

    let n = reader
        .read_until(b'\n', buf)
        .await
        .map_err(|e| CaptureError::Serial(format!("Failed to read line: {}", e)))?;

    if n == 0 {
        return Err(CaptureError::SerialClosed);
    }

    Ok(String::from_utf8_lossy(buf).into_owned())
}
