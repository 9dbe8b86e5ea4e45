//! # Output Module
//!
//! Writes formatted records to timestamped text files with rotation.
//!
//! This module handles:
//! - Naming output files `<prefix><Weekday_DD_Mon_YYYY_HH.MM.SS>.txt`
//! - Keeping exactly one output file open at a time
//! - Counting records in the current file
//! - Rotating to a fresh file once the per-file limit is reached

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::OutputConfig;
use crate::error::Result;

/// strftime pattern for the timestamp embedded in file names
pub const TIMESTAMP_FORMAT: &str = "%a_%d_%b_%Y_%H.%M.%S";

/// Output file extension
pub const FILE_EXTENSION: &str = "txt";

/// Source of wall-clock time for file names
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// [`Clock`] backed by the system's local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format a timestamp for use in an output file name
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pov_capture::output::format_timestamp;
///
/// let t = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
/// assert_eq!(format_timestamp(&t), "Tue_05_Mar_2024_14.07.09");
/// ```
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the output file path for a timestamp
///
/// # Arguments
///
/// * `directory` - Existing output directory
/// * `file_prefix` - File name prefix (e.g., "POV_Raw_Input_")
/// * `timestamp` - Timestamp from [`format_timestamp`]
///
/// # Returns
///
/// * `PathBuf` - `<directory>/<file_prefix><timestamp>.txt`
pub fn log_file_path(directory: &Path, file_prefix: &str, timestamp: &str) -> PathBuf {
    directory.join(format!("{}{}.{}", file_prefix, timestamp, FILE_EXTENSION))
}

/// Totals reported when a [`RotatingLog`] is closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    /// Records written across all files
    pub total_records: u64,
    /// Number of rotations performed
    pub rotations: u64,
    /// Last file written
    pub last_file: PathBuf,
}

/// Rotating output file
///
/// Owns the single open output file. The file is replaced by a new
/// timestamped one after `records_per_file` records.
pub struct RotatingLog<C: Clock> {
    /// Open file; `None` only between closing and reopening during rotation
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    directory: PathBuf,
    file_prefix: String,
    records_per_file: u64,
    line_count: u64,
    total_records: u64,
    rotations: u64,
    clock: C,
}

impl<C: Clock> std::fmt::Debug for RotatingLog<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLog")
            .field("path", &self.path)
            .field("line_count", &self.line_count)
            .field("rotations", &self.rotations)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> RotatingLog<C> {
    /// Open the first output file
    ///
    /// The output directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created
    pub fn create(config: &OutputConfig, clock: C) -> Result<Self> {
        let (path, writer) = open_log_file(&config.directory, &config.file_prefix, &clock)?;

        Ok(Self {
            writer: Some(writer),
            path,
            directory: config.directory.clone(),
            file_prefix: config.file_prefix.clone(),
            records_per_file: config.records_per_file,
            line_count: 0,
            total_records: 0,
            rotations: 0,
            clock,
        })
    }

    /// Append one formatted line, rotating if the file is full
    ///
    /// The line is written as-is; it must carry its own terminator.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no output file open"))?
            .write_all(line.as_bytes())?;
        self.line_count += 1;
        self.total_records += 1;

        if self.line_count >= self.records_per_file {
            self.rotate()?;
        }

        Ok(())
    }

    /// Close the current file and open a new one
    ///
    /// The previous file is closed before the new timestamp is taken, so at
    /// most one output file is ever open. The line counter restarts at zero.
    pub fn rotate(&mut self) -> Result<()> {
        self.close_writer()?;
        debug!("Closed {} after {} records", self.path.display(), self.line_count);

        let (path, writer) = open_log_file(&self.directory, &self.file_prefix, &self.clock)?;
        self.writer = Some(writer);
        self.path = path;
        self.line_count = 0;
        self.rotations += 1;

        info!("Rotated output to {}", self.path.display());
        Ok(())
    }

    /// Flush and close the current file
    pub fn close(mut self) -> Result<LogSummary> {
        self.close_writer()?;
        info!(
            "Closed {} ({} records total, {} rotations)",
            self.path.display(),
            self.total_records,
            self.rotations
        );

        Ok(LogSummary {
            total_records: self.total_records,
            rotations: self.rotations,
            last_file: self.path,
        })
    }

    /// Path of the file currently being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written to the current file
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Records written across all files
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Rotations performed so far
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Flush the open file and release its handle
    fn close_writer(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            drop(file);
        }
        Ok(())
    }
}

fn open_log_file<C: Clock>(
    directory: &Path,
    file_prefix: &str,
    clock: &C,
) -> Result<(PathBuf, BufWriter<File>)> {
    let timestamp = format_timestamp(&clock.now());
    let path = log_file_path(directory, file_prefix, &timestamp);

    if path.exists() {
        warn!("Overwriting existing output file {}", path.display());
    }

    let file = File::create(&path)?;
    info!("Writing records to {}", path.display());

    Ok((path, BufWriter::new(file)))
}
