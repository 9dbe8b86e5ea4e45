//! # Capture Loop
//!
//! Reads records from the serial line, formats them and appends them to the
//! rotating output file until shutdown or a fatal error.
//!
//! The loop exclusively owns both the line source and the output file. Each
//! iteration waits for one line (the only suspension point), then decodes,
//! formats and writes it synchronously.

use std::future::Future;
use tokio::io::AsyncBufRead;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::output::{Clock, LogSummary, RotatingLog};
use crate::record::{decode_line, DecodedLine};
use crate::serial::read_line;

/// Single-owner capture loop
pub struct CaptureLoop<R, C: Clock> {
    reader: R,
    log: RotatingLog<C>,
    line_buf: Vec<u8>,
}

impl<R, C: Clock> std::fmt::Debug for CaptureLoop<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureLoop")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl<R, C> CaptureLoop<R, C>
where
    R: AsyncBufRead + Unpin,
    C: Clock,
{
    /// Create a loop over an open line source and output file
    pub fn new(reader: R, log: RotatingLog<C>) -> Self {
        Self {
            reader,
            log,
            line_buf: Vec::new(),
        }
    }

    /// Current output file state
    pub fn log(&self) -> &RotatingLog<C> {
        &self.log
    }

    /// Handle one raw line: echo it, decode it and write the output line
    ///
    /// Lines with the wrong field count produce the corrupted-data sentinel.
    ///
    /// # Errors
    ///
    /// Returns error if the state field is not an integer or the write fails
    pub fn process_line(&mut self, raw: &str) -> Result<()> {
        println!("{}", raw.trim_end_matches(['\r', '\n']));

        let decoded = decode_line(raw)?;
        if let DecodedLine::Corrupted { field_count, .. } = decoded {
            debug!("Corrupted record with {} fields: {:?}", field_count, raw);
        }

        self.log.write_line(&decoded.format())
    }

    /// Run until `shutdown` resolves or a fatal error occurs
    ///
    /// The output file is flushed and closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a read failure, end of stream, an
    /// unparsable state field, or an output write failure.
    pub async fn run<S>(mut self, shutdown: S) -> Result<LogSummary>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let outcome = loop {
            let line = tokio::select! {
                line = read_line(&mut self.reader, &mut self.line_buf) => line,
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping capture");
                    break Ok(());
                }
            };

            if let Err(e) = line.and_then(|raw| self.process_line(&raw)) {
                break Err(e);
            }
        };

        finish(outcome, self.log.close())
    }
}

/// Combine the loop outcome with the result of closing the output file
///
/// A fatal loop error takes precedence; a close failure behind it is logged.
fn finish(outcome: Result<()>, closed: Result<LogSummary>) -> Result<LogSummary> {
    match outcome {
        Ok(()) => closed,
        Err(e) => {
            if let Err(close_err) = closed {
                warn!("Failed to close output file after fatal error: {}", close_err);
            }
            Err(e)
        }
    }
}
