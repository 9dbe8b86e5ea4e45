//! # Command Line
//!
//! `pov-capture [<device index>]`: the only argument selects the serial
//! device. Anything else is a usage error.

use clap::Parser;
use std::ffi::OsString;
use tracing::debug;

use crate::error::{CaptureError, Result};

/// Usage text printed on a bad invocation
pub const USAGE: &str = "\
Usage: pov-capture [<device index>]
<device index> selects /dev/ttyACM<device index>; 0 is used when omitted.
";

/// Parsed command line
#[derive(Debug, Parser)]
#[command(name = "pov-capture", disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Serial device index
    #[arg(default_value_t = 0)]
    pub device_index: u32,
}

/// Parse the device index from the full argument list (program name first)
///
/// # Returns
///
/// * `Result<u32>` - Device index, 0 when no argument is given
///
/// # Errors
///
/// Returns [`CaptureError::Usage`] for a non-numeric index, extra
/// arguments, or any flag.
pub fn parse_args<I, T>(args: I) -> Result<u32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
        .map(|args| args.device_index)
        .map_err(|e| {
            debug!("Argument error: {}", e);
            CaptureError::Usage
        })
}
