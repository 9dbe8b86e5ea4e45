//! # Record Decoder
//!
//! Decodes one line of device input into a [`Record`] and formats it as a
//! human-readable log line.
//!
//! Wire format: `<state:int> <timing> <deltaX> <deltaY> <autoSlow>`, fields
//! separated by a single ASCII space. Only the state field is interpreted;
//! the other four pass through verbatim.

use crate::error::{CaptureError, Result};

/// Number of space-separated fields in a complete record
pub const RECORD_FIELD_COUNT: usize = 5;

/// Output line written for a record with the wrong field count
pub const CORRUPTED_LINE: &str = "CORRUPTED/INCOMPLETE DATA\n";

/// State bits that carry an indicator
pub const STATE_INDICATOR_MASK: i64 = 0xF;

/// Indicator labels in output order
const STATE_LABELS: [(i64, &str); 4] = [
    (1 << 0, "BLUE"),
    (1 << 1, "GREEN"),
    (1 << 2, "RED"),
    (1 << 3, "CLEAR"),
];

/// Label used when no indicator bit is set
const NOP_LABEL: &str = "NOP";

/// A complete input record
///
/// Borrows its pass-through fields from the raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Indicator bitmask
    pub state: i64,
    /// Timing value
    pub timing: &'a str,
    /// Horizontal movement since the previous record
    pub delta_x: &'a str,
    /// Vertical movement since the previous record
    pub delta_y: &'a str,
    /// Auto-slow flag
    pub auto_slow: &'a str,
}

/// Result of decoding one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedLine<'a> {
    /// All five fields present
    Record(Record<'a>),
    /// Field count was not [`RECORD_FIELD_COUNT`]
    Corrupted {
        /// State value parsed from the first field
        state: i64,
        /// Number of fields found
        field_count: usize,
    },
}

impl<'a> DecodedLine<'a> {
    /// Render the output line, including its trailing newline
    pub fn format(&self) -> String {
        match self {
            DecodedLine::Record(record) => record.format(),
            DecodedLine::Corrupted { .. } => CORRUPTED_LINE.to_string(),
        }
    }
}

impl<'a> Record<'a> {
    /// Render the record as a tab-separated log line
    ///
    /// ```
    /// use pov_capture::record::Record;
    ///
    /// let record = Record { state: 5, timing: "12345", delta_x: "10", delta_y: "-3", auto_slow: "1" };
    /// assert_eq!(
    ///     record.format(),
    ///     "BLUE RED \t12345\tdeltaX: 10\tdeltaY: -3\tAuto-slow on: 1\n"
    /// );
    /// ```
    pub fn format(&self) -> String {
        format!(
            "{}\t{}\tdeltaX: {}\tdeltaY: {}\tAuto-slow on: {}\n",
            state_words(self.state),
            self.timing,
            self.delta_x,
            self.delta_y,
            self.auto_slow
        )
    }
}

/// Describe the indicator bits of a state value
///
/// Each set indicator contributes its label followed by a space, in the
/// order BLUE, GREEN, RED, CLEAR. With no indicator set the result is
/// `"NOP "`. Bits above bit 3 are ignored.
pub fn state_words(state: i64) -> String {
    if state & STATE_INDICATOR_MASK == 0 {
        return format!("{} ", NOP_LABEL);
    }

    STATE_LABELS
        .iter()
        .filter(|(bit, _)| state & bit != 0)
        .map(|(_, label)| format!("{} ", label))
        .collect()
}

/// Parse the state field as a decimal integer
///
/// # Errors
///
/// Returns [`CaptureError::StateParse`] if the field is not an integer.
pub fn parse_state(field: &str) -> Result<i64> {
    field.parse::<i64>().map_err(|source| CaptureError::StateParse {
        field: field.to_string(),
        source,
    })
}

/// Decode a raw input line
///
/// Line terminators are stripped before splitting. The state field is parsed
/// before the field count is checked, so a non-numeric state fails even on a
/// short line.
///
/// # Arguments
///
/// * `line` - Raw line as read from the device, terminator included or not
///
/// # Returns
///
/// * `Result<DecodedLine>` - Complete record or corrupted marker
///
/// # Errors
///
/// Returns [`CaptureError::StateParse`] if the first field is not an integer.
pub fn decode_line(line: &str) -> Result<DecodedLine<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split(' ').collect();

    let state = parse_state(fields[0])?;

    match fields[..] {
        [_, timing, delta_x, delta_y, auto_slow] => Ok(DecodedLine::Record(Record {
            state,
            timing,
            delta_x,
            delta_y,
            auto_slow,
        })),
        _ => Ok(DecodedLine::Corrupted {
            state,
            field_count: fields.len(),
        }),
    }
}

/// Decode a raw input line and render its output line
pub fn format_line(line: &str) -> Result<String> {
    Ok(decode_line(line)?.format())
}
