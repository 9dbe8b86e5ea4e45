//! # POV Capture Library
//!
//! Capture status records from a POV display controller over serial.
//!
//! Each line from the device is decoded into a state bitmask plus four
//! pass-through fields, formatted as readable text, and appended to a
//! timestamped output file that rotates after a fixed number of records.

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod serial;
