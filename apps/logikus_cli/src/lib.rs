//! Command-line driver for the Logikus inference engine.
//!
//! The binary loads a program file, runs queries against it, and prints
//! each solution's bindings. Command logic lives here rather than in
//! `main.rs` so the handlers can be exercised directly by tests.

pub mod cli;

use std::error::Error;
use std::fmt;
use std::io;

pub use cli::run_cli;

/// Everything that can go wrong while driving the engine from the
/// command line.
#[derive(Debug)]
pub enum CliError {
    /// Reading the program file or writing output failed.
    Io(io::Error),
    /// The program or query text did not parse.
    Parse(logikus_parse::ParseError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{}", e),
            CliError::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<logikus_parse::ParseError> for CliError {
    fn from(e: logikus_parse::ParseError) -> Self {
        CliError::Parse(e)
    }
}
