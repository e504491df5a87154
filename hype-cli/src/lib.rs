//! Command-line front end for hype
//!
//! This crate provides argument parsing and the `dump`, `arp` and `ping`
//! commands. Commands are written against [`hype_capture::CaptureHandle`];
//! the `hype` binary wires them to a live interface.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use tracing::Level;

/// Map the number of `-v` flags to a log level
pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), Level::WARN);
        assert_eq!(log_level(1), Level::INFO);
        assert_eq!(log_level(2), Level::DEBUG);
        assert_eq!(log_level(3), Level::TRACE);
        assert_eq!(log_level(9), Level::TRACE);
    }
}
