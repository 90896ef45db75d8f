//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "counter-timers")]
#[command(about = "A list of independent countdown timers with progress arcs")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// File keeping the last background timestamp across restarts
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Seconds between checks for system sleep
    #[arg(long, default_value = "15")]
    pub wake_check: u64,

    /// Minimum clock jump in seconds treated as system sleep
    #[arg(long, default_value = "5")]
    pub sleep_threshold: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn wake_check_interval(&self) -> Duration {
        Duration::from_secs(self.wake_check.max(1))
    }

    pub fn sleep_threshold(&self) -> Duration {
        Duration::from_secs(self.sleep_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = Config::try_parse_from(["counter-timers"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert!(config.state_file.is_none());
        assert_eq!(config.wake_check_interval(), Duration::from_secs(15));
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "counter-timers",
            "-p",
            "8080",
            "--state-file",
            "/tmp/timers.json",
            "--wake-check",
            "0",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.state_file, Some(PathBuf::from("/tmp/timers.json")));
        assert_eq!(config.wake_check_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "debug");
    }
}
