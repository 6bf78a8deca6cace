//! Configuration and CLI argument handling

use clap::Parser;

/// Port the timer backend listens on; not configurable
pub const BACKEND_PORT: u16 = 7654;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "timer-panel")]
#[command(about = "A control panel for five countdown slots on a WebSocket timer backend")]
#[command(version)]
pub struct Config {
    /// Port to serve the panel on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Host address to serve the panel on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Host running the timer backend
    #[arg(short, long, default_value = "localhost")]
    pub backend_host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the panel address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// WebSocket endpoint of the timer backend
    pub fn backend_uri(&self) -> String {
        format!("ws://{}:{}", self.backend_host, BACKEND_PORT)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["timer-panel"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.backend_uri(), "ws://localhost:7654");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn backend_port_is_fixed() {
        let args = ["timer-panel", "-b", "timers.lan", "-p", "9000", "-v"];
        let config = Config::try_parse_from(args).unwrap();
        assert_eq!(config.backend_uri(), "ws://timers.lan:7654");
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.log_level(), "debug");
    }
}
