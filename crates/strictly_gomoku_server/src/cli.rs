//! Command-line interface for the gomoku server.

use crate::config::{ConfigError, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Strictly Gomoku - networked five-in-a-row server
#[derive(Parser, Debug, Default)]
#[command(name = "strictly_gomoku_server")]
#[command(about = "Shared-board gomoku over TCP", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum number of connections waiting for a handler
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Side length of the grid
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Marks in a row needed to win
    #[arg(long)]
    pub winning_length: Option<usize>,

    /// Close connections idle for this many seconds
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,

    /// Reject marks played out of turn
    #[arg(long)]
    pub enforce_turns: bool,

    /// Answer rejected moves with an ERR line
    #[arg(long)]
    pub send_rejections: bool,
}

impl Cli {
    /// Builds the effective config: file (or defaults), then flags.
    #[instrument(skip(self))]
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config = config.with_host(host);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(capacity) = self.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }
        if let Some(size) = self.grid_size {
            config = config.with_grid_size(size);
        }
        if let Some(length) = self.winning_length {
            config = config.with_winning_length(length);
        }
        if let Some(secs) = self.idle_timeout_secs {
            config = config.with_idle_timeout_secs(secs);
        }
        if self.enforce_turns {
            config = config.with_enforce_turns(true);
        }
        if self.send_rejections {
            config = config.with_send_rejections(true);
        }

        config.validate()?;
        debug!(?config, "Effective configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = Cli::try_parse_from(["strictly_gomoku_server"]).unwrap();
        assert_eq!(cli.into_config().unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "strictly_gomoku_server",
            "--port",
            "9100",
            "--queue-capacity",
            "3",
            "--enforce-turns",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(*config.port(), 9100);
        assert_eq!(*config.queue_capacity(), 3);
        assert!(*config.enforce_turns());
        assert!(!*config.send_rejections());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = ["strictly_gomoku_server", "--winning-length", "11"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/gomoku.toml")),
            ..Cli::default()
        };
        assert!(cli.into_config().is_err());
    }
}
