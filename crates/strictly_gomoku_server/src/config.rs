//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use strictly_gomoku::Rules;
use tracing::{debug, info, instrument};

/// Runtime options for the game server.
///
/// Every field is optional in a TOML file; missing fields take the defaults
/// below. Command-line flags are applied on top through the `with_*`
/// setters.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Deserialize)]
#[setters(prefix = "with_")]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_host")]
    #[setters(into)]
    host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    port: u16,

    /// Side length of the grid.
    #[serde(default = "default_grid_size")]
    grid_size: usize,

    /// Contiguous marks needed to win.
    #[serde(default = "default_winning_length")]
    winning_length: usize,

    /// Maximum number of accepted connections waiting for a handler.
    #[serde(default = "default_queue_capacity")]
    queue_capacity: usize,

    /// Size of each socket read, in bytes.
    #[serde(default = "default_read_buffer_size")]
    read_buffer_size: usize,

    /// Longest accepted move line, excluding the newline.
    #[serde(default = "default_max_message_len")]
    max_message_len: usize,

    /// Messages that may queue for one connection before it counts as stalled.
    #[serde(default = "default_outbound_buffer")]
    outbound_buffer: usize,

    /// Close connections that send nothing for this many seconds.
    #[serde(default)]
    #[setters(strip_option)]
    idle_timeout_secs: Option<u64>,

    /// Reject marks that are not due.
    #[serde(default)]
    enforce_turns: bool,

    /// Answer rejected moves with an `ERR` line instead of dropping them.
    #[serde(default)]
    send_rejections: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_grid_size() -> usize {
    strictly_gomoku::GRID_SIZE
}

fn default_winning_length() -> usize {
    strictly_gomoku::WINNING_LENGTH
}

fn default_queue_capacity() -> usize {
    50
}

fn default_read_buffer_size() -> usize {
    1024
}

fn default_max_message_len() -> usize {
    64
}

fn default_outbound_buffer() -> usize {
    64
}

/// Shortest line that can hold a move (`r,c,X`).
const MIN_MESSAGE_LEN: usize = 5;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            grid_size: default_grid_size(),
            winning_length: default_winning_length(),
            queue_capacity: default_queue_capacity(),
            read_buffer_size: default_read_buffer_size(),
            max_message_len: default_max_message_len(),
            outbound_buffer: default_outbound_buffer(),
            idle_timeout_secs: None,
            enforce_turns: false,
            send_rejections: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Checks that the values can run a game.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("winning_length", self.winning_length),
            ("queue_capacity", self.queue_capacity),
            ("read_buffer_size", self.read_buffer_size),
            ("outbound_buffer", self.outbound_buffer),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::new(format!("{} must be at least 1", name)));
        }
        if self.winning_length > self.grid_size {
            return Err(ConfigError::new(format!(
                "winning_length {} exceeds grid_size {}",
                self.winning_length, self.grid_size
            )));
        }
        if self.max_message_len < MIN_MESSAGE_LEN {
            return Err(ConfigError::new(format!(
                "max_message_len must be at least {}",
                MIN_MESSAGE_LEN
            )));
        }
        if self.idle_timeout_secs == Some(0) {
            return Err(ConfigError::new("idle_timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Grid geometry and win condition.
    pub fn rules(&self) -> Rules {
        Rules::new(self.grid_size, self.winning_length)
    }

    /// `host:port` string for binding.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Idle deadline as a duration.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
