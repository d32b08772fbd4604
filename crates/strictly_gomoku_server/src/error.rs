//! Error types for connections and the server process.

use crate::config::ConfigError;
use crate::protocol::ProtocolError;
use derive_more::{Display, Error, From};

/// Why a single connection ended abnormally.
///
/// Always contained within that connection's handler.
#[derive(Debug, Display, Error, From)]
pub enum ConnectionError {
    /// The client sent a malformed message.
    #[display("Protocol error: {}", _0)]
    #[from]
    Protocol(ProtocolError),
    /// Read or write failure on the socket.
    #[display("Transport error: {}", _0)]
    #[from]
    Transport(std::io::Error),
    /// Nothing arrived within the idle deadline.
    #[display("Connection idle for too long")]
    IdleTimeout,
    /// The outbound queue filled up and the connection was dropped from broadcast.
    #[display("Connection stalled on outbound messages")]
    Stalled,
}

/// Fatal server errors, reported to the operator.
#[derive(Debug, Display, Error, From)]
pub enum ServerError {
    /// Invalid configuration.
    #[display("{}", _0)]
    #[from]
    Config(ConfigError),
    /// The listening socket could not be bound.
    #[display("Failed to bind {}: {}", addr, source)]
    Bind {
        /// Requested listen address.
        addr: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
