//! Strictly Gomoku Server - shared-board gomoku over TCP
//!
//! Every connected client plays on the same board. A move line
//! `row,col,mark` is applied under one lock, and the resulting board (or a
//! `WIN<mark>` notice) is broadcast to every connection.
//!
//! # Architecture
//!
//! - **Server**: accept loop feeding a bounded admission queue, plus a
//!   dispatcher spawning one handler task per admitted connection
//! - **Handler**: newline framing via [`MoveCodec`], a writer task per
//!   connection, idle deadline
//! - **Session**: the [`strictly_gomoku::Board`] behind a mutex, with
//!   broadcast queued inside the critical section
//! - **Registry**: live connections and their outbound channels
//! - **Client**: [`GomokuClient`] for tools and tests

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod admission;
mod cli;
mod client;
mod config;
mod error;
mod handler;
pub mod protocol;
mod registry;
mod server;
mod session;

pub use admission::{AdmissionRejected, Admitter, PendingQueue, admission_queue};
pub use cli::Cli;
pub use client::{ClientError, GomokuClient};
pub use config::{ConfigError, ServerConfig};
pub use error::{ConnectionError, ServerError};
pub use handler::handle_connection;
pub use protocol::{MoveCodec, ProtocolError, ServerMessage};
pub use registry::{ConnectionId, Registration, SessionRegistry};
pub use server::{PendingConnection, Server};
pub use session::GameSession;
