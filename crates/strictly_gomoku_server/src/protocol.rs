//! Line-oriented wire protocol.
//!
//! Client to server, one move per line:
//!
//! ```text
//! {row},{col},{mark}\n        e.g. 0,3,X
//! ```
//!
//! Server to client, one message per line:
//!
//! ```text
//! X,-,-,...,-,\n              full grid, row-major, comma after every cell
//! WINX\n                      the tag WIN followed by the winning mark
//! ERR <reason>\n              rejected move (only when enabled)
//! ```
//!
//! [`MoveCodec`] reassembles moves from arbitrary read boundaries: bytes are
//! buffered until a newline arrives, so a move split across several reads is
//! decoded exactly once.

use crate::error::ConnectionError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use derive_more::{Display, Error};
use strictly_gomoku::{Grid, Mark, Move, ParseGridError};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Message terminator in both directions.
pub const DELIMITER: u8 = b'\n';

/// Prefix of the win notice.
pub const WIN_TAG: &str = "WIN";

/// Prefix of an explicit rejection.
pub const REJECT_TAG: &str = "ERR ";

/// Malformed input from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ProtocolError {
    /// A move line did not have exactly three fields.
    #[display("Expected 3 comma-separated fields, found {}", found)]
    WrongFieldCount {
        /// Number of fields present.
        found: usize,
    },
    /// Row or column was not a decimal number.
    #[display("Invalid coordinate {:?}", field)]
    InvalidCoordinate {
        /// The offending field.
        field: String,
    },
    /// Mark was not `X` or `O`.
    #[display("Invalid mark {:?}", field)]
    InvalidMark {
        /// The offending field.
        field: String,
    },
    /// A line was not ASCII text.
    #[display("Message is not ASCII text")]
    NotAscii,
    /// No newline within the allowed length.
    #[display("Message exceeds {} bytes without a newline", limit)]
    MessageTooLong {
        /// Configured maximum.
        limit: usize,
    },
    /// The stream ended in the middle of a message.
    #[display("Stream closed with {} bytes of an unterminated message", pending)]
    Truncated {
        /// Bytes left in the buffer.
        pending: usize,
    },
    /// A server line was neither a board, a win notice, nor a rejection.
    #[display("Unrecognized server message: {}", reason)]
    UnknownServerMessage {
        /// Why the line did not parse.
        reason: String,
    },
}

impl From<ParseGridError> for ProtocolError {
    fn from(err: ParseGridError) -> Self {
        ProtocolError::UnknownServerMessage {
            reason: err.to_string(),
        }
    }
}

fn parse_coordinate(field: &str) -> Result<usize, ProtocolError> {
    let invalid = || ProtocolError::InvalidCoordinate {
        field: field.to_string(),
    };
    // `usize::from_str` accepts a leading '+', which the protocol does not.
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    field.parse().map_err(|_| invalid())
}

/// Parses one move line, without its terminator.
///
/// All three fields must be well formed; nothing is salvaged from a partly
/// valid line. Coordinates outside the grid still parse here and are
/// rejected by the board.
pub fn parse_move(line: &str) -> Result<Move, ProtocolError> {
    let fields: Vec<&str> = line.split(',').collect();
    let [row, col, mark] = fields.as_slice() else {
        return Err(ProtocolError::WrongFieldCount {
            found: fields.len(),
        });
    };

    let row = parse_coordinate(row)?;
    let col = parse_coordinate(col)?;

    let mut chars = mark.chars();
    let mark = match (chars.next(), chars.next()) {
        (Some(symbol), None) => Mark::from_symbol(symbol),
        _ => None,
    }
    .ok_or_else(|| ProtocolError::InvalidMark {
        field: mark.to_string(),
    })?;

    Ok(Move::at(row, col, mark))
}

/// Renders a move as a wire line, including the terminator.
pub fn format_move(mv: &Move) -> String {
    format!("{},{},{}\n", mv.position.row, mv.position.col, mv.mark)
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Full grid snapshot.
    Board(Grid),
    /// A player won; the board has been reset.
    Win(Mark),
    /// The mover's last move was not applied.
    Rejected(String),
}

impl ServerMessage {
    /// Encodes the message as one wire line.
    pub fn to_wire(&self) -> Bytes {
        let mut line = match self {
            ServerMessage::Board(grid) => grid.serialize(),
            ServerMessage::Win(mark) => format!("{}{}", WIN_TAG, mark.symbol()),
            ServerMessage::Rejected(reason) => format!("{}{}", REJECT_TAG, reason),
        };
        line.push(DELIMITER as char);
        Bytes::from(line)
    }

    /// Parses one server line, without its terminator.
    pub fn parse(line: &str, grid_size: usize) -> Result<Self, ProtocolError> {
        if let Some(reason) = line.strip_prefix(REJECT_TAG) {
            return Ok(ServerMessage::Rejected(reason.to_string()));
        }
        if let Some(rest) = line.strip_prefix(WIN_TAG) {
            let mut chars = rest.chars();
            return match (chars.next().and_then(Mark::from_symbol), chars.next()) {
                (Some(mark), None) => Ok(ServerMessage::Win(mark)),
                _ => Err(ProtocolError::UnknownServerMessage {
                    reason: format!("bad win notice {:?}", line),
                }),
            };
        }
        Ok(ServerMessage::Board(Grid::parse(line, grid_size)?))
    }
}

/// Newline-delimited move codec.
///
/// Decodes client lines into [`Move`]s and encodes [`Move`]s for clients.
#[derive(Debug, Clone)]
pub struct MoveCodec {
    max_length: usize,
    // Bytes already scanned for a delimiter, so partial reads are not rescanned.
    next_index: usize,
}

impl MoveCodec {
    /// Creates a codec that rejects lines longer than `max_length` bytes.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    fn decode_line(line: &[u8]) -> Result<Move, ProtocolError> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if !line.is_ascii() {
            return Err(ProtocolError::NotAscii);
        }
        let text = std::str::from_utf8(line).map_err(|_| ProtocolError::NotAscii)?;
        parse_move(text)
    }
}

impl Decoder for MoveCodec {
    type Item = Move;
    type Error = ConnectionError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Move>, ConnectionError> {
        let scan_end = buf.len().min(self.max_length + 1);
        let found = buf[self.next_index..scan_end]
            .iter()
            .position(|&b| b == DELIMITER)
            .map(|offset| self.next_index + offset);

        match found {
            Some(newline) => {
                self.next_index = 0;
                let line = buf.split_to(newline + 1);
                let mv = Self::decode_line(&line[..newline])?;
                trace!(?mv, "Decoded move");
                Ok(Some(mv))
            }
            None if buf.len() > self.max_length => Err(ProtocolError::MessageTooLong {
                limit: self.max_length,
            }
            .into()),
            None => {
                self.next_index = buf.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Move>, ConnectionError> {
        match self.decode(buf)? {
            Some(mv) => Ok(Some(mv)),
            None if buf.is_empty() => Ok(None),
            None => {
                let pending = buf.remaining();
                buf.clear();
                self.next_index = 0;
                Err(ProtocolError::Truncated { pending }.into())
            }
        }
    }
}

impl Encoder<Move> for MoveCodec {
    type Error = std::io::Error;

    fn encode(&mut self, mv: Move, dst: &mut BytesMut) -> Result<(), std::io::Error> {
        dst.put_slice(format_move(&mv).as_bytes());
        Ok(())
    }
}
