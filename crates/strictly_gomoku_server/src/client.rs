//! Minimal async client for the gomoku protocol.

use crate::protocol::{MoveCodec, ProtocolError, ServerMessage};
use derive_more::{Display, Error, From};
use futures::{SinkExt, StreamExt};
use strictly_gomoku::Move;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, instrument};

/// Client-side failures.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    /// Socket failure.
    #[display("I/O error: {}", _0)]
    Io(std::io::Error),
    /// A server line could not be framed.
    #[display("Line error: {}", _0)]
    Lines(LinesCodecError),
    /// A server line did not parse.
    #[display("Protocol error: {}", _0)]
    Protocol(ProtocolError),
}

/// Connection to a gomoku server.
#[derive(Debug)]
pub struct GomokuClient {
    reader: FramedRead<OwnedReadHalf, LinesCodec>,
    writer: FramedWrite<OwnedWriteHalf, MoveCodec>,
    grid_size: usize,
}

impl GomokuClient {
    /// Connects to a server playing on a `grid_size` grid.
    #[instrument(skip(addr))]
    pub async fn connect(addr: impl ToSocketAddrs, grid_size: usize) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        debug!(local = ?stream.local_addr().ok(), "Connected");
        let (read_half, write_half) = stream.into_split();
        // Board lines are two bytes per cell.
        let line_limit = grid_size * grid_size * 2 + 64;
        Ok(Self {
            reader: FramedRead::new(read_half, LinesCodec::new_with_max_length(line_limit)),
            writer: FramedWrite::new(write_half, MoveCodec::new(line_limit)),
            grid_size,
        })
    }

    /// Sends one move.
    pub async fn send_move(&mut self, mv: Move) -> Result<(), ClientError> {
        self.writer.send(mv).await?;
        Ok(())
    }

    /// Writes raw bytes, bypassing move encoding.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        let socket = self.writer.get_mut();
        socket.write_all(bytes).await?;
        socket.flush().await?;
        Ok(())
    }

    /// Waits for the next server message. `None` once the server closes.
    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        match self.reader.next().await {
            Some(line) => Ok(Some(ServerMessage::parse(&line?, self.grid_size)?)),
            None => Ok(None),
        }
    }

    /// Grid size this client expects.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }
}
